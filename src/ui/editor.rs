use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::config::Theme;
use crate::editor::tokens::{self, LinkSpan};
use crate::editor::Selection;
use crate::host::{EditorHandle, TokenKind};
use crate::workspace::Dialog;

pub fn render_editor(f: &mut Frame, app: &mut App, area: Rect) {
    let dirty = if app.editor.is_dirty() { " [+]" } else { "" };
    let title = match app.workspace.active() {
        Some(file) => format!(" {}{} ", file.path, dirty),
        None => " linkwise ".to_string(),
    };

    let theme = &app.theme;
    let border_color = if app.editor.is_focused() { theme.primary } else { theme.border };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);

    app.editor.scroll_to_cursor(inner.height as usize);
    let scroll_top = app.editor.scroll_top();
    let height = inner.height as usize;

    let text = app.editor.text();
    let mut links_by_row: Vec<Vec<LinkSpan>> = vec![Vec::new(); app.editor.line_count()];
    for (row, span) in tokens::scan_document(&text) {
        if let Some(spans) = links_by_row.get_mut(row) {
            spans.push(span);
        }
    }

    let selection = app.editor.selection();
    let lines: Vec<Line> = app
        .editor
        .lines()
        .iter()
        .enumerate()
        .skip(scroll_top)
        .take(height)
        .map(|(row, line)| styled_line(line, row, &links_by_row[row], selection, theme))
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);

    let cursor = app.editor.cursor();
    if app.editor.is_focused() && matches!(app.workspace.dialog, Dialog::None) && cursor.line >= scroll_top {
        let screen_y = inner.y + (cursor.line - scroll_top) as u16;
        let screen_x = inner.x + app.editor.cursor_display_col() as u16;
        if screen_x < inner.x + inner.width && screen_y < inner.y + inner.height {
            f.set_cursor_position((screen_x, screen_y));
        }
    }
}

fn styled_line<'a>(
    line: &str,
    row: usize,
    links: &[LinkSpan],
    selection: Option<Selection>,
    theme: &Theme,
) -> Line<'a> {
    let chars: Vec<char> = line.chars().collect();
    let selected = selection.and_then(|s| s.columns_on(row, chars.len()));

    let style_at = |col: usize| {
        let mut style = Style::default().fg(theme.foreground);
        if let Some(link) = links.iter().find(|l| l.start <= col && col < l.end) {
            let in_target = link.text_start <= col && col < link.text_end;
            style = match (link.kind, in_target) {
                (TokenKind::InternalLink, true) => {
                    style.fg(theme.primary).add_modifier(Modifier::UNDERLINED)
                }
                (TokenKind::ExternalLink, true) => style.fg(theme.info).add_modifier(Modifier::UNDERLINED),
                (_, false) => style.fg(theme.muted),
            };
        }
        if selected.is_some_and(|(from, to)| from <= col && col < to) {
            style = style.bg(theme.selection);
        }
        style
    };

    let mut spans: Vec<Span> = Vec::new();
    let mut run = String::new();
    let mut run_style = None;
    for (col, &c) in chars.iter().enumerate() {
        let style = style_at(col);
        if run_style.is_some_and(|s| s != style) {
            spans.push(Span::styled(std::mem::take(&mut run), run_style.unwrap_or_default()));
        }
        run_style = Some(style);
        run.push(if c == '\t' { ' ' } else { c });
    }
    if let Some(style) = run_style {
        spans.push(Span::styled(run, style));
    }
    Line::from(spans)
}
