use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::centered_rect;
use crate::app::App;
use crate::workspace::Dialog;

const DIALOG_WIDTH: u16 = 60;

pub fn render_rename_dialog(f: &mut Frame, app: &App) {
    let Dialog::Rename(dialog) = &app.workspace.dialog else {
        return;
    };
    let theme = &app.theme;
    let height = if dialog.error.is_some() { 6 } else { 5 };
    let area = centered_rect(f.area(), DIALOG_WIDTH, height);
    f.render_widget(Clear, area);

    let extension = dialog
        .target
        .extension()
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();

    let mut lines = vec![
        Line::from(Span::styled(
            format!(" {}", dialog.target.path),
            Style::default().fg(theme.muted),
        )),
        Line::from(vec![
            Span::raw(" "),
            Span::styled(dialog.input.clone(), Style::default().fg(theme.dialog.text)),
            Span::styled(extension, Style::default().fg(theme.muted)),
        ]),
    ];
    if let Some(error) = &dialog.error {
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
        )));
    }

    let popup = Paragraph::new(lines).block(
        Block::default()
            .title(" Rename file ")
            .title_bottom(Line::from(" Enter: Rename, Esc: Cancel ").right_aligned())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.dialog.border))
            .style(Style::default().bg(theme.dialog.background)),
    );
    f.render_widget(popup, area);

    let input_width = dialog.input.chars().count() as u16;
    let cursor_x = (area.x + 2 + input_width).min(area.x + area.width.saturating_sub(2));
    f.set_cursor_position((cursor_x, area.y + 2));
}
