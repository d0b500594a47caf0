use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::centered_rect;
use crate::app::App;
use crate::picker::{self, FolderPicker};
use crate::workspace::Dialog;

const POPUP_WIDTH: u16 = 70;
const POPUP_MAX_VISIBLE_ITEMS: usize = 10;

pub fn render_folder_picker(f: &mut Frame, app: &App) {
    let Dialog::MoveFolder(pending) = &app.workspace.dialog else {
        return;
    };
    let picker = &pending.picker;
    let theme = &app.theme;

    let list_rows = if picker.no_suggestion() {
        2
    } else {
        picker.suggestion_count().clamp(1, POPUP_MAX_VISIBLE_ITEMS)
    };
    // input, blank, list, blank, instructions, borders
    let height = (list_rows + 6) as u16;
    let area = centered_rect(f.area(), POPUP_WIDTH, height);
    f.render_widget(Clear, area);
    let content_width = area.width.saturating_sub(2) as usize;

    let input = if picker.query().is_empty() {
        Span::styled(picker::PLACEHOLDER, Style::default().fg(theme.muted))
    } else {
        Span::styled(picker.query().to_string(), Style::default().fg(theme.foreground))
    };
    let mut lines = vec![Line::from(vec![Span::raw(" "), input]), Line::raw("")];

    if picker.no_suggestion() {
        lines.push(Line::from(Span::styled(
            format!(" {}", picker::EMPTY_STATE_TEXT),
            Style::default().fg(theme.muted),
        )));
        lines.push(selected_row(
            picker.new_directory_path(),
            Some(picker::CREATE_HOTKEY_TEXT),
            content_width,
            app,
        ));
    } else {
        lines.extend(suggestion_rows(picker, content_width, app));
    }

    lines.push(Line::raw(""));
    lines.push(instructions(app));

    let title = format!(" Move {} ", pending.file.name);
    let counter = if picker.no_suggestion() || picker.suggestion_count() == 0 {
        " New folder ".to_string()
    } else {
        format!(" {}/{} ", picker.selected_index() + 1, picker.suggestion_count())
    };

    let popup = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .title_bottom(Line::from(counter).right_aligned())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.info))
            .style(Style::default().bg(theme.background_secondary)),
    );
    f.render_widget(popup, area);

    let query_width = picker.query().chars().count() as u16;
    let cursor_x = (area.x + 2 + query_width).min(area.x + area.width.saturating_sub(2));
    f.set_cursor_position((cursor_x, area.y + 1));
}

fn suggestion_rows<'a>(picker: &FolderPicker, width: usize, app: &App) -> Vec<Line<'a>> {
    let selected = picker.selected_index();
    let scroll_offset = (selected + 1).saturating_sub(POPUP_MAX_VISIBLE_ITEMS);

    picker
        .suggestions()
        .enumerate()
        .skip(scroll_offset)
        .take(POPUP_MAX_VISIBLE_ITEMS)
        .map(|(idx, folder)| {
            if idx == selected {
                selected_row(&folder.path, None, width, app)
            } else {
                Line::from(Span::styled(
                    format!(" {}", truncate(&folder.path, width.saturating_sub(2))),
                    Style::default().fg(app.theme.foreground),
                ))
            }
        })
        .collect()
}

fn selected_row<'a>(text: &str, hint: Option<&'static str>, width: usize, app: &App) -> Line<'a> {
    let theme = &app.theme;
    let style = Style::default()
        .fg(theme.background)
        .bg(theme.primary)
        .add_modifier(Modifier::BOLD);
    let hint_len = hint.map(|h| h.chars().count() + 1).unwrap_or(0);
    let text = truncate(text, width.saturating_sub(2 + hint_len));
    let used = 1 + text.chars().count() + hint_len;

    let mut spans = vec![
        Span::styled(" ", style),
        Span::styled(text, style),
        Span::styled(" ".repeat(width.saturating_sub(used)), style),
    ];
    if let Some(hint) = hint {
        spans.push(Span::styled(format!("{} ", hint), style.remove_modifier(Modifier::BOLD)));
    }
    Line::from(spans)
}

fn instructions<'a>(app: &App) -> Line<'a> {
    let theme = &app.theme;
    let mut spans = vec![Span::raw(" ")];
    for (key, purpose) in picker::INSTRUCTIONS {
        spans.push(Span::styled(*key, Style::default().fg(theme.primary).add_modifier(Modifier::BOLD)));
        spans.push(Span::styled(format!(" {}  ", purpose), Style::default().fg(theme.muted)));
    }
    Line::from(spans)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate("projects/alpha", 20), "projects/alpha");
        assert_eq!(truncate("ärchive/2024", 5), "ärch…");
    }
}
