use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::config::KeyBinding;
use crate::dispatch::Command;
use crate::host::EditorHandle;
use crate::workspace::StatusKind;

pub fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let left = match app.workspace.status() {
        Some(message) => {
            let color = match message.kind {
                StatusKind::Info => theme.success,
                StatusKind::Error => theme.error,
            };
            Line::from(Span::styled(format!(" {}", message.text), Style::default().fg(color)))
        }
        None => {
            let mut spans = vec![Span::raw(" ")];
            let hints = app
                .bindings()
                .iter()
                .map(|(binding, command)| (key_label(binding), short_name(*command)))
                .chain([("^S".to_string(), "save"), ("^Q".to_string(), "quit")]);
            for (key, label) in hints {
                spans.push(Span::styled(key, Style::default().fg(theme.primary).add_modifier(Modifier::BOLD)));
                spans.push(Span::styled(format!(" {}  ", label), Style::default().fg(theme.muted)));
            }
            Line::from(spans)
        }
    };

    let cursor = app.editor.cursor();
    let position = format!("Ln {}, Col {} ", cursor.line + 1, cursor.ch + 1);

    let [left_area, right_area] =
        Layout::horizontal([Constraint::Min(1), Constraint::Length(position.len() as u16)]).areas(area);

    let style = Style::default().bg(theme.statusbar);
    f.render_widget(Paragraph::new(left).style(style), left_area);
    f.render_widget(
        Paragraph::new(Line::from(position).right_aligned()).style(style.fg(theme.muted)),
        right_area,
    );
}

fn short_name(command: Command) -> &'static str {
    match command {
        Command::RenameFileOrLink => "rename",
        Command::RenameLinkOnly => "rename link",
        Command::MoveFileOrLink => "move",
        Command::MoveLinkOnly => "move link",
    }
}

fn key_label(binding: &KeyBinding) -> String {
    let mut label = String::new();
    if binding.modifiers.contains(KeyModifiers::CONTROL) {
        label.push('^');
    }
    if binding.modifiers.contains(KeyModifiers::ALT) {
        label.push_str("M-");
    }
    if binding.modifiers.contains(KeyModifiers::SHIFT) {
        label.push('⇧');
    }
    match binding.code {
        KeyCode::F(n) => label.push_str(&format!("F{}", n)),
        KeyCode::Char(' ') => label.push_str("Space"),
        KeyCode::Char(c) => label.push(c.to_ascii_uppercase()),
        other => label.push_str(&format!("{:?}", other)),
    }
    label
}
