mod editor;
mod folder_picker;
mod rename_dialog;
mod status_bar;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};

use crate::app::App;
use crate::workspace::Dialog;

pub fn draw(f: &mut Frame, app: &mut App) {
    let [main_area, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(f.area());

    editor::render_editor(f, app, main_area);
    status_bar::render_status_bar(f, app, status_area);

    match app.workspace.dialog {
        Dialog::None => {}
        Dialog::Rename(_) => rename_dialog::render_rename_dialog(f, app),
        Dialog::MoveFolder(_) => folder_picker::render_folder_picker(f, app),
    }
}

/// A `width` x `height` box in the middle of `area`, shrunk to fit.
pub(crate) fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4)).max(1);
    let height = height.min(area.height.saturating_sub(2)).max(1);
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}
