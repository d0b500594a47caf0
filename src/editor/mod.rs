mod buffer;
mod cursor;
mod input;
pub mod tokens;

pub use buffer::TextBuffer;
pub(crate) use buffer::char_to_byte_index;
pub use cursor::{CursorMove, Position, Selection};
pub use input::{process_key, InputAction};

use unicode_width::UnicodeWidthChar;

use crate::host::{ClickableToken, EditorHandle};

const PAGE_SIZE: usize = 20;

/// The note editor: buffer, cursor, selection and focus.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    buffer: TextBuffer,
    cursor: Position,
    /// Column the cursor wants to return to on vertical moves.
    desired_ch: usize,
    selection: Option<Selection>,
    focused: bool,
    dirty: bool,
    scroll_top: usize,
    view_height: usize,
}

impl Editor {
    pub fn from_text(text: &str) -> Self {
        Self {
            buffer: TextBuffer::from_text(text),
            focused: true,
            view_height: PAGE_SIZE,
            ..Self::default()
        }
    }

    /// Swaps in new content (e.g. after the file changed on disk), keeping the cursor where possible.
    pub fn reload(&mut self, text: &str) {
        let cursor = self.cursor;
        self.buffer = TextBuffer::from_text(text);
        self.selection = None;
        self.dirty = false;
        self.set_cursor(cursor);
    }

    pub fn text(&self) -> String {
        self.buffer.to_text()
    }

    pub fn lines(&self) -> Vec<&str> {
        self.buffer.lines()
    }

    pub fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    pub fn set_cursor(&mut self, pos: Position) {
        let line = pos.line.min(self.buffer.line_count().saturating_sub(1));
        let ch = pos.ch.min(self.buffer.line_len(line));
        self.cursor = Position::new(line, ch);
        self.desired_ch = ch;
    }

    /// Display column of the cursor, accounting for wide characters.
    /// Control characters (tabs) are drawn as a single cell.
    pub fn cursor_display_col(&self) -> usize {
        self.buffer
            .line(self.cursor.line)
            .map(|l| l.chars().take(self.cursor.ch).map(|c| c.width().unwrap_or(1)).sum())
            .unwrap_or(0)
    }


    /// Keeps the cursor row inside a viewport of `height` rows.
    pub fn scroll_to_cursor(&mut self, height: usize) {
        self.view_height = height.max(1);
        if self.cursor.line < self.scroll_top {
            self.scroll_top = self.cursor.line;
        } else if self.cursor.line >= self.scroll_top + self.view_height {
            self.scroll_top = self.cursor.line + 1 - self.view_height;
        }
    }

    pub fn apply(&mut self, action: InputAction) {
        match action {
            InputAction::InsertChar(c) => {
                self.delete_selection();
                self.buffer.insert_char(self.cursor.line, self.cursor.ch, c);
                self.cursor.ch += 1;
                self.desired_ch = self.cursor.ch;
                self.dirty = true;
            }
            InputAction::InsertNewline => {
                self.delete_selection();
                self.buffer.split_line(self.cursor.line, self.cursor.ch);
                self.cursor = Position::new(self.cursor.line + 1, 0);
                self.desired_ch = 0;
                self.dirty = true;
            }
            InputAction::DeleteCharBefore => {
                if self.delete_selection() {
                    return;
                }
                if self.cursor.ch > 0 {
                    self.buffer.delete_char(self.cursor.line, self.cursor.ch - 1);
                    self.cursor.ch -= 1;
                    self.dirty = true;
                } else if self.cursor.line > 0 {
                    let prev_len = self.buffer.line_len(self.cursor.line - 1);
                    if self.buffer.join_with_previous(self.cursor.line) {
                        self.cursor = Position::new(self.cursor.line - 1, prev_len);
                        self.dirty = true;
                    }
                }
                self.desired_ch = self.cursor.ch;
            }
            InputAction::DeleteChar => {
                if self.delete_selection() {
                    return;
                }
                if self.cursor.ch < self.buffer.line_len(self.cursor.line) {
                    self.buffer.delete_char(self.cursor.line, self.cursor.ch);
                    self.dirty = true;
                } else if self.cursor.line + 1 < self.buffer.line_count()
                    && self.buffer.join_with_previous(self.cursor.line + 1)
                {
                    self.dirty = true;
                }
            }
            InputAction::Move(movement) => {
                self.selection = None;
                self.move_cursor(movement);
            }
            InputAction::None => {}
        }
    }

    fn move_cursor(&mut self, movement: CursorMove) {
        let Position { line, ch } = self.cursor;
        let last_line = self.buffer.line_count().saturating_sub(1);
        match movement {
            CursorMove::Forward => {
                if ch < self.buffer.line_len(line) {
                    self.set_cursor(Position::new(line, ch + 1));
                } else if line < last_line {
                    self.set_cursor(Position::new(line + 1, 0));
                }
            }
            CursorMove::Back => {
                if ch > 0 {
                    self.set_cursor(Position::new(line, ch - 1));
                } else if line > 0 {
                    let len = self.buffer.line_len(line - 1);
                    self.set_cursor(Position::new(line - 1, len));
                }
            }
            CursorMove::Up => self.move_vertically(line.saturating_sub(1)),
            CursorMove::Down => self.move_vertically((line + 1).min(last_line)),
            CursorMove::PageUp => self.move_vertically(line.saturating_sub(self.view_height)),
            CursorMove::PageDown => self.move_vertically((line + self.view_height).min(last_line)),
            CursorMove::Head => self.set_cursor(Position::new(line, 0)),
            CursorMove::End => self.set_cursor(Position::new(line, self.buffer.line_len(line))),
            CursorMove::Top => self.set_cursor(Position::new(0, 0)),
            CursorMove::Bottom => {
                self.set_cursor(Position::new(last_line, self.buffer.line_len(last_line)))
            }
        }
    }

    fn move_vertically(&mut self, target: usize) {
        let desired = self.desired_ch;
        self.cursor = Position::new(target, desired.min(self.buffer.line_len(target)));
    }

    /// Removes the selected text, leaving the cursor at its start. Returns false without a selection.
    fn delete_selection(&mut self) -> bool {
        let Some(selection) = self.selection.take() else {
            return false;
        };
        if selection.is_empty() {
            return false;
        }
        let Selection { start, end } = selection;
        self.buffer.delete_text_range(start.line, start.ch, end.line, end.ch);
        self.set_cursor(start);
        self.dirty = true;
        true
    }
}

impl EditorHandle for Editor {
    fn cursor(&self) -> Position {
        self.cursor
    }

    fn clickable_token_at(&self, pos: Position) -> Option<ClickableToken> {
        tokens::token_at(&self.buffer.lines(), pos)
    }

    fn set_selection(&mut self, start: Position, end: Position) {
        let selection = Selection::new(start, end);
        self.selection = Some(selection);
        self.set_cursor(selection.end);
    }

    fn focus(&mut self) {
        self.focused = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::TokenKind;

    fn key(action: InputAction, editor: &mut Editor) {
        editor.apply(action);
    }

    #[test]
    fn typing_marks_dirty_and_advances() {
        let mut editor = Editor::from_text("ab\n");
        editor.set_cursor(Position::new(0, 1));
        key(InputAction::InsertChar('x'), &mut editor);
        assert_eq!(editor.text(), "axb\n");
        assert_eq!(editor.cursor(), Position::new(0, 2));
        assert!(editor.is_dirty());
    }

    #[test]
    fn vertical_moves_remember_column() {
        let mut editor = Editor::from_text("long line\nab\nanother line");
        editor.set_cursor(Position::new(0, 7));
        key(InputAction::Move(CursorMove::Down), &mut editor);
        assert_eq!(editor.cursor(), Position::new(1, 2));
        key(InputAction::Move(CursorMove::Down), &mut editor);
        assert_eq!(editor.cursor(), Position::new(2, 7));
    }

    #[test]
    fn backspace_at_line_start_joins() {
        let mut editor = Editor::from_text("one\ntwo");
        editor.set_cursor(Position::new(1, 0));
        key(InputAction::DeleteCharBefore, &mut editor);
        assert_eq!(editor.text(), "onetwo");
        assert_eq!(editor.cursor(), Position::new(0, 3));
    }

    #[test]
    fn typing_replaces_selected_link() {
        let mut editor = Editor::from_text("[site](https://old.example)");
        let token = editor.clickable_token_at(Position::new(0, 3)).unwrap();
        assert_eq!(token.kind, TokenKind::ExternalLink);
        editor.focus();
        editor.set_selection(token.start, token.end);
        for c in "https://new.example".chars() {
            key(InputAction::InsertChar(c), &mut editor);
        }
        assert_eq!(editor.text(), "[site](https://new.example)");
    }

    #[test]
    fn moving_clears_selection() {
        let mut editor = Editor::from_text("abc");
        editor.set_selection(Position::new(0, 0), Position::new(0, 2));
        key(InputAction::Move(CursorMove::Head), &mut editor);
        assert!(editor.selection().is_none());
        assert_eq!(editor.cursor(), Position::new(0, 0));
    }

    #[test]
    fn reload_clamps_cursor() {
        let mut editor = Editor::from_text("first\nsecond line");
        editor.set_cursor(Position::new(1, 8));
        editor.reload("only");
        assert_eq!(editor.cursor(), Position::new(0, 4));
        assert!(!editor.is_dirty());
    }

    #[test]
    fn scroll_follows_cursor() {
        let text = (0..50).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let mut editor = Editor::from_text(&text);
        editor.set_cursor(Position::new(30, 0));
        editor.scroll_to_cursor(10);
        assert_eq!(editor.scroll_top(), 21);
        editor.set_cursor(Position::new(5, 0));
        editor.scroll_to_cursor(10);
        assert_eq!(editor.scroll_top(), 5);
    }
}
