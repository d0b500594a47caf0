use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::cursor::CursorMove;

#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    InsertChar(char),
    InsertNewline,
    DeleteChar,
    DeleteCharBefore,
    Move(CursorMove),
    None,
}

pub fn process_key(key: KeyEvent) -> InputAction {
    match key.code {
        KeyCode::Char(c) => {
            if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
                InputAction::None
            } else {
                InputAction::InsertChar(c)
            }
        }
        KeyCode::Enter => InputAction::InsertNewline,
        KeyCode::Backspace => InputAction::DeleteCharBefore,
        KeyCode::Delete => InputAction::DeleteChar,
        KeyCode::Left => InputAction::Move(CursorMove::Back),
        KeyCode::Right => InputAction::Move(CursorMove::Forward),
        KeyCode::Up => InputAction::Move(CursorMove::Up),
        KeyCode::Down => InputAction::Move(CursorMove::Down),
        KeyCode::Home if key.modifiers.contains(KeyModifiers::CONTROL) => InputAction::Move(CursorMove::Top),
        KeyCode::End if key.modifiers.contains(KeyModifiers::CONTROL) => InputAction::Move(CursorMove::Bottom),
        KeyCode::Home => InputAction::Move(CursorMove::Head),
        KeyCode::End => InputAction::Move(CursorMove::End),
        KeyCode::PageUp => InputAction::Move(CursorMove::PageUp),
        KeyCode::PageDown => InputAction::Move(CursorMove::PageDown),
        KeyCode::Tab => InputAction::InsertChar('\t'),
        _ => InputAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_chars_are_not_inserted() {
        let key = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(process_key(key), InputAction::None);
    }

    #[test]
    fn shifted_chars_are_inserted() {
        let key = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(process_key(key), InputAction::InsertChar('A'));
    }

    #[test]
    fn ctrl_home_jumps_to_top() {
        let key = KeyEvent::new(KeyCode::Home, KeyModifiers::CONTROL);
        assert_eq!(process_key(key), InputAction::Move(CursorMove::Top));
    }
}
