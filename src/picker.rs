//! Fuzzy folder chooser used by the move commands.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::host::FolderNode;
use crate::search;

pub const PLACEHOLDER: &str = "Type a folder";
pub const EMPTY_STATE_TEXT: &str = "No existing folder found.";
pub const CREATE_HOTKEY_TEXT: &str = "Enter to create";
pub const INSTRUCTIONS: &[(&str, &str)] = &[
    ("↑↓", "to navigate"),
    ("Tab ↹", "to autocomplete folder"),
    ("↵", "to choose folder"),
    ("esc", "to dismiss"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Open,
    Selecting,
    Resolved,
    Dismissed,
}

/// The folder a move should land in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderSelection {
    Existing(String),
    /// Typed text that matched no folder, exactly as typed.
    New(String),
}

impl FolderSelection {
    pub fn path(&self) -> &str {
        match self {
            FolderSelection::Existing(path) | FolderSelection::New(path) => path,
        }
    }

    pub fn no_suggestion(&self) -> bool {
        matches!(self, FolderSelection::New(_))
    }
}

/// Result of feeding one key to the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerStep {
    Pending,
    Resolved(FolderSelection),
    Dismissed,
}

#[derive(Debug, Clone)]
pub struct FolderPicker {
    folders: Vec<FolderNode>,
    query: String,
    /// Indices into `folders`, best match first.
    matches: Vec<usize>,
    selected: usize,
    no_suggestion: bool,
    new_directory_path: String,
    phase: Phase,
}

impl FolderPicker {
    /// Takes the vault folders in traversal order. The list is fixed for the
    /// picker's lifetime and offered in reverse.
    pub fn new(folders: Vec<FolderNode>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let folders: Vec<FolderNode> = folders
            .into_iter()
            .rev()
            .filter(|f| seen.insert(f.path.clone()))
            .collect();
        let matches = (0..folders.len()).collect();
        Self {
            folders,
            query: String::new(),
            matches,
            selected: 0,
            no_suggestion: false,
            new_directory_path: String::new(),
            phase: Phase::Open,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn no_suggestion(&self) -> bool {
        self.no_suggestion
    }

    pub fn new_directory_path(&self) -> &str {
        &self.new_directory_path
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Folders currently offered, best match first.
    pub fn suggestions(&self) -> impl Iterator<Item = &FolderNode> + '_ {
        self.matches.iter().map(move |&idx| &self.folders[idx])
    }

    pub fn suggestion_count(&self) -> usize {
        self.matches.len()
    }

    pub fn highlighted(&self) -> Option<&FolderNode> {
        if self.no_suggestion {
            return None;
        }
        self.matches.get(self.selected).map(|&idx| &self.folders[idx])
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.refresh();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PickerStep {
        if matches!(self.phase, Phase::Resolved | Phase::Dismissed) {
            return PickerStep::Pending;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return self.dismiss(),
            KeyCode::Enter => return self.commit(),
            KeyCode::Tab => self.autocomplete(),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Char('p') if ctrl => self.move_selection(-1),
            KeyCode::Char('n') if ctrl => self.move_selection(1),
            KeyCode::Char('u') if ctrl => self.set_query(""),
            KeyCode::Backspace => {
                let mut query = std::mem::take(&mut self.query);
                query.pop();
                self.set_query(query);
            }
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                let mut query = std::mem::take(&mut self.query);
                query.push(c);
                self.set_query(query);
            }
            _ => {}
        }
        PickerStep::Pending
    }

    /// Replaces the query with the highlighted folder's path.
    pub fn autocomplete(&mut self) {
        if let Some(folder) = self.highlighted() {
            let path = folder.path.clone();
            self.set_query(path);
        }
    }

    pub fn commit(&mut self) -> PickerStep {
        let selection = if self.no_suggestion {
            FolderSelection::New(self.new_directory_path.clone())
        } else if let Some(folder) = self.highlighted() {
            FolderSelection::Existing(folder.path.clone())
        } else {
            return PickerStep::Pending;
        };
        debug!(folder = selection.path(), new = selection.no_suggestion(), "folder chosen");
        self.phase = Phase::Resolved;
        PickerStep::Resolved(selection)
    }

    pub fn dismiss(&mut self) -> PickerStep {
        debug!("folder picker dismissed");
        self.phase = Phase::Dismissed;
        PickerStep::Dismissed
    }

    fn move_selection(&mut self, delta: isize) {
        if self.no_suggestion || self.matches.is_empty() {
            return;
        }
        let len = self.matches.len() as isize;
        self.selected = (self.selected as isize + delta).rem_euclid(len) as usize;
        self.phase = Phase::Selecting;
    }

    fn refresh(&mut self) {
        self.matches = search::rank(self.folders.iter().map(|f| f.path.as_str()), &self.query);
        self.selected = 0;
        self.no_suggestion = !self.query.is_empty() && self.matches.is_empty();
        self.new_directory_path = if self.no_suggestion {
            self.query.clone()
        } else {
            String::new()
        };
        self.phase = if self.query.is_empty() { Phase::Open } else { Phase::Selecting };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(path: &str) -> FolderNode {
        FolderNode {
            path: path.to_string(),
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
        }
    }

    fn picker() -> FolderPicker {
        FolderPicker::new(vec![
            FolderNode::root(),
            folder("archive"),
            folder("archive/2023"),
            folder("projects"),
            folder("projects/alpha"),
        ])
    }

    fn press(picker: &mut FolderPicker, code: KeyCode) -> PickerStep {
        picker.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(picker: &mut FolderPicker, text: &str) {
        for c in text.chars() {
            press(picker, KeyCode::Char(c));
        }
    }

    #[test]
    fn lists_folders_in_reverse_traversal_order() {
        let picker = picker();
        let paths: Vec<&str> = picker.suggestions().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["projects/alpha", "projects", "archive/2023", "archive", "/"]);
        assert_eq!(picker.phase(), Phase::Open);
    }

    #[test]
    fn drops_duplicate_paths() {
        let picker = FolderPicker::new(vec![folder("a"), folder("b"), folder("a")]);
        assert_eq!(picker.suggestion_count(), 2);
    }

    #[test]
    fn unmatched_text_resolves_to_new_path_as_typed() {
        let mut picker = picker();
        type_text(&mut picker, "Inbox/ Later ");
        assert!(picker.no_suggestion());
        assert_eq!(picker.new_directory_path(), "Inbox/ Later ");
        assert!(picker.highlighted().is_none());
        let step = press(&mut picker, KeyCode::Enter);
        assert_eq!(step, PickerStep::Resolved(FolderSelection::New("Inbox/ Later ".into())));
        assert_eq!(picker.phase(), Phase::Resolved);
    }

    #[test]
    fn exact_folder_resolves_to_existing() {
        let mut picker = picker();
        type_text(&mut picker, "projects");
        assert!(!picker.no_suggestion());
        match press(&mut picker, KeyCode::Enter) {
            PickerStep::Resolved(selection) => {
                assert!(!selection.no_suggestion());
                assert_eq!(selection.path(), "projects");
            }
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn tab_fills_query_with_highlighted_path() {
        let mut picker = picker();
        type_text(&mut picker, "alp");
        press(&mut picker, KeyCode::Tab);
        assert_eq!(picker.query(), "projects/alpha");
        assert!(!picker.no_suggestion());
    }

    #[test]
    fn tab_does_nothing_without_suggestion() {
        let mut picker = picker();
        type_text(&mut picker, "zzz");
        press(&mut picker, KeyCode::Tab);
        assert_eq!(picker.query(), "zzz");
    }

    #[test]
    fn navigation_wraps() {
        let mut picker = picker();
        press(&mut picker, KeyCode::Up);
        assert_eq!(picker.highlighted().map(|f| f.path.as_str()), Some("/"));
        press(&mut picker, KeyCode::Down);
        assert_eq!(picker.highlighted().map(|f| f.path.as_str()), Some("projects/alpha"));
        assert_eq!(picker.phase(), Phase::Selecting);
    }

    #[test]
    fn escape_dismisses_and_ignores_later_keys() {
        let mut picker = picker();
        type_text(&mut picker, "arch");
        assert_eq!(press(&mut picker, KeyCode::Esc), PickerStep::Dismissed);
        assert_eq!(picker.phase(), Phase::Dismissed);
        assert_eq!(press(&mut picker, KeyCode::Enter), PickerStep::Pending);
    }

    #[test]
    fn backspace_and_clear_edit_the_query() {
        let mut picker = picker();
        type_text(&mut picker, "xyz");
        press(&mut picker, KeyCode::Backspace);
        assert_eq!(picker.query(), "xy");
        picker.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(picker.query(), "");
        assert!(!picker.no_suggestion());
        assert_eq!(picker.suggestion_count(), 5);
    }
}
