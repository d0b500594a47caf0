use std::fs;
use std::io;
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

use crate::config::{Config, KeyBinding, Theme};
use crate::dispatch::{self, Command, Outcome};
use crate::editor::{process_key, Editor};
use crate::host::EditorHandle;
use crate::picker::PickerStep;
use crate::vault::Vault;
use crate::workspace::{Dialog, Workspace};

pub struct App {
    pub editor: Editor,
    pub workspace: Workspace,
    pub theme: Theme,
    bindings: Vec<(KeyBinding, Command)>,
    pub should_quit: bool,
    /// First Ctrl+Q on a dirty buffer only warns.
    quit_armed: bool,
}

impl App {
    /// `initial_path` may be a vault folder or a note inside one; without it
    /// the configured notes directory is opened.
    pub fn new_with_path(config: Config, initial_path: Option<PathBuf>) -> io::Result<Self> {
        let (root, target_file) = match initial_path {
            Some(path) if path.is_file() => {
                let parent = path
                    .parent()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| PathBuf::from("."));
                (parent, Some(path))
            }
            Some(path) => (path, None),
            None => {
                let notes = config.notes_path();
                fs::create_dir_all(&notes)?;
                (notes, None)
            }
        };

        let vault = Vault::open(&root)
            .map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))?
            .with_hidden_folders(config.show_hidden_folders);
        let mut workspace = Workspace::new(vault, config.platform.mkdir_mode());

        let first = target_file
            .and_then(|file| workspace.vault().relative(&file))
            .or_else(|| workspace.vault().notes().into_iter().next());

        let editor = match first {
            Some(rel) => match workspace.open(&rel) {
                Ok(content) => Editor::from_text(&content),
                Err(e) => {
                    workspace.set_error(e.to_string());
                    Editor::default()
                }
            },
            None => {
                workspace.set_info(format!("No notes in {}", root.display()));
                Editor::default()
            }
        };

        Ok(Self {
            editor,
            workspace,
            theme: Theme::from_name(&config.theme),
            bindings: config.keys.bindings(),
            should_quit: false,
            quit_armed: false,
        })
    }

    pub fn bindings(&self) -> &[(KeyBinding, Command)] {
        &self.bindings
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.route_key(key);
        self.sync_focus();
    }

    fn route_key(&mut self, key: KeyEvent) {
        match self.workspace.dialog {
            Dialog::Rename(_) => return self.handle_rename_key(key),
            Dialog::MoveFolder(_) => return self.handle_picker_key(key),
            Dialog::None => {}
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('q') {
            if self.editor.is_dirty() && !self.quit_armed {
                self.quit_armed = true;
                self.workspace.set_error("Unsaved changes. Press Ctrl+Q again to quit");
            } else {
                self.should_quit = true;
            }
            return;
        }
        self.quit_armed = false;

        if ctrl && key.code == KeyCode::Char('s') {
            self.save();
            return;
        }

        if let Some(command) = self.command_for(&key) {
            self.run_command(command);
            return;
        }

        if self.workspace.active().is_some() {
            self.editor.apply(process_key(key));
        }
    }

    fn command_for(&self, key: &KeyEvent) -> Option<Command> {
        self.bindings
            .iter()
            .find(|(binding, _)| binding.matches(key))
            .map(|(_, command)| *command)
    }

    pub fn run_command(&mut self, command: Command) {
        // link resolution and backlink rewriting read the file from disk
        if self.editor.is_dirty() && !self.save() {
            return;
        }
        self.workspace.clear_status();

        match dispatch::run(command, &mut self.editor, &mut self.workspace) {
            Outcome::ChooseFolder(pending) => self.workspace.dialog = Dialog::MoveFolder(pending),
            Outcome::Native(native) => debug!(command = command.id(), native = native.id(), "fell back"),
            Outcome::RenamePrompted(file) => {
                debug!(command = command.id(), file = %file.path, "rename prompted")
            }
            Outcome::Moved(file) => debug!(command = command.id(), to = %file.path, "moved"),
            Outcome::EditingExternal | Outcome::Nothing => debug!(command = command.id(), "command finished"),
        }
        self.reload_if_changed();
    }

    /// The editor only has focus while no dialog is up.
    fn sync_focus(&mut self) {
        if matches!(self.workspace.dialog, Dialog::None) {
            self.editor.focus();
        } else {
            self.editor.blur();
        }
    }

    fn handle_rename_key(&mut self, key: KeyEvent) {
        let Dialog::Rename(dialog) = &mut self.workspace.dialog else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.workspace.close_dialog(),
            KeyCode::Enter => {
                self.workspace.submit_rename();
                self.reload_if_changed();
            }
            KeyCode::Backspace => {
                dialog.input.pop();
                dialog.error = None;
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                dialog.input.clear();
                dialog.error = None;
            }
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                dialog.input.push(c);
                dialog.error = None;
            }
            _ => {}
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        let Dialog::MoveFolder(mut pending) = std::mem::take(&mut self.workspace.dialog) else {
            return;
        };
        match pending.picker.handle_key(key) {
            PickerStep::Pending => self.workspace.dialog = Dialog::MoveFolder(pending),
            PickerStep::Dismissed => debug!(file = %pending.file.path, "move abandoned"),
            PickerStep::Resolved(selection) => {
                let outcome = dispatch::finish_move(&mut self.workspace, &pending.file, &selection);
                if let Outcome::Moved(moved) = outcome {
                    debug!(from = %pending.file.path, to = %moved.path, "move finished");
                }
                self.reload_if_changed();
            }
        }
    }

    /// Writes the buffer to the active note. Returns false when that failed.
    pub fn save(&mut self) -> bool {
        if self.workspace.active().is_none() {
            return true;
        }
        match self.workspace.save_active(&self.editor.text()) {
            Ok(()) => {
                self.editor.mark_saved();
                self.workspace.set_info("Saved");
                true
            }
            Err(e) => {
                warn!(error = %e, "save failed");
                self.workspace.set_error(format!("Save failed: {}", e));
                false
            }
        }
    }

    fn reload_if_changed(&mut self) {
        if self.workspace.take_changed() {
            self.reload_active();
        }
    }

    /// Re-reads the active note; renames may have rewritten its links or moved it.
    pub fn reload_active(&mut self) {
        let Some(path) = self.workspace.active().map(|f| f.path.clone()) else {
            return;
        };
        match self.workspace.vault().read(&path) {
            Ok(content) => self.editor.reload(&content),
            Err(e) => {
                warn!(file = %path, error = %e, "reload failed");
                self.workspace.set_error(e.to_string());
            }
        }
    }
}
