//! The concrete host the link commands run against: a vault, the note open
//! in the editor, the dialog on screen and the status line.

use tracing::{debug, info, warn};

use crate::dispatch::PendingMove;
use crate::host::{
    ActiveDocument, CommandExecutor, DirectoryAdapter, FileOperations, FileRef, FolderNode, FolderTree,
    LinkResolver, MkdirMode, NativeCommand,
};
use crate::picker::FolderPicker;
use crate::vault::{path, Vault, VaultError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameDialog {
    pub target: FileRef,
    /// New base name; the extension is kept.
    pub input: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub enum Dialog {
    #[default]
    None,
    Rename(RenameDialog),
    MoveFolder(PendingMove),
}

#[derive(Debug)]
pub struct Workspace {
    vault: Vault,
    active: Option<FileRef>,
    pub dialog: Dialog,
    status: Option<StatusMessage>,
    mkdir_mode: MkdirMode,
    /// Set whenever a rename or move went through, cleared by `take_changed`.
    changed: bool,
}

impl Workspace {
    pub fn new(vault: Vault, mkdir_mode: MkdirMode) -> Self {
        Self {
            vault,
            active: None,
            dialog: Dialog::None,
            status: None,
            mkdir_mode,
            changed: false,
        }
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    pub fn active(&self) -> Option<&FileRef> {
        self.active.as_ref()
    }

    pub fn open(&mut self, rel: &str) -> Result<String, VaultError> {
        let content = self.vault.read(rel)?;
        self.active = Some(FileRef::new(path::normalize_path(rel)));
        debug!(file = rel, "opened");
        Ok(content)
    }

    pub fn save_active(&mut self, content: &str) -> Result<(), VaultError> {
        let Some(active) = &self.active else {
            return Ok(());
        };
        self.vault.write(&active.path, content)
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage { text: text.into(), kind: StatusKind::Info });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage { text: text.into(), kind: StatusKind::Error });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    pub fn close_dialog(&mut self) {
        self.dialog = Dialog::None;
    }

    /// Applies the open rename dialog. Errors stay in the dialog so the user can retry.
    pub fn submit_rename(&mut self) -> Option<FileRef> {
        let Dialog::Rename(dialog) = &self.dialog else {
            return None;
        };
        let name = dialog.input.trim();
        if name.is_empty() {
            return None;
        }
        let target = dialog.target.clone();
        let file_name = match target.extension() {
            Some(ext) => format!("{}.{}", name, ext),
            None => name.to_string(),
        };
        let new_path = path::join(&[target.parent(), file_name.as_str()]);

        match self.move_file(&target, &new_path) {
            Ok(moved) => {
                self.dialog = Dialog::None;
                Some(moved)
            }
            Err(e) => {
                warn!(file = %target.path, error = %e, "rename failed");
                if let Dialog::Rename(dialog) = &mut self.dialog {
                    dialog.error = Some(e.to_string());
                }
                None
            }
        }
    }

    fn move_file(&mut self, file: &FileRef, new_path: &str) -> Result<FileRef, VaultError> {
        let moved = self.vault.rename(file, new_path)?;
        if self.active.as_ref().is_some_and(|a| a.path == file.path) {
            self.active = Some(moved.clone());
        }
        self.changed = true;
        self.set_info(format!("{} → {}", file.path, moved.path));
        Ok(moved)
    }
}

impl ActiveDocument for Workspace {
    fn current_file_path(&self) -> Option<String> {
        self.active.as_ref().map(|f| f.path.clone())
    }
}

impl LinkResolver for Workspace {
    fn resolve_link_path(&self, link: &str, from: &str) -> Option<FileRef> {
        self.vault.resolve_link_path(link, from)
    }
}

impl FileOperations for Workspace {
    fn prompt_rename_dialog(&mut self, file: &FileRef) {
        self.dialog = Dialog::Rename(RenameDialog {
            target: file.clone(),
            input: file.basename().to_string(),
            error: None,
        });
    }

    fn rename_or_move_file(&mut self, file: &FileRef, new_path: &str) -> Result<FileRef, VaultError> {
        self.move_file(file, new_path).map_err(|e| {
            self.set_error(format!("Cannot move {}: {}", file.name, e));
            e
        })
    }
}

impl CommandExecutor for Workspace {
    fn execute_command(&mut self, command: NativeCommand) {
        let Some(active) = self.active.clone() else {
            self.set_error("No file open");
            return;
        };
        info!(command = command.id(), file = %active.path, "native command");
        match command {
            NativeCommand::EditFileTitle => self.prompt_rename_dialog(&active),
            NativeCommand::MoveFile => {
                self.dialog = Dialog::MoveFolder(PendingMove {
                    picker: FolderPicker::new(self.folders()),
                    file: active,
                });
            }
        }
    }
}

impl FolderTree for Workspace {
    fn folders(&self) -> Vec<FolderNode> {
        self.vault.folders()
    }
}

impl DirectoryAdapter for Workspace {
    fn exists(&self, path: &str) -> bool {
        self.vault.exists(path)
    }

    fn mkdir(&mut self, path: &str) -> Result<(), VaultError> {
        self.vault.mkdir(path)
    }

    fn mkdir_mode(&self) -> MkdirMode {
        self.mkdir_mode
    }
}
