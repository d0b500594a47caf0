//! Capability contracts the link commands run against.
//!
//! The dispatcher and the folder picker only ever see these traits. The
//! terminal app implements them in `workspace`; tests implement them with
//! in-memory fakes.

use crate::editor::Position;
use crate::vault::VaultError;

/// What the span under the cursor points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    InternalLink,
    ExternalLink,
}

/// A clickable span under the cursor.
///
/// `text` is the link target as written in the note (heading/block suffix
/// included, alias excluded); `start..end` bounds that text on its line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickableToken {
    pub kind: TokenKind,
    pub text: String,
    pub start: Position,
    pub end: Position,
}

/// A file inside the vault, addressed by its vault-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRef {
    pub path: String,
    pub name: String,
}

impl FileRef {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        Self { path, name }
    }

    /// File name without its extension.
    pub fn basename(&self) -> &str {
        match self.name.rfind('.') {
            Some(0) | None => &self.name,
            Some(dot) => &self.name[..dot],
        }
    }

    pub fn extension(&self) -> Option<&str> {
        match self.name.rfind('.') {
            Some(0) | None => None,
            Some(dot) => Some(&self.name[dot + 1..]),
        }
    }

    /// Vault-relative folder containing the file; the root is `/`.
    pub fn parent(&self) -> &str {
        match self.path.rfind('/') {
            Some(slash) => &self.path[..slash],
            None => "/",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    pub path: String,
    pub name: String,
}

impl FolderNode {
    pub fn root() -> Self {
        Self { path: "/".to_string(), name: String::new() }
    }
}

/// Built-in commands the link commands fall back to when the cursor is not on a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeCommand {
    EditFileTitle,
    MoveFile,
}

impl NativeCommand {
    pub fn id(self) -> &'static str {
        match self {
            NativeCommand::EditFileTitle => "workspace:edit-file-title",
            NativeCommand::MoveFile => "file-explorer:move-file",
        }
    }
}

/// How missing directories get created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MkdirMode {
    /// One recursive call creates every missing level.
    #[default]
    Recursive,
    /// Each level is created on its own, shallowest first.
    Sequential,
}

pub trait EditorHandle {
    fn cursor(&self) -> Position;
    fn clickable_token_at(&self, pos: Position) -> Option<ClickableToken>;
    fn set_selection(&mut self, start: Position, end: Position);
    fn focus(&mut self);
}

pub trait ActiveDocument {
    /// Vault-relative path of the note open in the editor.
    fn current_file_path(&self) -> Option<String>;
}

pub trait LinkResolver {
    /// First file the link path points at when written inside `from`.
    fn resolve_link_path(&self, link: &str, from: &str) -> Option<FileRef>;
}

pub trait FileOperations {
    fn prompt_rename_dialog(&mut self, file: &FileRef);
    fn rename_or_move_file(&mut self, file: &FileRef, new_path: &str) -> Result<FileRef, VaultError>;
}

pub trait CommandExecutor {
    fn execute_command(&mut self, command: NativeCommand);
}

pub trait FolderTree {
    /// Every folder of the vault in traversal order, root first.
    fn folders(&self) -> Vec<FolderNode>;
}

pub trait DirectoryAdapter {
    fn exists(&self, path: &str) -> bool;
    fn mkdir(&mut self, path: &str) -> Result<(), VaultError>;
    fn mkdir_mode(&self) -> MkdirMode;
}

pub trait Host:
    ActiveDocument + LinkResolver + FileOperations + CommandExecutor + FolderTree + DirectoryAdapter
{
}

impl<T> Host for T where
    T: ActiveDocument + LinkResolver + FileOperations + CommandExecutor + FolderTree + DirectoryAdapter
{
}
