//! Link-aware rename and move commands.
//!
//! Each command looks at the token under the cursor. Without one it falls
//! back to the native file command (or does nothing in link-only mode); on an
//! external link rename selects the URL for editing; on an internal link the
//! command acts on the file the link resolves to.

use tracing::{debug, info, warn};

use crate::host::{EditorHandle, FileRef, Host, NativeCommand, TokenKind};
use crate::link;
use crate::picker::{FolderPicker, FolderSelection};
use crate::vault::{ensure_directory, path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    RenameFileOrLink,
    RenameLinkOnly,
    MoveFileOrLink,
    MoveLinkOnly,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::RenameFileOrLink,
        Command::RenameLinkOnly,
        Command::MoveFileOrLink,
        Command::MoveLinkOnly,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Command::RenameFileOrLink => "rename-file-or-link",
            Command::RenameLinkOnly => "rename-link-only",
            Command::MoveFileOrLink => "move-file-or-link",
            Command::MoveLinkOnly => "move-link-only",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::RenameFileOrLink => "Rename file or link",
            Command::RenameLinkOnly => "Rename link only",
            Command::MoveFileOrLink => "Move file or link",
            Command::MoveLinkOnly => "Move link only",
        }
    }

    pub fn link_only(self) -> bool {
        matches!(self, Command::RenameLinkOnly | Command::MoveLinkOnly)
    }

    pub fn is_move(self) -> bool {
        matches!(self, Command::MoveFileOrLink | Command::MoveLinkOnly)
    }
}

/// A move waiting for the user to pick a destination folder.
#[derive(Debug, Clone)]
pub struct PendingMove {
    pub file: FileRef,
    pub picker: FolderPicker,
}

/// What a command ended up doing.
#[derive(Debug, Clone)]
pub enum Outcome {
    Nothing,
    Native(NativeCommand),
    EditingExternal,
    RenamePrompted(FileRef),
    ChooseFolder(PendingMove),
    Moved(FileRef),
}

pub fn run<E, H>(command: Command, editor: &mut E, host: &mut H) -> Outcome
where
    E: EditorHandle + ?Sized,
    H: Host + ?Sized,
{
    debug!(command = command.id(), "running command");
    if command.is_move() {
        move_file_or_link(editor, host, command.link_only())
    } else {
        rename_file_or_link(editor, host, command.link_only())
    }
}

pub fn rename_file_or_link<E, H>(editor: &mut E, host: &mut H, link_only: bool) -> Outcome
where
    E: EditorHandle + ?Sized,
    H: Host + ?Sized,
{
    let Some(token) = editor.clickable_token_at(editor.cursor()) else {
        return fall_back(host, NativeCommand::EditFileTitle, link_only);
    };

    match token.kind {
        TokenKind::ExternalLink => {
            debug!(url = %token.text, "selecting external link");
            editor.focus();
            editor.set_selection(token.start, token.end);
            Outcome::EditingExternal
        }
        TokenKind::InternalLink => match resolve_link_target(host, &token.text) {
            Some(file) => {
                host.prompt_rename_dialog(&file);
                Outcome::RenamePrompted(file)
            }
            None => Outcome::Nothing,
        },
    }
}

pub fn move_file_or_link<E, H>(editor: &mut E, host: &mut H, link_only: bool) -> Outcome
where
    E: EditorHandle + ?Sized,
    H: Host + ?Sized,
{
    let Some(token) = editor.clickable_token_at(editor.cursor()) else {
        return fall_back(host, NativeCommand::MoveFile, link_only);
    };

    match token.kind {
        TokenKind::ExternalLink => {
            debug!(url = %token.text, "external links cannot be moved");
            Outcome::Nothing
        }
        TokenKind::InternalLink => match resolve_link_target(host, &token.text) {
            Some(file) => Outcome::ChooseFolder(PendingMove {
                picker: FolderPicker::new(host.folders()),
                file,
            }),
            None => Outcome::Nothing,
        },
    }
}

/// File an internal link points at, seen from the active note.
pub fn resolve_link_target<H>(host: &H, text: &str) -> Option<FileRef>
where
    H: Host + ?Sized,
{
    let Some(from) = host.current_file_path() else {
        debug!("no active file to resolve from");
        return None;
    };
    let target = link::normalize(text);
    let file = host.resolve_link_path(&target.path, &from);
    if file.is_none() {
        debug!(link = %target.path, from = %from, "link does not resolve");
    }
    file
}

/// Second half of a move: makes sure the folder exists, then moves the file
/// into it under its current name.
pub fn finish_move<H>(host: &mut H, file: &FileRef, selection: &FolderSelection) -> Outcome
where
    H: Host + ?Sized,
{
    if let Err(e) = ensure_directory(host, selection.path()) {
        warn!(folder = selection.path(), error = %e, "could not create destination folder");
        return Outcome::Nothing;
    }
    let new_path = path::join(&[selection.path(), file.name.as_str()]);
    match host.rename_or_move_file(file, &new_path) {
        Ok(moved) => {
            info!(from = %file.path, to = %moved.path, "moved via link");
            Outcome::Moved(moved)
        }
        Err(e) => {
            debug!(error = %e, "move rejected");
            Outcome::Nothing
        }
    }
}

fn fall_back<H>(host: &mut H, command: NativeCommand, link_only: bool) -> Outcome
where
    H: Host + ?Sized,
{
    if link_only {
        debug!("no link under cursor");
        return Outcome::Nothing;
    }
    debug!(native = command.id(), "no link under cursor, using native command");
    host.execute_command(command);
    Outcome::Native(command)
}
