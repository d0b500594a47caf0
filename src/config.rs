use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dispatch::Command;
use crate::host::MkdirMode;

const APP_NAME: &str = "linkwise";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Desktop,
    Mobile,
}

impl Platform {
    pub fn mkdir_mode(self) -> MkdirMode {
        match self {
            Platform::Desktop => MkdirMode::Recursive,
            Platform::Mobile => MkdirMode::Sequential,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    pub rename_file_or_link: String,
    pub rename_link_only: String,
    pub move_file_or_link: String,
    pub move_link_only: String,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            rename_file_or_link: "f2".to_string(),
            rename_link_only: "shift+f2".to_string(),
            move_file_or_link: "f7".to_string(),
            move_link_only: "shift+f7".to_string(),
        }
    }
}

impl KeyConfig {
    pub fn binding_for(&self, command: Command) -> &str {
        match command {
            Command::RenameFileOrLink => &self.rename_file_or_link,
            Command::RenameLinkOnly => &self.rename_link_only,
            Command::MoveFileOrLink => &self.move_file_or_link,
            Command::MoveLinkOnly => &self.move_link_only,
        }
    }

    /// Parsed bindings; unparsable strings are logged and skipped.
    pub fn bindings(&self) -> Vec<(KeyBinding, Command)> {
        Command::ALL
            .into_iter()
            .filter_map(|command| {
                let raw = self.binding_for(command);
                match KeyBinding::parse(raw) {
                    Some(binding) => Some((binding, command)),
                    None => {
                        warn!(command = command.id(), binding = raw, "ignoring invalid key binding");
                        None
                    }
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub notes_dir: String,
    pub platform: Platform,
    pub show_hidden_folders: bool,
    pub log_level: String,
    pub theme: String,
    pub keys: KeyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notes_dir: "~/Documents/linkwise".to_string(),
            platform: Platform::default(),
            show_hidden_folders: false,
            log_level: "info".to_string(),
            theme: "dark".to_string(),
            keys: KeyConfig::default(),
        }
    }
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(env::var("HOME").unwrap_or_default()).join(".config"))
            .join(APP_NAME)
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn log_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(env::var("HOME").unwrap_or_default()).join(".cache"))
            .join(APP_NAME)
            .join("logs")
    }

    /// Reads the config file, falling back to defaults when it is missing or broken.
    pub fn load() -> Self {
        let path = Self::config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn load_or_create() -> Self {
        if Self::config_path().exists() {
            return Self::load();
        }
        let config = Self::default();
        if let Err(e) = config.save() {
            warn!(error = %e, "could not write default config");
        }
        config
    }

    pub fn save(&self) -> io::Result<()> {
        fs::create_dir_all(Self::config_dir())?;
        let contents =
            toml::to_string_pretty(self).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(Self::config_path(), contents)
    }

    pub fn notes_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.notes_dir).to_string())
    }
}

/// A key plus the exact modifiers that must be held, e.g. `shift+f2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn parse(input: &str) -> Option<Self> {
        let lowered = input.trim().to_lowercase();
        let mut code = None;
        let mut modifiers = KeyModifiers::NONE;

        for part in lowered.split('+').map(str::trim).filter(|p| !p.is_empty()) {
            match part {
                "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                "alt" | "option" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                key => {
                    if code.is_some() {
                        return None;
                    }
                    code = Some(parse_key(key)?);
                }
            }
        }

        code.map(|code| Self { code, modifiers })
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        let wanted = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT;
        let held = event.modifiers & wanted;
        match (self.code, event.code) {
            // terminals report shifted letters as uppercase chars
            (KeyCode::Char(a), KeyCode::Char(b)) => {
                a.eq_ignore_ascii_case(&b)
                    && (held - KeyModifiers::SHIFT) == (self.modifiers - KeyModifiers::SHIFT)
                    && (self.modifiers.contains(KeyModifiers::SHIFT)
                        == (held.contains(KeyModifiers::SHIFT) || b.is_ascii_uppercase()))
            }
            (a, b) => a == b && held == self.modifiers,
        }
    }
}

fn parse_key(key: &str) -> Option<KeyCode> {
    match key {
        "esc" | "escape" => Some(KeyCode::Esc),
        "enter" | "return" => Some(KeyCode::Enter),
        "tab" => Some(KeyCode::Tab),
        "space" => Some(KeyCode::Char(' ')),
        "backspace" => Some(KeyCode::Backspace),
        "delete" | "del" => Some(KeyCode::Delete),
        "insert" | "ins" => Some(KeyCode::Insert),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        f if f.len() > 1 && f.starts_with('f') => f[1..].parse().ok().filter(|n| (1..=24).contains(n)).map(KeyCode::F),
        _ => {
            let mut chars = key.chars();
            let first = chars.next()?;
            chars.next().is_none().then_some(KeyCode::Char(first))
        }
    }
}

#[derive(Debug, Clone)]
pub struct DialogTheme {
    pub background: Color,
    pub border: Color,
    pub text: Color,
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub primary: Color,
    pub foreground: Color,
    pub muted: Color,
    pub background: Color,
    pub background_secondary: Color,
    pub border: Color,
    pub selection: Color,
    pub info: Color,
    pub success: Color,
    pub error: Color,
    pub statusbar: Color,
    pub dialog: DialogTheme,
}

impl Theme {
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    fn dark() -> Self {
        Self {
            primary: Color::Rgb(122, 162, 247),
            foreground: Color::Rgb(192, 202, 245),
            muted: Color::Rgb(86, 95, 137),
            background: Color::Rgb(26, 27, 38),
            background_secondary: Color::Rgb(36, 40, 59),
            border: Color::Rgb(65, 72, 104),
            selection: Color::Rgb(51, 70, 124),
            info: Color::Rgb(125, 207, 255),
            success: Color::Rgb(158, 206, 106),
            error: Color::Rgb(247, 118, 142),
            statusbar: Color::Rgb(22, 22, 30),
            dialog: DialogTheme {
                background: Color::Rgb(36, 40, 59),
                border: Color::Rgb(122, 162, 247),
                text: Color::Rgb(192, 202, 245),
            },
        }
    }

    fn light() -> Self {
        Self {
            primary: Color::Rgb(46, 126, 233),
            foreground: Color::Rgb(52, 59, 88),
            muted: Color::Rgb(132, 140, 181),
            background: Color::Rgb(225, 226, 231),
            background_secondary: Color::Rgb(208, 213, 227),
            border: Color::Rgb(168, 174, 203),
            selection: Color::Rgb(182, 191, 226),
            info: Color::Rgb(0, 113, 151),
            success: Color::Rgb(88, 117, 57),
            error: Color::Rgb(245, 42, 101),
            statusbar: Color::Rgb(196, 200, 218),
            dialog: DialogTheme {
                background: Color::Rgb(208, 213, 227),
                border: Color::Rgb(46, 126, 233),
                text: Color::Rgb(52, 59, 88),
            },
        }
    }
}
