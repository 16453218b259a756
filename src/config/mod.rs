//! Configuration for the chat screen
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/chatview/config.toml)
//! 3. Built-in defaults (lowest priority)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::ui::layout::clamp_col_width;
use crate::ui::{ColorSchemeType, UiConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod colors;
mod logging;
mod serialization;

#[cfg(test)]
mod tests;

pub use colors::{color_to_string, parse_color, ColorsConfig, FileColors};
pub use logging::{FileLogging, LogRotation, LoggingConfig};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Width of the nickname column in cells
    pub nick_col_width: u16,

    /// Width of the vertical channel list
    pub chan_col_width: u16,

    /// Start with the channel list shown; hidden means tabs at the bottom
    pub chan_col_enabled: bool,

    /// Width of the member list
    pub member_col_width: u16,

    pub member_col_enabled: bool,

    /// Wrap messages at this width on wide terminals (0 = full width)
    pub text_max_width: u16,

    /// Capture mouse events
    pub mouse: bool,

    /// Use the terminal for window title and desktop notifications
    pub local_integrations: bool,

    /// Colors of the chrome and nicknames
    pub colors: ColorsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nick_col_width: 14,
            chan_col_width: 16,
            chan_col_enabled: true,
            member_col_width: 16,
            member_col_enabled: true,
            text_max_width: 0,
            mouse: true,
            local_integrations: true,
            colors: ColorsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub nick_col_width: Option<u16>,
    pub chan_col_width: Option<u16>,
    pub chan_col_enabled: Option<bool>,
    pub member_col_width: Option<u16>,
    pub member_col_enabled: Option<bool>,
    pub text_max_width: Option<u16>,
    pub mouse: Option<bool>,
    pub local_integrations: Option<bool>,

    /// Optional [colors] section
    pub colors: Option<FileColors>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

/// A config file that exists but cannot be used
#[derive(Debug)]
pub struct ConfigError {
    pub path: PathBuf,
    pub source: anyhow::Error,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:#}", self.path.display(), self.source)
    }
}

impl std::error::Error for ConfigError {}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

fn env_flag(value: Option<String>) -> Option<bool> {
    value.map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

impl Config {
    /// Get the config file path: ~/.config/chatview/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("chatview").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };
        if path.exists() {
            return;
        }
        // config is optional, a read-only home just means no template
        if let Err(e) = Self::default().write_to(&path) {
            tracing::debug!("Could not write config template: {:#}", e);
        }
    }

    /// Write this configuration as a commented TOML file
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, self.to_toml())
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Parse config file contents
    pub(crate) fn parse_file(contents: &str) -> Result<FileConfig> {
        toml::from_str(contents).context("Invalid TOML")
    }

    /// Load file config; a missing file means defaults
    fn load_file_config(path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        let Some(path) = path else {
            return Ok(FileConfig::default());
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse_file(&contents).map_err(|source| ConfigError {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => Err(ConfigError {
                path: path.to_path_buf(),
                source: anyhow::Error::new(e).context("Cannot read configuration file"),
            }),
        }
    }

    /// Load configuration: env vars > file > defaults
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        let file = Self::load_file_config(path.as_deref())?;
        Ok(Self::from_parts(file, |key| std::env::var(key).ok()))
    }

    /// Merge a parsed file with environment lookups
    pub(crate) fn from_parts(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        // Side columns: file > default, clamped to what the layout accepts
        let chan_col_width = file
            .chan_col_width
            .map(|w| clamp_col_width(i32::from(w)))
            .unwrap_or(defaults.chan_col_width);
        let member_col_width = file
            .member_col_width
            .map(|w| clamp_col_width(i32::from(w)))
            .unwrap_or(defaults.member_col_width);

        // Mouse: env kill switch > file > default
        let mouse = match env_flag(env("CHATVIEW_NO_MOUSE")) {
            Some(true) => false,
            _ => file.mouse.unwrap_or(defaults.mouse),
        };

        let mut colors = ColorsConfig::from_file(file.colors);
        if let Some(scheme) = env("CHATVIEW_NICK_COLORS") {
            colors.nicks = ColorSchemeType::from_str(&scheme);
        }

        let mut logging = LoggingConfig::from_file(file.logging);
        if let Some(dir) = env("CHATVIEW_LOG_DIR") {
            logging.file_dir = PathBuf::from(dir);
        }

        Self {
            nick_col_width: file.nick_col_width.unwrap_or(defaults.nick_col_width),
            chan_col_width,
            chan_col_enabled: file.chan_col_enabled.unwrap_or(defaults.chan_col_enabled),
            member_col_width,
            member_col_enabled: file
                .member_col_enabled
                .unwrap_or(defaults.member_col_enabled),
            text_max_width: file.text_max_width.unwrap_or(defaults.text_max_width),
            mouse,
            local_integrations: file
                .local_integrations
                .unwrap_or(defaults.local_integrations),
            colors,
            logging,
        }
    }

    /// Chat screen settings; completion and merge functions are left for the caller
    pub fn ui_config(&self) -> UiConfig {
        UiConfig {
            nick_col_width: self.nick_col_width,
            chan_col_width: self.chan_col_width,
            chan_col_enabled: self.chan_col_enabled,
            member_col_width: self.member_col_width,
            member_col_enabled: self.member_col_enabled,
            text_max_width: self.text_max_width,
            mouse: self.mouse,
            auto_complete: None,
            merge_line: None,
            colors: self.colors.to_ui(),
            local_integrations: self.local_integrations,
        }
    }
}
