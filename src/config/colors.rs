//! Color configuration
//!
//! Colors are written as `#rrggbb`, `ansi:N` or a bare `N` (256-color index).
//! `default` keeps the terminal's own color.

use ratatui::style::Color;
use serde::Deserialize;

use crate::ui::color::COLOR_GRAY;
use crate::ui::{ColorScheme, ColorSchemeType, ConfigColors};

// ─────────────────────────────────────────────────────────────────────────────
// Color strings
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a color string, `None` when it is not one of the accepted forms
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("default") {
        return Some(Color::Reset);
    }
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?));
    }
    let index = s.strip_prefix("ansi:").unwrap_or(s);
    index.parse::<u8>().ok().map(Color::Indexed)
}

/// Inverse of [`parse_color`] for the colors it can produce
pub fn color_to_string(color: Color) -> String {
    match color {
        Color::Rgb(r, g, b) => format!("#{:02x}{:02x}{:02x}", r, g, b),
        Color::Indexed(i) => format!("ansi:{}", i),
        _ => "default".to_string(),
    }
}

fn color_or(value: Option<String>, default: Color) -> Color {
    value.as_deref().and_then(parse_color).unwrap_or(default)
}

// ─────────────────────────────────────────────────────────────────────────────
// Colors section
// ─────────────────────────────────────────────────────────────────────────────

/// Colors of the chat screen chrome and nicknames
#[derive(Debug, Clone, PartialEq)]
pub struct ColorsConfig {
    /// Status line and pane headers
    pub status: Color,
    pub prompt: Color,
    /// Buffers with unread lines in the buffer list
    pub unread: Color,
    /// Nickname coloring: base, extended, fixed
    pub nicks: ColorSchemeType,
    /// Own nickname under the fixed scheme
    pub nicks_self: Color,
    /// Other nicknames under the fixed scheme
    pub nicks_others: Color,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            status: COLOR_GRAY,
            prompt: Color::Reset,
            unread: Color::Reset,
            nicks: ColorSchemeType::Base,
            nicks_self: Color::Reset,
            nicks_others: Color::Reset,
        }
    }
}

/// `[colors]` as loaded from the config file
#[derive(Debug, Deserialize, Default)]
pub struct FileColors {
    pub status: Option<String>,
    pub prompt: Option<String>,
    pub unread: Option<String>,
    pub nicks: Option<String>,
    pub nicks_self: Option<String>,
    pub nicks_others: Option<String>,
}

impl ColorsConfig {
    /// Create from file config with defaults; unparsable colors use the default
    pub fn from_file(file: Option<FileColors>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            status: color_or(file.status, defaults.status),
            prompt: color_or(file.prompt, defaults.prompt),
            unread: color_or(file.unread, defaults.unread),
            nicks: file
                .nicks
                .map(|s| ColorSchemeType::from_str(&s))
                .unwrap_or(defaults.nicks),
            nicks_self: color_or(file.nicks_self, defaults.nicks_self),
            nicks_others: color_or(file.nicks_others, defaults.nicks_others),
        }
    }

    pub fn to_ui(&self) -> ConfigColors {
        ConfigColors {
            status: self.status,
            prompt: self.prompt,
            unread: self.unread,
            nicks: ColorScheme {
                kind: self.nicks,
                others: self.nicks_others,
                self_color: self.nicks_self,
            },
        }
    }
}
