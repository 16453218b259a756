// Identity colors
//
// Maps nicknames and channel names to stable colors so the same person
// always shows up in the same hue. The hue only depends on the first two
// letters of the name, so similarly-prefixed names land close together
// while the domain wraps around the color wheel three times.

use ratatui::style::{Color, Style};
use ratatui::text::Span;

/// Warning color used for disconnect markers and errors
pub const COLOR_RED: Color = Color::Indexed(9);

/// Dimmed color for away members and status text
pub const COLOR_GRAY: Color = Color::Indexed(8);

/// How identity colors are picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSchemeType {
    /// Hue derived from the name
    #[default]
    Base,
    /// Same derivation as `Base`, kept distinct for configuration compatibility
    Extended,
    /// Two explicit colors: one for ourselves, one for everybody else
    Fixed,
}

impl ColorSchemeType {
    /// Parse scheme name from config
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "base" => Self::Base,
            "extended" => Self::Extended,
            "fixed" => Self::Fixed,
            _ => Self::Base,
        }
    }

    /// Convert to string for TOML serialization
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Extended => "extended",
            Self::Fixed => "fixed",
        }
    }
}

/// Identity color configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub kind: ColorSchemeType,
    /// Color of other people's names under `Fixed`
    pub others: Color,
    /// Color of our own name under `Fixed`
    pub self_color: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            kind: ColorSchemeType::Base,
            others: Color::Reset,
            self_color: Color::Reset,
        }
    }
}

/// Number of distinct letter slots: below `a`, `a..=z`, above `z`
const LETTER_SLOTS: u64 = 28;

/// Pick the color for an identity
pub fn ident_color(scheme: &ColorScheme, ident: &str, is_self: bool) -> Color {
    if scheme.kind == ColorSchemeType::Fixed {
        return if is_self {
            scheme.self_color
        } else {
            scheme.others
        };
    }

    let bytes = ident.as_bytes();
    let mut angle_base: u64 = 0;
    if let Some(&first) = bytes.first() {
        angle_base += u64::from(cap_letter(first.to_ascii_lowercase())) * LETTER_SLOTS;
    }
    if let Some(&second) = bytes.get(1) {
        angle_base += u64::from(cap_letter(second.to_ascii_lowercase()));
    }

    // the hue space repeats three times over the whole domain
    let max_values = (27 * LETTER_SLOTS) as f64 / 3.0;
    let angle = (angle_base as f64 / max_values).fract();
    let hue = angle * 360.0;

    let (r, g, b) = hsv_to_rgb(hue, 1.0, 1.0);
    Color::Rgb(r, g, b)
}

/// Returns a value between 0 and 27 for a given byte
///
/// Bytes below `a` map to 0, bytes above `z` map to 27, and `a..=z` map
/// to `1..=26`.
pub fn cap_letter(value: u8) -> u8 {
    let clamped = value.clamp(b'a' - 1, b'z' + 1);
    clamped - (b'a' - 1)
}

/// Identity rendered in its color
pub fn ident_span(scheme: &ColorScheme, ident: &str, is_self: bool) -> Span<'static> {
    let color = ident_color(scheme, ident, is_self);
    Span::styled(ident.to_string(), Style::default().fg(color))
}

/// Converts an HSV triple to an RGB triple
///
/// Out-of-domain input yields black.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (u8, u8, u8) {
    if !(0.0..360.0).contains(&h) || !(0.0..=1.0).contains(&s) || !(0.0..=1.0).contains(&v) {
        return (0, 0, 0);
    }

    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let channel = |value: f64| ((value + m) * 255.0).round() as u8;
    (channel(r), channel(g), channel(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ColorScheme {
        ColorScheme::default()
    }

    #[test]
    fn cap_letter_boundaries() {
        assert_eq!(cap_letter(0), 0);
        assert_eq!(cap_letter(b'A'), 0);
        assert_eq!(cap_letter(b'`'), 0);
        assert_eq!(cap_letter(b'a'), 1);
        assert_eq!(cap_letter(b'm'), 13);
        assert_eq!(cap_letter(b'z'), 26);
        assert_eq!(cap_letter(b'{'), 27);
        assert_eq!(cap_letter(255), 27);
    }

    #[test]
    fn cap_letter_is_linear_over_alphabet() {
        for (i, c) in (b'a'..=b'z').enumerate() {
            assert_eq!(cap_letter(c), i as u8 + 1);
        }
    }

    #[test]
    fn hsv_out_of_range_is_black() {
        assert_eq!(hsv_to_rgb(360.0, 1.0, 1.0), (0, 0, 0));
        assert_eq!(hsv_to_rgb(-1.0, 1.0, 1.0), (0, 0, 0));
        assert_eq!(hsv_to_rgb(0.0, 1.01, 1.0), (0, 0, 0));
        assert_eq!(hsv_to_rgb(0.0, 1.0, -0.01), (0, 0, 0));
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), (255, 0, 0));
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), (0, 255, 0));
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), (0, 0, 255));
        assert_eq!(hsv_to_rgb(60.0, 1.0, 1.0), (255, 255, 0));
        assert_eq!(hsv_to_rgb(0.0, 0.0, 1.0), (255, 255, 255));
    }

    #[test]
    fn ident_color_is_deterministic() {
        for name in ["alice", "Bob", "x", "", "#rust", "名前"] {
            assert_eq!(
                ident_color(&base(), name, false),
                ident_color(&base(), name, false)
            );
        }
    }

    #[test]
    fn only_first_two_letters_matter() {
        let scheme = base();
        let short = ident_color(&scheme, "al", false);
        assert_eq!(ident_color(&scheme, "alice", false), short);
        assert_eq!(ident_color(&scheme, "al_123!", false), short);
        assert_ne!(ident_color(&scheme, "bo", false), short);
    }

    #[test]
    fn case_insensitive() {
        let scheme = base();
        assert_eq!(
            ident_color(&scheme, "ALICE", false),
            ident_color(&scheme, "alice", false)
        );
    }

    #[test]
    fn base_and_extended_agree() {
        let extended = ColorScheme {
            kind: ColorSchemeType::Extended,
            ..ColorScheme::default()
        };
        assert_eq!(
            ident_color(&base(), "carol", false),
            ident_color(&extended, "carol", false)
        );
    }

    #[test]
    fn single_letter_name_uses_first_slot_only() {
        // "a" -> base 28, max_values 252 -> angle 1/9 -> hue 40
        let expected = hsv_to_rgb(40.0, 1.0, 1.0);
        assert_eq!(
            ident_color(&base(), "a", false),
            Color::Rgb(expected.0, expected.1, expected.2)
        );
    }

    #[test]
    fn empty_name_is_red() {
        assert_eq!(ident_color(&base(), "", false), Color::Rgb(255, 0, 0));
    }

    #[test]
    fn fixed_scheme_ignores_name() {
        let scheme = ColorScheme {
            kind: ColorSchemeType::Fixed,
            others: Color::Indexed(4),
            self_color: Color::Indexed(2),
        };
        for name in ["", "alice", "zzz"] {
            assert_eq!(ident_color(&scheme, name, true), Color::Indexed(2));
            assert_eq!(ident_color(&scheme, name, false), Color::Indexed(4));
        }
    }

    #[test]
    fn scheme_names_parse() {
        assert_eq!(ColorSchemeType::from_str("Fixed"), ColorSchemeType::Fixed);
        assert_eq!(
            ColorSchemeType::from_str("extended"),
            ColorSchemeType::Extended
        );
        assert_eq!(ColorSchemeType::from_str("bogus"), ColorSchemeType::Base);
    }
}
