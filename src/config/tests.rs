//! Configuration tests
//!
//! The template written by `ensure_config_exists` comes from `to_toml`, so
//! every field must survive a trip through the file parser.

use super::*;
use ratatui::style::Color;
use std::collections::HashMap;

fn no_env(_: &str) -> Option<String> {
    None
}

fn reload(config: &Config) -> Config {
    let file = Config::parse_file(&config.to_toml()).unwrap();
    Config::from_parts(file, no_env)
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_roundtrip_default() {
    let config = Config::default();
    let toml_str = config.to_toml();

    let parsed = Config::parse_file(&toml_str);
    assert!(
        parsed.is_ok(),
        "Default config should round-trip.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );
    assert_eq!(reload(&config), config);
}

#[test]
fn test_template_keeps_color_syntax_comment() {
    let toml_str = Config::default().to_toml();
    assert!(toml_str.contains(r##"# Colors: "#rrggbb", "ansi:N""##));
    // the comment sits above the table it documents
    let comment = toml_str.find("# Colors:").unwrap();
    let table = toml_str.find("[colors]").unwrap();
    assert!(comment < table);
    assert!(toml_str.trim_end().ends_with(r#"file_prefix = "chatview""#));
}

#[test]
fn test_config_roundtrip_customized() {
    let mut config = Config {
        nick_col_width: 10,
        chan_col_width: 20,
        chan_col_enabled: false,
        member_col_width: 8,
        member_col_enabled: false,
        text_max_width: 100,
        mouse: false,
        local_integrations: false,
        ..Default::default()
    };
    config.colors.status = Color::Rgb(0x12, 0x34, 0x56);
    config.colors.unread = Color::Indexed(3);
    config.colors.nicks = ColorSchemeType::Fixed;
    config.colors.nicks_self = Color::Indexed(1);
    config.colors.nicks_others = Color::Rgb(0, 0, 0);
    config.logging.level = "debug".to_string();
    config.logging.file_enabled = true;
    config.logging.file_dir = PathBuf::from("/tmp/chatview-logs");
    config.logging.file_rotation = LogRotation::Never;
    config.logging.file_prefix = "cv".to_string();

    assert_eq!(reload(&config), config);
}

// ─────────────────────────────────────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_file_means_defaults() {
    let file = Config::parse_file("").unwrap();
    assert_eq!(Config::from_parts(file, no_env), Config::default());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let file = Config::parse_file(
        r#"
nick_col_width = 9

[colors]
prompt = "ansi:5"
"#,
    )
    .unwrap();
    let config = Config::from_parts(file, no_env);

    assert_eq!(config.nick_col_width, 9);
    assert_eq!(config.colors.prompt, Color::Indexed(5));
    assert_eq!(config.chan_col_width, 16);
    assert_eq!(config.logging, LoggingConfig::default());
}

#[test]
fn test_side_columns_are_clamped() {
    let file = Config::parse_file("chan_col_width = 2\nmember_col_width = 90\n").unwrap();
    let config = Config::from_parts(file, no_env);
    assert_eq!(config.chan_col_width, 6);
    assert_eq!(config.member_col_width, 24);
}

#[test]
fn test_env_overrides_file() {
    let file = Config::parse_file(
        r#"
mouse = true

[colors]
nicks = "base"

[logging]
file_dir = "/from/file"
"#,
    )
    .unwrap();
    let env: HashMap<&str, &str> = [
        ("CHATVIEW_NO_MOUSE", "1"),
        ("CHATVIEW_NICK_COLORS", "fixed"),
        ("CHATVIEW_LOG_DIR", "/from/env"),
    ]
    .into_iter()
    .collect();
    let config = Config::from_parts(file, |key| env.get(key).map(|v| v.to_string()));

    assert!(!config.mouse);
    assert_eq!(config.colors.nicks, ColorSchemeType::Fixed);
    assert_eq!(config.logging.file_dir, PathBuf::from("/from/env"));
}

#[test]
fn test_no_mouse_env_false_keeps_file_value() {
    let file = Config::parse_file("mouse = false\n").unwrap();
    let config = Config::from_parts(file, |key| {
        (key == "CHATVIEW_NO_MOUSE").then(|| "0".to_string())
    });
    assert!(!config.mouse);

    let file = Config::parse_file("").unwrap();
    let config = Config::from_parts(file, |key| {
        (key == "CHATVIEW_NO_MOUSE").then(|| "0".to_string())
    });
    assert!(config.mouse);
}

#[test]
fn test_unknown_enum_strings_fall_back() {
    let file = Config::parse_file(
        r#"
[colors]
nicks = "neon"

[logging]
file_rotation = "weekly"
"#,
    )
    .unwrap();
    let config = Config::from_parts(file, no_env);
    assert_eq!(config.colors.nicks, ColorSchemeType::Base);
    assert_eq!(config.logging.file_rotation, LogRotation::Daily);
}

#[test]
fn test_invalid_toml_is_an_error() {
    assert!(Config::parse_file("nick_col_width = \"wide\"").is_err());
    assert!(Config::parse_file("[colors\nstatus = 1").is_err());
}

// ─────────────────────────────────────────────────────────────────────────────
// Files
// ─────────────────────────────────────────────────────────────────────────────

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("chatview-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn test_missing_file_is_defaults() {
    let dir = scratch_dir("missing");
    let file = Config::load_file_config(Some(&dir.join("config.toml"))).unwrap();
    assert_eq!(Config::from_parts(file, no_env), Config::default());
}

#[test]
fn test_broken_file_names_path() {
    let dir = scratch_dir("broken");
    let path = dir.join("config.toml");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(&path, "mouse = maybe").unwrap();

    let err = Config::load_file_config(Some(&path)).unwrap_err();
    assert_eq!(err.path, path);
    assert!(err.to_string().contains("config.toml"));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_write_to_creates_parents() {
    let dir = scratch_dir("write");
    let path = dir.join("nested").join("config.toml");
    let config = Config {
        text_max_width: 72,
        ..Default::default()
    };
    config.write_to(&path).unwrap();

    let file = Config::load_file_config(Some(&path)).unwrap();
    assert_eq!(Config::from_parts(file, no_env), config);
    std::fs::remove_dir_all(&dir).unwrap();
}

// ─────────────────────────────────────────────────────────────────────────────
// UI conversion
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_ui_config_carries_layout_and_colors() {
    let config = Config {
        chan_col_enabled: false,
        text_max_width: 80,
        ..Default::default()
    };
    let ui = config.ui_config();
    assert_eq!(ui.nick_col_width, 14);
    assert!(!ui.chan_col_enabled);
    assert_eq!(ui.text_max_width, 80);
    assert_eq!(ui.colors, config.colors.to_ui());
    assert!(ui.auto_complete.is_none());
    assert!(ui.merge_line.is_none());
}
