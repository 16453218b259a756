// CLI module - command-line argument parsing and handlers
//
// Provides subcommands for configuration management:
// - config --show: Display effective configuration
// - config --reset: Regenerate config file with defaults
// - config --path: Print the config file location
//
// Without a subcommand the demo chat session starts.

use anyhow::{bail, Context, Result};
use chatview::config::{color_to_string, Config, VERSION};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};

/// chatview - terminal chat screen demo
#[derive(Parser)]
#[command(name = "chatview")]
#[command(version = VERSION)]
#[command(about = "Terminal chat screen with a mock chat network", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// Handle CLI commands. Returns true if a command was handled (exit after).
pub fn handle_cli() -> Result<bool> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config { show, reset, path }) => {
            if path {
                handle_config_path()?;
            } else if show {
                handle_config_show()?;
            } else if reset {
                let stdin = std::io::stdin();
                handle_config_reset(&mut stdin.lock())?;
            } else {
                println!("Usage: chatview config [--show|--reset|--path]");
                println!();
                println!("Options:");
                println!("  --show    Display effective configuration");
                println!("  --reset   Reset config file to defaults");
                println!("  --path    Show config file path");
            }
            Ok(true)
        }
        None => Ok(false),
    }
}

fn config_path() -> Result<std::path::PathBuf> {
    match Config::config_path() {
        Some(path) => Ok(path),
        None => bail!("Could not determine config path"),
    }
}

fn handle_config_path() -> Result<()> {
    println!("{}", config_path()?.display());
    Ok(())
}

/// Effective values, after env and file layering
pub fn render_effective(config: &Config) -> String {
    let mut out = String::new();
    out.push_str("# Effective configuration (env > file > defaults)\n\n");
    out.push_str(&format!("nick_col_width = {}\n", config.nick_col_width));
    out.push_str(&format!("chan_col_enabled = {}\n", config.chan_col_enabled));
    out.push_str(&format!("chan_col_width = {}\n", config.chan_col_width));
    out.push_str(&format!("member_col_enabled = {}\n", config.member_col_enabled));
    out.push_str(&format!("member_col_width = {}\n", config.member_col_width));
    out.push_str(&format!("text_max_width = {}\n", config.text_max_width));
    out.push_str(&format!("mouse = {}\n", config.mouse));
    out.push_str(&format!("local_integrations = {}\n", config.local_integrations));
    out.push_str("\n[colors]\n");
    out.push_str(&format!("status = {:?}\n", color_to_string(config.colors.status)));
    out.push_str(&format!("prompt = {:?}\n", color_to_string(config.colors.prompt)));
    out.push_str(&format!("unread = {:?}\n", color_to_string(config.colors.unread)));
    out.push_str(&format!("nicks = {:?}\n", config.colors.nicks.as_str()));
    out.push_str(&format!(
        "nicks_self = {:?}\n",
        color_to_string(config.colors.nicks_self)
    ));
    out.push_str(&format!(
        "nicks_others = {:?}\n",
        color_to_string(config.colors.nicks_others)
    ));
    out.push_str("\n[logging]\n");
    out.push_str(&format!("level = {:?}\n", config.logging.level));
    out.push_str(&format!("file_enabled = {}\n", config.logging.file_enabled));
    out.push_str(&format!(
        "file_dir = {:?}\n",
        config.logging.file_dir.display().to_string()
    ));
    out.push_str(&format!(
        "file_rotation = {:?}\n",
        config.logging.file_rotation.as_str()
    ));
    out.push_str(&format!("file_prefix = {:?}\n", config.logging.file_prefix));
    out
}

fn handle_config_show() -> Result<()> {
    let config = Config::load()?;
    print!("{}", render_effective(&config));

    println!();
    let path = config_path()?;
    if path.exists() {
        println!("# Source: {}", path.display());
    } else {
        println!("# Source: defaults (no config file)");
    }
    Ok(())
}

fn handle_config_reset(input: &mut impl BufRead) -> Result<()> {
    let path = config_path()?;

    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush().context("Failed to flush stderr")?;

        let mut answer = String::new();
        input
            .read_line(&mut answer)
            .context("Failed to read answer")?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    Config::default().write_to(&path)?;
    println!("Config reset to defaults: {}", path.display());
    Ok(())
}
