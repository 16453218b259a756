// chatview - terminal chat screen demo
//
// Runs the chat screen against a mock network so every part of it can be
// tried without a server.
//
// Architecture:
// - Ui (library): owns the terminal, draws panes, turns mouse input into clicks
// - App: plays the chat client, mapping keys and demo traffic onto the Ui
// - Demo: tokio task producing joins, messages and away changes
// - Logging: tracing events captured in memory and shown in the server buffer

mod app;
mod cli;
mod demo;

use anyhow::Result;
use app::{App, SharedNicks};
use chatview::config::{Config, LogRotation, LoggingConfig};
use chatview::logging::{LogBuffer, TuiLogLayer};
use chatview::ui::Ui;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How often the screen is redrawn without input (read markers, log drain)
const TICK: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> Result<()> {
    // Handle CLI commands first (config --show, --reset, --path)
    // If a command was handled, exit early
    if cli::handle_cli()? {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: invalid configuration in {}", e);
            eprintln!("Fix the file or run `chatview config --reset`.");
            std::process::exit(1);
        }
    };

    // The terminal belongs to the chat screen from here on, so logs are
    // captured in memory and optionally mirrored to a JSON file
    let log_buffer = LogBuffer::new();
    let _file_guard = init_tracing(&config.logging, &log_buffer);

    let nicks: SharedNicks = Arc::new(Mutex::new(Vec::new()));
    let ui = Ui::open(app::ui_config(&config, nicks.clone()))?;
    let mut app = App::new(ui, &config, nicks, log_buffer);

    let (demo_tx, mut demo_rx) = mpsc::channel(64);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let demo_task = tokio::spawn(demo::run_demo(demo_tx, shutdown_rx));

    let result = run(&mut app, &mut demo_rx).await;

    // Stop the generator, then give the terminal back whatever happened
    let _ = shutdown_tx.send(());
    let _ = demo_task.await;
    let closed = app.close();

    result.and(closed)
}

async fn run(
    app: &mut App<ratatui::backend::CrosstermBackend<std::io::Stdout>>,
    demo_rx: &mut mpsc::Receiver<demo::DemoEvent>,
) -> Result<()> {
    let mut ticker = tokio::time::interval(TICK);
    app.draw()?;

    while !app.should_exit() {
        tokio::select! {
            event = app.next_event() => match event {
                Some(event) => app.handle_event(event)?,
                None => {
                    tracing::info!("Event stream ended");
                    break;
                }
            },
            Some(event) = demo_rx.recv() => app.handle_demo(event),
            _ = ticker.tick() => {}
        }
        app.draw()?;
    }

    Ok(())
}

/// Install the global subscriber.
///
/// Precedence: RUST_LOG env var > config file > default "info". The returned
/// guard must be kept alive for the file writer to flush.
fn init_tracing(
    logging: &LoggingConfig,
    buffer: &LogBuffer,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let default_filter = format!("chatview={}", logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    if !logging.file_enabled {
        tracing_subscriber::registry()
            .with(filter)
            .with(TuiLogLayer::new(buffer.clone()))
            .init();
        return None;
    }

    if let Err(e) = std::fs::create_dir_all(&logging.file_dir) {
        // Fall back to in-memory logging only
        tracing_subscriber::registry()
            .with(filter)
            .with(TuiLogLayer::new(buffer.clone()))
            .init();
        tracing::warn!(
            "Could not create log directory {}: {}",
            logging.file_dir.display(),
            e
        );
        return None;
    }

    let file_appender = match logging.file_rotation {
        LogRotation::Hourly => {
            tracing_appender::rolling::hourly(&logging.file_dir, &logging.file_prefix)
        }
        LogRotation::Daily => {
            tracing_appender::rolling::daily(&logging.file_dir, &logging.file_prefix)
        }
        LogRotation::Never => {
            tracing_appender::rolling::never(&logging.file_dir, &logging.file_prefix)
        }
    };

    // Writes happen on a background thread
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(TuiLogLayer::new(buffer.clone()))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    Some(guard)
}
