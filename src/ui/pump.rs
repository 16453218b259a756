// Event pump
//
// A single background thread blocks on the terminal's event source and
// forwards everything it reads onto a bounded application channel. The
// pump thread owns the only strong sender: when it returns, the channel
// closes and consumers observe end-of-stream.
//
// Shutdown goes through a one-way exit latch. Setting it does not interrupt
// a read in progress; the pump notices on the next event.

use super::hit::Click;
use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::mpsc;

/// Capacity of the application event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 128;

/// Events delivered to the application
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Raw terminal event (key, mouse, resize, paste, focus)
    Terminal(Event),
    /// Logical event from a clicked region
    Click(Click),
}

/// One-way shutdown flag shared between the pump and the caller
///
/// Once set it stays set.
#[derive(Debug, Clone, Default)]
pub struct ExitLatch(Arc<AtomicBool>);

impl ExitLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of one blocking poll
#[derive(Debug)]
pub enum Polled {
    Event(Event),
    /// The backend is going away; no more events will come
    Quit,
}

/// Blocking source of terminal events
pub trait EventSource: Send + 'static {
    fn poll(&mut self) -> Polled;
}

/// Reads events from the controlling terminal
#[derive(Debug, Default)]
pub struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn poll(&mut self) -> Polled {
        match event::read() {
            Ok(ev) => Polled::Event(ev),
            Err(e) => {
                tracing::warn!("Terminal event read failed, stopping input: {}", e);
                Polled::Quit
            }
        }
    }
}

/// Replays a fixed list of events, then quits
///
/// Used for headless sessions and tests.
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    events: VecDeque<Event>,
}

impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl EventSource for ScriptedEvents {
    fn poll(&mut self) -> Polled {
        match self.events.pop_front() {
            Some(ev) => Polled::Event(ev),
            None => Polled::Quit,
        }
    }
}

/// Handles returned by [`spawn`]
pub struct Pump {
    pub events: mpsc::Receiver<AppEvent>,
    /// Lets the caller inject click events without keeping the channel open
    pub injector: mpsc::WeakSender<AppEvent>,
    pub handle: JoinHandle<()>,
}

/// Start the pump thread
pub fn spawn<S: EventSource>(mut source: S, exit: ExitLatch) -> Result<Pump> {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let injector = tx.downgrade();

    let handle = std::thread::Builder::new()
        .name("event-pump".to_string())
        .spawn(move || {
            while !exit.is_set() {
                match source.poll() {
                    Polled::Quit => {
                        tracing::debug!("Event source quit");
                        exit.trigger();
                        break;
                    }
                    Polled::Event(ev) => {
                        // Blocks when the consumer lags behind
                        if tx.blocking_send(AppEvent::Terminal(ev)).is_err() {
                            tracing::debug!("Event receiver dropped, stopping pump");
                            break;
                        }
                    }
                }
            }
            drop(tx);
        })
        .context("Failed to spawn event pump thread")?;

    Ok(Pump {
        events: rx,
        injector,
        handle,
    })
}
