// Terminal backend plumbing
//
// ratatui owns the cell buffer and diffing; this module adds the handful of
// terminal features a chat client needs on top of it (window title, bell,
// desktop notifications, cursor and pointer shapes) and the raw-mode setup
// and teardown around a session.

use anyhow::{Context, Result};
use crossterm::{
    cursor::SetCursorStyle,
    event::{
        DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen, SetTitle,
    },
};
use ratatui::backend::{Backend, CrosstermBackend, TestBackend};
use ratatui::Terminal;
use std::io::{self, Stdout, Write};

/// Text cursor shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Default,
    Block,
    Beam,
    Underline,
}

/// Mouse pointer shape (OSC 22)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseShape {
    #[default]
    Default,
    Clickable,
    Text,
    ResizeHorizontal,
}

impl MouseShape {
    fn css_name(&self) -> &'static str {
        match self {
            MouseShape::Default => "default",
            MouseShape::Clickable => "pointer",
            MouseShape::Text => "text",
            MouseShape::ResizeHorizontal => "ew-resize",
        }
    }
}

/// Terminal features beyond cell drawing
pub trait Host: Backend {
    fn set_title(&mut self, title: &str) -> io::Result<()>;
    fn set_app_id(&mut self, app_id: &str) -> io::Result<()>;
    fn set_cursor_shape(&mut self, shape: CursorShape) -> io::Result<()>;
    fn set_mouse_shape(&mut self, shape: MouseShape) -> io::Result<()>;
    fn bell(&mut self) -> io::Result<()>;
    fn notify(&mut self, title: &str, body: &str) -> io::Result<()>;

    /// Undo whatever `open` did to the terminal
    fn release(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Strip control characters so user text cannot end an escape sequence early
fn sanitize(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

impl<W: Write> Host for CrosstermBackend<W> {
    fn set_title(&mut self, title: &str) -> io::Result<()> {
        execute!(self, SetTitle(sanitize(title)))
    }

    fn set_app_id(&mut self, app_id: &str) -> io::Result<()> {
        write!(self, "\x1b]176;{}\x1b\\", sanitize(app_id))?;
        Write::flush(self)
    }

    fn set_cursor_shape(&mut self, shape: CursorShape) -> io::Result<()> {
        let style = match shape {
            CursorShape::Default => SetCursorStyle::DefaultUserShape,
            CursorShape::Block => SetCursorStyle::SteadyBlock,
            CursorShape::Beam => SetCursorStyle::SteadyBar,
            CursorShape::Underline => SetCursorStyle::SteadyUnderScore,
        };
        execute!(self, style)
    }

    fn set_mouse_shape(&mut self, shape: MouseShape) -> io::Result<()> {
        write!(self, "\x1b]22;{}\x1b\\", shape.css_name())?;
        Write::flush(self)
    }

    fn bell(&mut self) -> io::Result<()> {
        write!(self, "\x07")?;
        Write::flush(self)
    }

    fn notify(&mut self, title: &str, body: &str) -> io::Result<()> {
        // fields are ';'-separated, so the title must not contain one
        let title = sanitize(title).replace(';', ",");
        write!(self, "\x1b]777;notify;{};{}\x1b\\", title, sanitize(body))?;
        Write::flush(self)
    }

    fn release(&mut self) -> io::Result<()> {
        // not every terminal accepted the flags; popping is best effort
        let _ = execute!(self, PopKeyboardEnhancementFlags);
        // every step runs even if an earlier one failed; the first error wins
        let steps = [
            execute!(self, SetCursorStyle::DefaultUserShape),
            execute!(self, DisableBracketedPaste),
            execute!(self, DisableMouseCapture),
            execute!(self, LeaveAlternateScreen),
            disable_raw_mode(),
        ];
        steps.into_iter().find(Result::is_err).unwrap_or(Ok(()))
    }
}

/// Headless backend: everything beyond cells is a no-op
impl Host for TestBackend {
    fn set_title(&mut self, _title: &str) -> io::Result<()> {
        Ok(())
    }

    fn set_app_id(&mut self, _app_id: &str) -> io::Result<()> {
        Ok(())
    }

    fn set_cursor_shape(&mut self, _shape: CursorShape) -> io::Result<()> {
        Ok(())
    }

    fn set_mouse_shape(&mut self, _shape: MouseShape) -> io::Result<()> {
        Ok(())
    }

    fn bell(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn notify(&mut self, _title: &str, _body: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Options for taking over the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalOptions {
    /// Report mouse clicks, drags and wheel events
    pub mouse: bool,
}

/// Put the controlling terminal in raw mode and wrap it for drawing.
///
/// On failure the terminal is restored before the error is returned.
pub fn open(options: TerminalOptions) -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut backend = CrosstermBackend::new(io::stdout());
    if let Err(e) = enter(&mut backend, options) {
        let _ = backend.release();
        return Err(e);
    }
    Terminal::new(backend).or_else(|e| {
        let _ = CrosstermBackend::new(io::stdout()).release();
        Err(e).context("Failed to create terminal")
    })
}

fn enter<W: Write>(backend: &mut CrosstermBackend<W>, options: TerminalOptions) -> Result<()> {
    execute!(backend, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to setup terminal")?;
    if options.mouse {
        execute!(backend, EnableMouseCapture).context("Failed to enable mouse capture")?;
    }
    if matches!(supports_keyboard_enhancement(), Ok(true)) {
        execute!(
            backend,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                    | KeyboardEnhancementFlags::REPORT_ALTERNATE_KEYS
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
            )
        )
        .context("Failed to enable keyboard enhancements")?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Writer whose output stays inspectable after the backend takes it
    #[derive(Clone, Default)]
    pub(crate) struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Sink {
        pub(crate) fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn sanitize_strips_escapes() {
        assert_eq!(sanitize("hi\x1b]0;evil\x07there"), "hi]0;evilthere");
        assert_eq!(sanitize("plain"), "plain");
    }

    #[test]
    fn crossterm_notify_sequence() {
        let sink = Sink::default();
        let mut backend = CrosstermBackend::new(sink.clone());
        backend.notify("#chan; alice", "hello\nworld").unwrap();
        assert_eq!(sink.text(), "\x1b]777;notify;#chan, alice;helloworld\x1b\\");
    }

    #[test]
    fn crossterm_bell_and_mouse_shape() {
        let sink = Sink::default();
        let mut backend = CrosstermBackend::new(sink.clone());
        backend.bell().unwrap();
        backend.set_mouse_shape(MouseShape::ResizeHorizontal).unwrap();
        assert_eq!(sink.text(), "\x07\x1b]22;ew-resize\x1b\\");
    }

    #[test]
    fn crossterm_app_id_sequence() {
        let sink = Sink::default();
        let mut backend = CrosstermBackend::new(sink.clone());
        backend.set_app_id("chatview").unwrap();
        assert_eq!(sink.text(), "\x1b]176;chatview\x1b\\");
    }

    /// Writer that keeps what it was given but reports every write as failed
    #[derive(Clone, Default)]
    pub(crate) struct Broken(pub(crate) Sink);

    impl Write for Broken {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.write(buf)?;
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn release_runs_every_step_after_a_failure() {
        let sink = Sink::default();
        let mut backend = CrosstermBackend::new(Broken(sink.clone()));
        assert!(backend.release().is_err());
        let written = sink.text();
        assert!(written.contains("\x1b[?2004l"), "bracketed paste left on");
        assert!(written.contains("\x1b[?1049l"), "alternate screen left on");
    }
}
