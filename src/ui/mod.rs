// UI module - chat screen session
//
// This module owns the terminal for the lifetime of a chat session. It handles:
// - Terminal setup and teardown, plus the background event pump
// - Pane geometry (channel list, timeline, member list, status, input)
// - Scroll offsets for the side panes
// - Mouse hit-testing against what the last frame drew
// - Drawing a frame and committing it to the terminal
//
// All mutation and drawing happens on the caller's thread. The pump thread
// only talks to it through the event channel and the exit latch.

pub mod backend;
pub mod buffers;
pub mod color;
pub mod draw;
pub mod editor;
pub mod hit;
pub mod image;
pub mod layout;
pub mod members;
pub mod pump;

pub use backend::{CursorShape, Host, MouseShape, TerminalOptions};
pub use buffers::{Line, MergeLineFn, NotifyType};
pub use color::{ColorScheme, ColorSchemeType};
pub use draw::{styled, StyledString};
pub use editor::{AutoCompleteFn, Completion};
pub use hit::{Click, HelpAction};
pub use members::Member;
pub use pump::{AppEvent, CrosstermEvents, EventSource, ExitLatch, Polled, ScriptedEvents};

use self::image::{centered, Image};
use ::image::DynamicImage;
use anyhow::{Context, Result};
use buffers::BufferList;
use color::COLOR_GRAY;
use draw::{clear_area, plain, print_ident, print_string, set_cell};
use editor::Editor;
use hit::HitRegistry;
use layout::{clamp_col_width, Geometry, CHROME_WIDTH, NICK_COL_OFFSET};
use members::MemberPane;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::Terminal;
use std::io::Stdout;
use std::thread::JoinHandle;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

/// Window title and app id announced on startup
const APP_ID: &str = "chatview";

/// Colors used by the chrome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigColors {
    pub status: Color,
    pub prompt: Color,
    pub unread: Color,
    pub nicks: ColorScheme,
}

/// Session configuration
///
/// Built from the user configuration by the caller, who also attaches the
/// function-valued fields.
#[derive(Clone)]
pub struct UiConfig {
    pub nick_col_width: u16,
    pub chan_col_width: u16,
    pub chan_col_enabled: bool,
    pub member_col_width: u16,
    pub member_col_enabled: bool,
    /// Wrap messages at this width when the timeline is wider; 0 disables
    pub text_max_width: u16,
    pub mouse: bool,
    pub auto_complete: Option<AutoCompleteFn>,
    pub merge_line: Option<MergeLineFn>,
    pub colors: ConfigColors,
    /// Allow the terminal to be used for title and desktop notifications
    pub local_integrations: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            nick_col_width: 14,
            chan_col_width: 16,
            chan_col_enabled: true,
            member_col_width: 16,
            member_col_enabled: true,
            text_max_width: 0,
            mouse: true,
            auto_complete: None,
            merge_line: None,
            colors: ConfigColors::default(),
            local_integrations: true,
        }
    }
}

/// Buffer a notification was raised for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyTarget {
    pub net_id: String,
    pub buffer: String,
}

/// Receives highlight notifications for buffers that are not focused
pub trait NotificationSink: Send {
    /// Show a notification; `None` when it was not shown
    fn notify(&mut self, target: &NotifyTarget, header: &str, body: &str) -> Option<u32>;

    /// The buffer a notification belongs to got focus
    fn close(&mut self, _id: u32) {}
}

/// A chat screen session
pub struct Ui<B: Host> {
    terminal: Terminal<B>,
    area: Rect,
    geometry: Geometry,

    events: mpsc::Receiver<AppEvent>,
    injector: mpsc::WeakSender<AppEvent>,
    _pump: JoinHandle<()>,
    exit: ExitLatch,
    config: UiConfig,

    bs: BufferList,
    editor: Editor,
    prompt: StyledString,
    status: String,
    title: String,
    overlay_hint: String,

    channel_offset: usize,
    member_clicked: Option<usize>,
    member_offset: usize,

    channel_width: u16,
    member_width: u16,

    channel_col_clicked: bool,
    member_col_clicked: bool,

    hits: HitRegistry,
    image: Option<Image>,
    notifier: Option<Box<dyn NotificationSink>>,
}

/// Title, clear screen and cursor shape for a fresh session
fn prepare_terminal<B: Host>(terminal: &mut Terminal<B>, local_integrations: bool) -> Result<()> {
    if local_integrations {
        let backend = terminal.backend_mut();
        backend.set_title(APP_ID).context("Failed to set title")?;
        backend.set_app_id(APP_ID).context("Failed to set app id")?;
    }
    terminal.clear().context("Failed to clear terminal")?;
    terminal
        .backend_mut()
        .set_cursor_shape(CursorShape::Beam)
        .context("Failed to set cursor shape")?;
    Ok(())
}

impl Ui<CrosstermBackend<Stdout>> {
    /// Take over the controlling terminal
    pub fn open(config: UiConfig) -> Result<Self> {
        let terminal = backend::open(TerminalOptions {
            mouse: config.mouse,
        })?;
        Self::with_terminal(config, terminal, CrosstermEvents)
    }
}

impl<B: Host> Ui<B> {
    /// Start a session on any terminal, reading events from `source`
    pub fn with_terminal<S: EventSource>(
        config: UiConfig,
        mut terminal: Terminal<B>,
        source: S,
    ) -> Result<Self> {
        let channel_width = if config.chan_col_enabled {
            config.chan_col_width
        } else {
            0
        };
        let member_width = if config.member_col_enabled {
            config.member_col_width
        } else {
            0
        };

        let exit = ExitLatch::new();
        let started = prepare_terminal(&mut terminal, config.local_integrations)
            .and_then(|()| pump::spawn(source, exit.clone()));
        let pump = match started {
            Ok(pump) => pump,
            Err(e) => {
                // no partial session: hand the terminal back before failing
                let _ = terminal.backend_mut().release();
                return Err(e);
            }
        };

        let bs = BufferList::new(config.colors, config.merge_line.clone());
        let editor = Editor::new(config.auto_complete.clone());

        let mut ui = Self {
            terminal,
            area: Rect::default(),
            geometry: Geometry::compute(0, 0, 0, 0, 0, 0),
            events: pump.events,
            injector: pump.injector,
            _pump: pump.handle,
            exit,
            config,
            bs,
            editor,
            prompt: StyledString::default(),
            status: String::new(),
            title: String::new(),
            overlay_hint: String::new(),
            channel_offset: 0,
            member_clicked: None,
            member_offset: 0,
            channel_width,
            member_width,
            channel_col_clicked: false,
            member_col_clicked: false,
            hits: HitRegistry::new(),
            image: None,
            notifier: None,
        };
        if let Err(e) = ui.resize() {
            ui.exit.trigger();
            let _ = ui.terminal.backend_mut().release();
            return Err(e);
        }

        tracing::info!(
            width = ui.area.width,
            height = ui.area.height,
            "Chat screen started"
        );
        Ok(ui)
    }

    pub fn should_exit(&self) -> bool {
        self.exit.is_set()
    }

    /// Ask the session to stop; the pump notices on its next event
    pub fn exit(&self) {
        self.exit.trigger();
    }

    /// Give the terminal back
    pub fn close(mut self) -> Result<()> {
        self.exit.trigger();
        self.terminal
            .backend_mut()
            .release()
            .context("Failed to restore terminal")?;
        self.terminal
            .show_cursor()
            .context("Failed to show cursor")?;
        tracing::info!("Chat screen closed");
        Ok(())
    }

    /// Wait for the next event; `None` once the pump has stopped.
    ///
    /// Blocks the thread, so it must not be called from async code.
    pub fn next_event(&mut self) -> Option<AppEvent> {
        self.events.blocking_recv()
    }

    /// Async variant of [`Ui::next_event`]
    pub async fn recv_event(&mut self) -> Option<AppEvent> {
        self.events.recv().await
    }

    /// Non-blocking read; `Disconnected` is final
    pub fn try_event(&mut self) -> Result<AppEvent, TryRecvError> {
        self.events.try_recv()
    }

    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    pub fn set_notifier(&mut self, sink: Box<dyn NotificationSink>) {
        self.notifier = Some(sink);
    }

    // Buffers

    pub fn buffer(&self, i: usize) -> Option<(&str, &str)> {
        self.bs.buffer(i)
    }

    pub fn current_buffer(&self) -> Option<(&str, &str)> {
        self.bs.current()
    }

    /// Reset per-buffer view state after the selection moved
    fn buffer_switched(&mut self) {
        self.member_offset = 0;
        self.scroll_to_buffer();
        let ids = self.bs.take_closed_notifications();
        if let Some(sink) = self.notifier.as_mut() {
            for id in ids {
                sink.close(id);
            }
        }
    }

    pub fn next_buffer(&mut self) {
        self.bs.next();
        self.buffer_switched();
    }

    pub fn previous_buffer(&mut self) {
        self.bs.previous();
        self.buffer_switched();
    }

    pub fn next_unread_buffer(&mut self) {
        self.bs.next_unread();
        self.buffer_switched();
    }

    pub fn previous_unread_buffer(&mut self) {
        self.bs.previous_unread();
        self.buffer_switched();
    }

    pub fn clicked_buffer(&self) -> Option<usize> {
        self.bs.clicked()
    }

    /// Remember the buffer under a mouse press; out of range indices are ignored
    pub fn click_buffer(&mut self, i: Option<usize>) {
        match i {
            Some(i) if i >= self.bs.len() => {}
            other => self.bs.set_clicked(other),
        }
    }

    pub fn go_to_buffer_no(&mut self, i: usize) {
        if self.bs.to(i) {
            self.buffer_switched();
        }
    }

    pub fn show_buffer_numbers(&mut self, enable: bool) {
        self.bs.show_buffer_numbers(enable);
    }

    /// Select the first buffer whose title contains `sub`, ignoring case
    pub fn jump_buffer(&mut self, sub: &str) -> bool {
        let sub = sub.to_lowercase();
        let found = self
            .bs
            .iter()
            .position(|b| b.title().to_lowercase().contains(&sub));
        match found {
            Some(i) => {
                self.go_to_buffer_no(i);
                true
            }
            None => false,
        }
    }

    pub fn jump_buffer_index(&mut self, i: usize) -> bool {
        if i < self.bs.len() {
            self.go_to_buffer_no(i);
            true
        } else {
            false
        }
    }

    pub fn jump_buffer_network(&mut self, net_id: &str, buffer: &str) -> bool {
        match self.bs.find(net_id, buffer) {
            Some(i) => {
                self.go_to_buffer_no(i);
                true
            }
            None => false,
        }
    }

    pub fn add_buffer(&mut self, net_id: &str, net_name: &str, title: &str) -> (usize, bool) {
        let (i, added) = self.bs.add(net_id, net_name, title);
        if added {
            self.scroll_to_buffer();
        }
        (i, added)
    }

    pub fn remove_buffer(&mut self, net_id: &str, title: &str) {
        self.bs.remove(net_id, title);
        self.buffer_switched();
    }

    pub fn remove_network_buffers(&mut self, net_id: &str) {
        self.bs.remove_network(net_id);
        self.buffer_switched();
    }

    /// Append a line, raising a notification for highlights in unfocused buffers
    pub fn add_line(&mut self, net_id: &str, buffer: &str, line: Line) {
        let notification = (line.notify == NotifyType::Highlight).then(|| {
            let header = if buffer != line.head {
                format!("{}: {}", buffer, line.head)
            } else {
                line.head.clone()
            };
            (header, plain(&line.body))
        });

        self.bs.add_line(net_id, buffer, line);

        let Some((header, body)) = notification else {
            return;
        };
        let focused = self.bs.find(net_id, buffer);
        if focused.is_none() || focused == Some(self.bs.current_index()) {
            return;
        }

        let target = NotifyTarget {
            net_id: net_id.to_string(),
            buffer: buffer.to_string(),
        };
        let id = match self.notifier.as_mut() {
            Some(sink) => sink.notify(&target, &header, &body),
            None => {
                self.notify(&header, &body);
                None
            }
        };
        if let Some(id) = id {
            self.bs.push_notification(net_id, buffer, id);
        }
    }

    pub fn add_lines(&mut self, net_id: &str, buffer: &str, before: Vec<Line>, after: Vec<Line>) {
        self.bs.add_lines(net_id, buffer, before, after);
    }

    pub fn add_overlay_line(&mut self, line: Line) {
        self.bs.add_overlay_line(line);
    }

    pub fn set_topic(&mut self, net_id: &str, buffer: &str, topic: &str) {
        self.bs.set_topic(net_id, buffer, topic);
    }

    pub fn set_read(&mut self, net_id: &str, buffer: &str, at: chrono::DateTime<chrono::Utc>) {
        self.bs.set_read(net_id, buffer, at);
    }

    pub fn update_read(&mut self) -> Option<(String, String, chrono::DateTime<chrono::Utc>)> {
        self.bs.update_read()
    }

    // Columns

    pub fn click_channel_col(&mut self, clicked: bool) {
        self.channel_col_clicked = clicked;
    }

    pub fn channel_col_clicked(&self) -> bool {
        self.channel_col_clicked
    }

    pub fn resize_channel_col(&mut self, width: i32) -> Result<()> {
        self.channel_width = clamp_col_width(width);
        self.resize()
    }

    pub fn click_member_col(&mut self, clicked: bool) {
        self.member_col_clicked = clicked;
    }

    pub fn member_col_clicked(&self) -> bool {
        self.member_col_clicked
    }

    pub fn resize_member_col(&mut self, width: i32) -> Result<()> {
        self.member_width = clamp_col_width(width);
        self.resize()
    }

    pub fn toggle_channel_list(&mut self) -> Result<()> {
        self.channel_width = if self.channel_width == 0 {
            self.config.chan_col_width
        } else {
            0
        };
        self.resize()
    }

    pub fn toggle_member_list(&mut self) -> Result<()> {
        self.member_width = if self.member_width == 0 {
            self.config.member_col_width
        } else {
            0
        };
        self.resize()
    }

    pub fn channel_width(&self) -> u16 {
        self.channel_width
    }

    pub fn member_width(&self) -> u16 {
        self.member_width
    }

    // Scrolling

    /// Scroll the timeline up by half its height
    pub fn scroll_up(&mut self) {
        let half = usize::from(self.bs.timeline_height() / 2);
        self.bs.scroll_up(half);
    }

    pub fn scroll_down(&mut self) {
        let half = usize::from(self.bs.timeline_height() / 2);
        self.bs.scroll_down(half);
    }

    pub fn scroll_up_by(&mut self, n: usize) {
        self.bs.scroll_up(n);
    }

    pub fn scroll_down_by(&mut self, n: usize) {
        self.bs.scroll_down(n);
    }

    pub fn scroll_up_highlight(&mut self) -> bool {
        self.bs.scroll_up_highlight()
    }

    pub fn scroll_down_highlight(&mut self) -> bool {
        self.bs.scroll_down_highlight()
    }

    pub fn scroll_channel_up_by(&mut self, n: usize) {
        self.channel_offset = self.channel_offset.saturating_sub(n);
    }

    /// No upper bound here: the next draw clamps against the buffer count
    pub fn scroll_channel_down_by(&mut self, n: usize) {
        self.channel_offset = self.channel_offset.saturating_add(n);
    }

    pub fn scroll_member_up_by(&mut self, n: usize) {
        self.member_offset = self.member_offset.saturating_sub(n);
    }

    pub fn scroll_member_down_by(&mut self, n: usize) {
        self.member_offset = self.member_offset.saturating_add(n);
    }

    pub fn channel_offset(&self) -> usize {
        self.channel_offset
    }

    pub fn member_offset(&self) -> usize {
        self.member_offset
    }

    /// Buffer index of the tab under column `x` of the horizontal bar
    pub fn horizontal_buffer_offset(&self, x: u16) -> Option<usize> {
        self.bs.horizontal_buffer_offset(x, self.channel_offset)
    }

    pub fn is_at_top(&self) -> bool {
        self.bs.is_at_top()
    }

    /// Move the channel offset just enough to show the current buffer
    pub fn scroll_to_buffer(&mut self) {
        let current = self.bs.current_index();
        if current < self.channel_offset {
            self.channel_offset = current;
            return;
        }

        let first = if self.channel_width > 0 {
            (current + 1).saturating_sub(usize::from(self.area.height))
        } else {
            self.bs
                .get_left_most(self.area.width.saturating_sub(self.member_width))
        };
        if self.channel_offset < first {
            self.channel_offset = first;
        }
    }

    // Members

    pub fn clicked_member(&self) -> Option<usize> {
        self.member_clicked
    }

    pub fn click_member(&mut self, i: Option<usize>) {
        self.member_clicked = i;
    }

    /// Send the event of the first region under `(x, y)` drawn by the last frame
    pub fn click(&mut self, x: u16, y: u16) {
        let Some(event) = self.hits.find(x, y) else {
            return;
        };
        let Some(tx) = self.injector.upgrade() else {
            tracing::warn!("Event channel closed, dropping click {:?}", event);
            return;
        };
        // the caller is also the consumer, so waiting for room would never end
        if let Err(e) = tx.try_send(AppEvent::Click(event)) {
            tracing::warn!("Dropping click event: {}", e);
        }
    }

    // Overlay

    pub fn open_overlay(&mut self, hint: &str) {
        self.bs.open_overlay();
        self.overlay_hint = hint.to_string();
    }

    pub fn close_overlay(&mut self) {
        self.bs.close_overlay();
    }

    pub fn has_overlay(&self) -> bool {
        self.bs.has_overlay()
    }

    // Chrome

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    pub fn set_prompt(&mut self, prompt: StyledString) {
        self.prompt = prompt;
    }

    pub fn set_title(&mut self, title: &str) {
        if self.title == title {
            return;
        }
        self.title = title.to_string();
        if !self.config.local_integrations {
            return;
        }
        if let Err(e) = self.terminal.backend_mut().set_title(title) {
            tracing::warn!("Failed to set terminal title: {}", e);
        }
    }

    pub fn set_mouse_shape(&mut self, shape: MouseShape) {
        if let Err(e) = self.terminal.backend_mut().set_mouse_shape(shape) {
            tracing::warn!("Failed to set mouse shape: {}", e);
        }
    }

    /// Terminal size as of the last resize
    pub fn size(&self) -> (u16, u16) {
        (self.area.width, self.area.height)
    }

    /// Pane sizes as of the last resize
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn beep(&mut self) {
        if let Err(e) = self.terminal.backend_mut().bell() {
            tracing::warn!("Failed to ring bell: {}", e);
        }
    }

    /// Desktop notification through the terminal
    pub fn notify(&mut self, title: &str, body: &str) {
        if !self.config.local_integrations {
            return;
        }
        if let Err(e) = self.terminal.backend_mut().notify(title, body) {
            tracing::warn!("Failed to send notification: {}", e);
        }
    }

    // Input

    /// Current input; valid until the next input call
    pub fn input_content(&self) -> &[char] {
        self.editor.content()
    }

    pub fn input_char(&mut self, c: char) {
        self.editor.put_char(c);
    }

    /// Returns true when the key was used to accept a completion
    pub fn input_enter(&mut self) -> bool {
        self.editor.enter()
    }

    pub fn input_right(&mut self) {
        self.editor.right();
    }

    pub fn input_right_word(&mut self) {
        self.editor.right_word();
    }

    pub fn input_left(&mut self) {
        self.editor.left();
    }

    pub fn input_left_word(&mut self) {
        self.editor.left_word();
    }

    pub fn input_home(&mut self) {
        self.editor.home();
    }

    pub fn input_end(&mut self) {
        self.editor.end();
    }

    pub fn input_up(&mut self) {
        self.editor.up();
    }

    pub fn input_down(&mut self) {
        self.editor.down();
    }

    pub fn input_backspace(&mut self) -> bool {
        self.editor.rem_cluster()
    }

    pub fn input_delete(&mut self) -> bool {
        self.editor.rem_cluster_forward()
    }

    pub fn input_delete_word(&mut self) -> bool {
        self.editor.rem_word()
    }

    pub fn input_auto_complete(&mut self) -> bool {
        self.editor.auto_complete()
    }

    pub fn input_flush(&mut self) -> String {
        self.editor.flush()
    }

    pub fn input_clear(&mut self) -> bool {
        self.editor.clear()
    }

    pub fn input_set(&mut self, text: &str) {
        self.editor.set(text);
    }

    pub fn input_back_search(&mut self) {
        self.editor.back_search();
    }

    // Image

    /// Whether an attached image has been laid out
    pub fn image_ready(&self) -> bool {
        self.image
            .as_ref()
            .is_some_and(|image| image.cell_size() != (0, 0))
    }

    /// Attach an image drawn over everything, or detach with `None`.
    ///
    /// Returns false when the image cannot be shown; the previous image stays.
    pub fn show_image(&mut self, img: Option<&DynamicImage>) -> bool {
        let Some(img) = img else {
            self.image = None;
            return true;
        };
        match Image::new(img) {
            Ok(mut image) => {
                let (cols, rows) = image_box(self.area);
                image.resize(cols, rows);
                self.image = Some(image);
                true
            }
            Err(e) => {
                tracing::debug!("Cannot show image: {}", e);
                false
            }
        }
    }

    // Rendering

    /// Re-read the terminal size and lay the panes out again
    pub fn resize(&mut self) -> Result<()> {
        self.terminal
            .autoresize()
            .context("Failed to resize terminal")?;
        let size = self.terminal.size().context("Failed to read terminal size")?;
        self.area = Rect::new(0, 0, size.width, size.height);

        self.geometry = Geometry::compute(
            size.width,
            size.height,
            self.channel_width,
            self.config.nick_col_width,
            self.member_width,
            self.config.text_max_width,
        );
        self.editor.resize(self.geometry.inner_width);
        self.bs.resize_timeline(
            self.geometry.inner_width,
            self.geometry.timeline_height,
            self.geometry.text_width,
        );
        self.scroll_to_buffer();
        if let Some(image) = self.image.as_mut() {
            image.resize(size.width, size.height);
        }

        tracing::debug!(
            width = size.width,
            height = size.height,
            inner_width = self.geometry.inner_width,
            timeline_height = self.geometry.timeline_height,
            "Layout recomputed"
        );
        Ok(())
    }

    /// Draw a frame and commit it to the terminal.
    ///
    /// `members` are the members of the current buffer.
    pub fn draw(&mut self, members: &[Member]) -> Result<()> {
        self.hits.clear();

        let Rect {
            width: w,
            height: h,
            ..
        } = self.area;
        let nick = self.config.nick_col_width;
        let horizontal = self.channel_width == 0;
        let buf = self.terminal.current_buffer_mut();

        self.bs.draw_timeline(buf, self.channel_width, 0, nick);
        if horizontal {
            self.bs.draw_horizontal_buffer_list(
                buf,
                &mut self.hits,
                0,
                h.saturating_sub(1),
                w.saturating_sub(self.member_width),
                &mut self.channel_offset,
            );
        } else {
            self.bs.draw_vertical_buffer_list(
                buf,
                &mut self.hits,
                0,
                0,
                self.channel_width,
                h,
                &mut self.channel_offset,
            );
        }

        if self.member_width != 0 {
            let pane = MemberPane {
                members,
                colors: &self.config.colors,
                in_channel: self.bs.current().is_some_and(|(_, title)| !title.is_empty()),
            };
            let area = Rect::new(w.saturating_sub(self.member_width), 0, self.member_width, h);
            pane.draw(
                buf,
                &mut self.hits,
                area,
                &mut self.member_offset,
                &mut self.member_clicked,
            );
        }

        if horizontal {
            draw_status_bar(
                buf,
                0,
                h.saturating_sub(3),
                w.saturating_sub(self.member_width),
                nick,
                &self.status,
            );
        } else {
            draw_status_bar(
                buf,
                self.channel_width,
                h.saturating_sub(2),
                w.saturating_sub(self.channel_width + self.member_width),
                nick,
                &self.status,
            );
        }

        let overlay_prompt;
        let prompt = if self.bs.has_overlay() && self.editor.is_empty() {
            overlay_prompt = styled(">", Style::default().fg(self.config.colors.prompt));
            &overlay_prompt
        } else {
            &self.prompt
        };
        let (prompt_x, input_y) = if horizontal {
            (0, h.saturating_sub(2))
        } else {
            (self.channel_width, h.saturating_sub(1))
        };
        for x in prompt_x..prompt_x + CHROME_WIDTH + nick {
            set_cell(buf, x, input_y, " ", Style::default());
        }
        print_ident(buf, prompt_x + NICK_COL_OFFSET, input_y, nick, prompt);

        let hint = if self.bs.has_overlay() {
            self.overlay_hint.as_str()
        } else {
            ""
        };
        let editor_x = prompt_x + CHROME_WIDTH + nick;
        let cursor_x = self.editor.draw(buf, editor_x, input_y, hint);

        if let Some(image) = &self.image {
            let (iw, ih) = image.cell_size();
            image.draw(buf, centered(self.area, iw, ih));
        }

        self.terminal.flush().context("Failed to draw frame")?;
        self.terminal.swap_buffers();
        self.terminal
            .set_cursor_position(Position::new(cursor_x, input_y))
            .context("Failed to move cursor")?;
        self.terminal
            .show_cursor()
            .context("Failed to show cursor")?;
        Backend::flush(self.terminal.backend_mut()).context("Failed to flush terminal")?;
        Ok(())
    }
}

/// Cells an image may cover: nine tenths of the screen each way
fn image_box(area: Rect) -> (u16, u16) {
    let scale = |n: u16| (u32::from(n) * 9 / 10) as u16;
    (scale(area.width), scale(area.height))
}

/// Status line: `--` under the nick column, then the status text
fn draw_status_bar(
    buf: &mut ratatui::buffer::Buffer,
    x0: u16,
    y: u16,
    width: u16,
    nick_col_width: u16,
    status: &str,
) {
    clear_area(buf, x0, y, width, 1);
    if status.is_empty() {
        return;
    }

    let style = Style::default().fg(COLOR_GRAY);
    let mut x = x0 + 5 + nick_col_width;
    print_string(buf, &mut x, y, &styled("--", style));
    x += 2;
    print_string(buf, &mut x, y, &styled(status, style));
}
