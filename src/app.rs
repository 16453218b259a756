// Demo client - maps terminal input and demo traffic onto the chat screen
//
// The chat screen itself knows nothing about networks or commands. This
// module plays the part of a chat client: it owns the member lists, turns
// demo events into lines, dispatches keys and mouse gestures, and drains
// captured logs into the server buffer.

use crate::demo::{DemoEvent, NET_ID, NET_NAME, SELF_NICK};
use anyhow::Result;
use chatview::config::Config;
use chatview::logging::{LogBuffer, LogLevel};
use chatview::ui::color::{ident_color, ident_span, COLOR_GRAY, COLOR_RED};
use chatview::ui::{
    styled, AppEvent, AutoCompleteFn, Click, ColorScheme, Completion, HelpAction, Host, Line,
    Member, MergeLineFn, MouseShape, NotifyType, StyledString, Ui, UiConfig,
};
use chrono::Utc;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::style::Style;
use ratatui::text::Span;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Nicknames offered by completion, refreshed on every draw
pub type SharedNicks = Arc<Mutex<Vec<String>>>;

const HELP: [&str; 12] = [
    "Ctrl+N / Ctrl+P      next / previous buffer",
    "Alt+Up / Alt+Down    previous / next unread buffer",
    "Alt+0..9             go to buffer",
    "PageUp / PageDown    scroll the timeline",
    "Alt+PageUp/PageDown  jump between highlights",
    "Tab                  complete nicknames",
    "Ctrl+R               search input history",
    "F2                   show buffer numbers",
    "F7 / F8              toggle channel / member list",
    "Mouse drag           resize the side columns",
    "/join /part /query /topic /buffer /quit",
    "Ctrl+C / Ctrl+Q      quit",
];

/// Chat screen settings with the demo's completion and line merging attached
pub fn ui_config(config: &Config, nicks: SharedNicks) -> UiConfig {
    let mut ui = config.ui_config();
    ui.auto_complete = Some(nick_completer(nicks));
    let merge: MergeLineFn = Arc::new(merge_lines);
    ui.merge_line = Some(merge);
    ui
}

/// Complete the word before the cursor against known nicknames.
///
/// At the start of the line the nick is followed by `: `, elsewhere by a space.
pub fn nick_completer(nicks: SharedNicks) -> AutoCompleteFn {
    Arc::new(move |cursor: usize, text: &[char]| {
        let cursor = cursor.min(text.len());
        let start = text[..cursor]
            .iter()
            .rposition(|c| *c == ' ')
            .map_or(0, |i| i + 1);
        let word: String = text[start..cursor].iter().collect::<String>().to_lowercase();
        if word.is_empty() {
            return Vec::new();
        }

        let nicks = nicks.lock().unwrap_or_else(|e| e.into_inner());
        nicks
            .iter()
            .filter(|nick| nick.to_lowercase().starts_with(&word))
            .map(|nick| {
                let suffix = if start == 0 { ": " } else { " " };
                let inserted: Vec<char> = nick.chars().chain(suffix.chars()).collect();
                let mut full = text[..start].to_vec();
                full.extend_from_slice(&inserted);
                let cursor_idx = full.len();
                full.extend_from_slice(&text[cursor..]);
                Completion {
                    start_idx: start,
                    end_idx: cursor,
                    text: full,
                    display: nick.chars().collect(),
                    cursor_idx,
                }
            })
            .collect()
    })
}

/// Fold consecutive join notices into one line
pub fn merge_lines(last: &mut Line, next: Line) {
    last.body.spans.push(Span::raw("  "));
    last.body.spans.extend(next.body.spans);
}

/// Demo chat client driving a [`Ui`]
pub struct App<B: Host> {
    ui: Ui<B>,
    nicks: SharedNicks,
    logs: LogBuffer,
    scheme: ColorScheme,

    /// Members per channel, keyed by lowercase channel name
    members: HashMap<String, Vec<Member>>,
    /// Channels whose history was already loaded
    history_loaded: HashSet<String>,

    mouse_down: bool,
    /// Help menu entry under the pointer while the button is held
    help_pressed: Option<HelpAction>,
    show_numbers: bool,
}

impl<B: Host> App<B> {
    pub fn new(mut ui: Ui<B>, config: &Config, nicks: SharedNicks, logs: LogBuffer) -> Self {
        ui.add_buffer(NET_ID, NET_NAME, "");
        let scheme = config.colors.to_ui().nicks;
        ui.set_prompt(StyledString::from(ident_span(&scheme, SELF_NICK, true)));
        ui.set_title(&format!("chatview - {}", NET_NAME));

        Self {
            ui,
            nicks,
            logs,
            scheme,
            members: HashMap::new(),
            history_loaded: HashSet::new(),
            mouse_down: false,
            help_pressed: None,
            show_numbers: false,
        }
    }

    pub fn ui(&self) -> &Ui<B> {
        &self.ui
    }

    pub fn should_exit(&self) -> bool {
        self.ui.should_exit()
    }

    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.ui.recv_event().await
    }

    pub fn close(self) -> Result<()> {
        self.ui.close()
    }

    fn current_members(&self) -> &[Member] {
        self.ui
            .current_buffer()
            .and_then(|(_, title)| self.members.get(&title.to_lowercase()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Draw a frame after syncing logs, completion candidates and read markers
    pub fn draw(&mut self) -> Result<()> {
        self.drain_logs();

        let names: Vec<String> = self.current_members().iter().map(|m| m.name.clone()).collect();
        *self.nicks.lock().unwrap_or_else(|e| e.into_inner()) = names;

        if let Some((net, buffer, at)) = self.ui.update_read() {
            tracing::debug!(net = %net, buffer = %buffer, %at, "Read marker moved");
        }

        let members = self.current_members().to_vec();
        self.ui.draw(&members)
    }

    fn drain_logs(&mut self) {
        let entries = self.logs.take();
        if entries.is_empty() {
            return;
        }
        let lines = entries.into_iter().map(|entry| {
            let color = match entry.level {
                LogLevel::Error => COLOR_RED,
                _ => COLOR_GRAY,
            };
            let mut line = Line::new(
                entry.timestamp,
                entry.level.as_str(),
                styled(entry.message, Style::default().fg(COLOR_GRAY)),
            );
            line.head_style = Style::default().fg(color);
            line
        });
        self.ui.add_lines(NET_ID, "", Vec::new(), lines.collect());
    }

    // Demo traffic

    pub fn handle_demo(&mut self, event: DemoEvent) {
        match event {
            DemoEvent::Join {
                channel,
                topic,
                mut members,
            } => {
                self.ui.add_buffer(NET_ID, "", &channel);
                self.ui.set_topic(NET_ID, &channel, &topic);
                sort_members(&mut members);
                self.members.insert(channel.to_lowercase(), members);
                self.notice(&channel, styled(format!("Joined {}", channel), Style::default()));
            }
            DemoEvent::Message {
                channel,
                nick,
                text,
            } => {
                let is_self = nick == SELF_NICK;
                let mentioned = !is_self && mentions(&text, SELF_NICK);
                let mut line = Line::new(Utc::now(), nick.clone(), styled(text, Style::default()));
                line.head_style = Style::default().fg(ident_color(&self.scheme, &nick, is_self));
                line.notify = if mentioned {
                    NotifyType::Highlight
                } else {
                    NotifyType::Unread
                };
                line.highlight = mentioned;
                self.ui.add_line(NET_ID, &channel, line);
            }
            DemoEvent::MemberJoin { channel, nick } => {
                if let Some(members) = self.members.get_mut(&channel.to_lowercase()) {
                    members.push(Member::new(nick.clone()));
                    sort_members(members);
                }
                let body = StyledString::from(vec![
                    Span::styled("+", Style::default().fg(COLOR_GRAY)),
                    ident_span(&self.scheme, &nick, false),
                ]);
                let mut line = Line::new(Utc::now(), "--", body);
                line.head_style = Style::default().fg(COLOR_GRAY);
                line.mergeable = true;
                self.ui.add_line(NET_ID, &channel, line);
            }
            DemoEvent::Away { nick, away } => {
                for member in self.members.values_mut().flatten() {
                    if member.name == nick {
                        member.away = away;
                    }
                }
            }
        }
    }

    fn notice(&mut self, buffer: &str, body: StyledString) {
        let mut line = Line::new(Utc::now(), "--", body);
        line.head_style = Style::default().fg(COLOR_GRAY);
        self.ui.add_line(NET_ID, buffer, line);
    }

    // Terminal events

    pub fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::Terminal(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                self.handle_key(key)?
            }
            AppEvent::Terminal(Event::Mouse(mouse)) => self.handle_mouse(mouse)?,
            AppEvent::Terminal(Event::Resize(_, _)) => self.ui.resize()?,
            AppEvent::Terminal(Event::Paste(text)) => {
                for c in text.chars() {
                    self.ui.input_char(if c.is_control() { ' ' } else { c });
                }
            }
            AppEvent::Terminal(_) => {}
            AppEvent::Click(click) => self.handle_click(click),
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => self.ui.exit(),
            KeyCode::Char('n') if ctrl => self.ui.next_buffer(),
            KeyCode::Char('p') if ctrl => self.ui.previous_buffer(),
            KeyCode::Char('w') if ctrl => {
                self.ui.input_delete_word();
            }
            KeyCode::Char('u') if ctrl => {
                self.ui.input_clear();
            }
            KeyCode::Char('r') if ctrl => self.ui.input_back_search(),
            KeyCode::Char('a') if ctrl => self.ui.input_home(),
            KeyCode::Char('e') if ctrl => self.ui.input_end(),
            KeyCode::Char(c) if alt && c.is_ascii_digit() => {
                self.ui.go_to_buffer_no(c as usize - '0' as usize);
            }
            KeyCode::Char(c) if !ctrl => self.ui.input_char(c),
            KeyCode::Esc => {
                if self.ui.has_overlay() {
                    self.ui.close_overlay();
                } else {
                    self.ui.input_clear();
                }
            }
            KeyCode::F(1) => self.open_help(),
            KeyCode::F(2) => {
                self.show_numbers = !self.show_numbers;
                self.ui.show_buffer_numbers(self.show_numbers);
            }
            KeyCode::F(7) => self.ui.toggle_channel_list()?,
            KeyCode::F(8) => self.ui.toggle_member_list()?,
            KeyCode::Enter => {
                if !self.ui.input_enter() {
                    let text = self.ui.input_flush();
                    self.submit(&text)?;
                }
            }
            KeyCode::Tab => {
                if !self.ui.input_auto_complete() {
                    self.ui.beep();
                }
            }
            KeyCode::Backspace if ctrl || alt => {
                self.ui.input_delete_word();
            }
            KeyCode::Backspace => {
                self.ui.input_backspace();
            }
            KeyCode::Delete => {
                self.ui.input_delete();
            }
            KeyCode::Left if ctrl => self.ui.input_left_word(),
            KeyCode::Left => self.ui.input_left(),
            KeyCode::Right if ctrl => self.ui.input_right_word(),
            KeyCode::Right => self.ui.input_right(),
            KeyCode::Home => self.ui.input_home(),
            KeyCode::End => self.ui.input_end(),
            KeyCode::Up if alt => self.ui.previous_unread_buffer(),
            KeyCode::Down if alt => self.ui.next_unread_buffer(),
            KeyCode::Up => self.ui.input_up(),
            KeyCode::Down => self.ui.input_down(),
            KeyCode::PageUp if alt => {
                self.ui.scroll_up_highlight();
            }
            KeyCode::PageDown if alt => {
                self.ui.scroll_down_highlight();
            }
            KeyCode::PageUp => {
                self.ui.scroll_up();
                self.load_history();
            }
            KeyCode::PageDown => self.ui.scroll_down(),
            _ => {}
        }
        Ok(())
    }

    fn open_help(&mut self) {
        self.ui.open_overlay("Esc to close");
        for text in HELP {
            self.ui
                .add_overlay_line(Line::new(Utc::now(), "help", styled(text, Style::default())));
        }
    }

    /// Pretend to fetch older lines the first time a channel hits the top
    fn load_history(&mut self) {
        if !self.ui.is_at_top() {
            return;
        }
        let Some((net, title)) = self.ui.current_buffer() else {
            return;
        };
        if title.is_empty() || !self.history_loaded.insert(title.to_lowercase()) {
            return;
        }
        let (net, title) = (net.to_string(), title.to_string());
        let first = Line::new(
            Utc::now() - chrono::Duration::hours(1),
            "--",
            styled("Beginning of history", Style::default().fg(COLOR_GRAY)),
        );
        self.ui.add_lines(&net, &title, vec![first], Vec::new());
    }

    fn submit(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        let (command, arg) = match text.strip_prefix('/') {
            Some(rest) => {
                let (cmd, arg) = rest.split_once(' ').unwrap_or((rest, ""));
                (Some(cmd.to_lowercase()), arg.trim())
            }
            None => (None, text),
        };
        let current = self
            .ui
            .current_buffer()
            .map(|(net, title)| (net.to_string(), title.to_string()));

        match command.as_deref() {
            None => {
                let Some((net, title)) = current else {
                    return Ok(());
                };
                if title.is_empty() {
                    self.ui.set_status("Cannot send to the server buffer");
                    return Ok(());
                }
                let mut line = Line::new(Utc::now(), SELF_NICK, styled(arg, Style::default()));
                line.head_style = Style::default().fg(ident_color(&self.scheme, SELF_NICK, true));
                let at = line.at;
                self.ui.add_line(&net, &title, line);
                self.ui.set_read(&net, &title, at);
            }
            Some("join") | Some("query") if !arg.is_empty() => {
                self.ui.add_buffer(NET_ID, "", arg);
                self.ui.jump_buffer_network(NET_ID, arg);
            }
            Some("part") => {
                if let Some((net, title)) = current.filter(|(_, t)| !t.is_empty()) {
                    self.ui.remove_buffer(&net, &title);
                    self.members.remove(&title.to_lowercase());
                }
            }
            Some("topic") => {
                if let Some((net, title)) = current {
                    self.ui.set_topic(&net, &title, arg);
                }
            }
            Some("buffer") if !arg.is_empty() => {
                let found = match arg.parse::<usize>() {
                    Ok(i) => self.ui.jump_buffer_index(i),
                    Err(_) => self.ui.jump_buffer(arg),
                };
                if !found {
                    self.ui.set_status(&format!("No buffer matching {}", arg));
                }
            }
            Some("quit") => self.ui.exit(),
            Some("help") => self.open_help(),
            Some(other) => {
                self.ui.beep();
                self.ui.set_status(&format!("Unknown command /{}", other));
            }
        }
        Ok(())
    }

    // Mouse

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<()> {
        let (x, y) = (mouse.column, mouse.row);
        let (width, height) = self.ui.size();
        let channel_width = self.ui.channel_width();
        let member_width = self.ui.member_width();
        let in_channels = if channel_width > 0 {
            x < channel_width
        } else {
            y + 1 == height
        };
        let in_members = member_width > 0 && x >= width.saturating_sub(member_width);

        match mouse.kind {
            MouseEventKind::ScrollUp if in_members => self.ui.scroll_member_up_by(1),
            MouseEventKind::ScrollDown if in_members => self.ui.scroll_member_down_by(1),
            MouseEventKind::ScrollUp if in_channels => self.ui.scroll_channel_up_by(1),
            MouseEventKind::ScrollDown if in_channels => self.ui.scroll_channel_down_by(1),
            MouseEventKind::ScrollUp => {
                self.ui.scroll_up_by(3);
                self.load_history();
            }
            MouseEventKind::ScrollDown => self.ui.scroll_down_by(3),
            MouseEventKind::Down(MouseButton::Left) => {
                self.mouse_down = true;
                self.ui.click(x, y);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.ui.channel_col_clicked() {
                    self.ui.resize_channel_col(i32::from(x) + 1)?;
                } else if self.ui.member_col_clicked() {
                    self.ui.resize_member_col(i32::from(width) - i32::from(x))?;
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.mouse_down = false;
                if let Some(i) = self.ui.clicked_buffer() {
                    self.ui.go_to_buffer_no(i);
                }
                if let Some(action) = self.help_pressed.take() {
                    self.run_help(action);
                } else if let Some(i) = self.ui.clicked_member() {
                    self.open_query(i);
                }
                self.ui.click_buffer(None);
                self.ui.click_member(None);
                if self.ui.channel_col_clicked() || self.ui.member_col_clicked() {
                    self.ui.set_mouse_shape(MouseShape::Default);
                }
                self.ui.click_channel_col(false);
                self.ui.click_member_col(false);
            }
            _ => {}
        }
        Ok(())
    }

    /// Clicks land after the press that caused them; when the button is
    /// already up the click is acted on directly
    fn handle_click(&mut self, click: Click) {
        match click {
            Click::Buffer(i) if self.mouse_down => self.ui.click_buffer(Some(i)),
            Click::Buffer(i) => self.ui.go_to_buffer_no(i),
            Click::Member(i) if self.mouse_down => self.ui.click_member(Some(i)),
            Click::Member(i) => self.open_query(i),
            Click::ChannelColumn if self.mouse_down => {
                self.ui.click_channel_col(true);
                self.ui.set_mouse_shape(MouseShape::ResizeHorizontal);
            }
            Click::MemberColumn if self.mouse_down => {
                self.ui.click_member_col(true);
                self.ui.set_mouse_shape(MouseShape::ResizeHorizontal);
            }
            Click::ChannelColumn | Click::MemberColumn => {}
            Click::Help(action) if self.mouse_down => {
                self.help_pressed = Some(action);
                let row = HelpAction::ALL.iter().position(|a| *a == action);
                self.ui.click_member(row);
            }
            Click::Help(action) => self.run_help(action),
        }
    }

    fn run_help(&mut self, action: HelpAction) {
        let command = match action {
            HelpAction::AddNetwork => {
                self.ui.set_status("The demo has a single network");
                return;
            }
            HelpAction::JoinChannel => "/join #",
            HelpAction::MessageUser => "/query ",
        };
        self.ui.input_set(command);
    }

    fn open_query(&mut self, member: usize) {
        let Some(name) = self.current_members().get(member).map(|m| m.name.clone()) else {
            return;
        };
        if name == SELF_NICK {
            return;
        }
        self.ui.add_buffer(NET_ID, "", &name);
        self.ui.jump_buffer_network(NET_ID, &name);
    }
}

/// Whether `nick` appears in `text` as a whole word
fn mentions(text: &str, nick: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|word| word.eq_ignore_ascii_case(nick))
}

/// Members with a power level first, then by name
fn sort_members(members: &mut [Member]) {
    members.sort_by_cached_key(|m| (m.power_level.is_empty(), m.name.to_lowercase()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatview::ui::ScriptedEvents;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn app() -> App<TestBackend> {
        let config = Config {
            member_col_enabled: true,
            ..Default::default()
        };
        let nicks = SharedNicks::default();
        let terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let ui = Ui::with_terminal(
            ui_config(&config, nicks.clone()),
            terminal,
            ScriptedEvents::new([]),
        )
        .unwrap();
        App::new(ui, &config, nicks, LogBuffer::new())
    }

    fn join(app: &mut App<TestBackend>, channel: &str, members: &[&str]) {
        app.handle_demo(DemoEvent::Join {
            channel: channel.to_string(),
            topic: format!("welcome to {}", channel),
            members: members.iter().map(|m| Member::new(*m)).collect(),
        });
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> AppEvent {
        AppEvent::Terminal(Event::Key(KeyEvent::new(code, modifiers)))
    }

    fn typed(app: &mut App<TestBackend>, text: &str) {
        for c in text.chars() {
            app.handle_event(key(KeyCode::Char(c), KeyModifiers::NONE))
                .unwrap();
        }
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> AppEvent {
        AppEvent::Terminal(Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }))
    }

    fn screen(app: &App<TestBackend>) -> String {
        let buf = app.ui().backend().buffer();
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn cells(app: &App<TestBackend>, x: u16, y: u16, n: u16) -> String {
        let buf = app.ui().backend().buffer();
        (x..x + n).map(|x| buf[(x, y)].symbol().to_string()).collect()
    }

    fn input(app: &App<TestBackend>) -> String {
        app.ui().input_content().iter().collect()
    }

    #[test]
    fn completer_handles_line_start_and_middle() {
        let nicks: SharedNicks = Arc::new(Mutex::new(vec!["Alice".into(), "bob".into()]));
        let complete = nick_completer(nicks);

        let text: Vec<char> = "al".chars().collect();
        let found = complete(2, &text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text.iter().collect::<String>(), "Alice: ");
        assert_eq!(found[0].cursor_idx, 7);

        let text: Vec<char> = "hi B there".chars().collect();
        let found = complete(4, &text);
        assert_eq!(found[0].text.iter().collect::<String>(), "hi bob  there");
        assert_eq!(found[0].cursor_idx, 7);
        assert_eq!((found[0].start_idx, found[0].end_idx), (3, 4));

        assert!(complete(3, &"hi ".chars().collect::<Vec<_>>()).is_empty());
    }

    #[test]
    fn joins_create_sorted_buffers() {
        let mut app = app();
        join(&mut app, "#rust", &["zed", "amy"]);
        join(&mut app, "#async", &[]);

        assert_eq!(app.ui().buffer(0), Some((NET_ID, "")));
        assert_eq!(app.ui().buffer(1), Some((NET_ID, "#async")));
        assert_eq!(app.ui().buffer(2), Some((NET_ID, "#rust")));
        // joining does not steal focus
        assert_eq!(app.ui().current_buffer(), Some((NET_ID, "")));
    }

    #[test]
    fn typing_and_sending_a_message() {
        let mut app = app();
        join(&mut app, "#rust", &["amy"]);
        app.handle_event(key(KeyCode::Char('n'), KeyModifiers::CONTROL))
            .unwrap();
        assert_eq!(app.ui().current_buffer(), Some((NET_ID, "#rust")));

        typed(&mut app, "hello world");
        app.handle_event(key(KeyCode::Enter, KeyModifiers::NONE))
            .unwrap();
        assert_eq!(input(&app), "");
        app.draw().unwrap();

        let screen = screen(&app);
        assert!(screen.contains("welcome to #rust"));
        assert!(screen.contains("hello world"));
    }

    #[test]
    fn tab_completes_current_members() {
        let mut app = app();
        join(&mut app, "#rust", &["amy", "bob"]);
        app.ui.go_to_buffer_no(1);
        app.draw().unwrap();

        typed(&mut app, "am");
        app.handle_event(key(KeyCode::Tab, KeyModifiers::NONE))
            .unwrap();
        assert_eq!(input(&app), "amy: ");
        // enter accepts the completion instead of sending
        app.handle_event(key(KeyCode::Enter, KeyModifiers::NONE))
            .unwrap();
        assert_eq!(input(&app), "amy: ");
    }

    #[test]
    fn commands() {
        let mut app = app();
        typed(&mut app, "/join #new");
        app.handle_event(key(KeyCode::Enter, KeyModifiers::NONE))
            .unwrap();
        assert_eq!(app.ui().current_buffer(), Some((NET_ID, "#new")));

        typed(&mut app, "/topic fresh");
        app.handle_event(key(KeyCode::Enter, KeyModifiers::NONE))
            .unwrap();
        app.draw().unwrap();
        assert!(screen(&app).contains("fresh"));

        typed(&mut app, "/part");
        app.handle_event(key(KeyCode::Enter, KeyModifiers::NONE))
            .unwrap();
        assert_eq!(app.ui().current_buffer(), Some((NET_ID, "")));

        typed(&mut app, "/bogus");
        app.handle_event(key(KeyCode::Enter, KeyModifiers::NONE))
            .unwrap();
        app.draw().unwrap();
        assert!(screen(&app).contains("Unknown command /bogus"));

        typed(&mut app, "/quit");
        app.handle_event(key(KeyCode::Enter, KeyModifiers::NONE))
            .unwrap();
        assert!(app.should_exit());
    }

    #[test]
    fn ctrl_c_exits() {
        let mut app = app();
        app.handle_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL))
            .unwrap();
        assert!(app.should_exit());
    }

    #[test]
    fn highlight_marks_line() {
        let mut app = app();
        join(&mut app, "#rust", &["amy"]);
        app.handle_demo(DemoEvent::Message {
            channel: "#rust".into(),
            nick: "amy".into(),
            text: "me: ping".into(),
        });
        app.draw().unwrap();
        // unfocused buffer with a highlight gets a badge in the channel list
        assert_eq!(cells(&app, 12, 1, 3), " 1 ");
    }

    #[test]
    fn click_on_buffer_row_switches_on_release() {
        let mut app = app();
        join(&mut app, "#rust", &[]);
        app.draw().unwrap();

        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 3, 1))
            .unwrap();
        app.handle_event(AppEvent::Click(Click::Buffer(1))).unwrap();
        assert_eq!(app.ui().clicked_buffer(), Some(1));
        app.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), 3, 1))
            .unwrap();
        assert_eq!(app.ui().current_buffer(), Some((NET_ID, "#rust")));
        assert_eq!(app.ui().clicked_buffer(), None);
    }

    #[test]
    fn late_click_acts_immediately() {
        let mut app = app();
        join(&mut app, "#rust", &[]);
        app.handle_event(AppEvent::Click(Click::Buffer(1))).unwrap();
        assert_eq!(app.ui().current_buffer(), Some((NET_ID, "#rust")));
    }

    #[test]
    fn dragging_the_divider_resizes() {
        let mut app = app();
        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 15, 4))
            .unwrap();
        app.handle_event(AppEvent::Click(Click::ChannelColumn))
            .unwrap();
        app.handle_event(mouse(MouseEventKind::Drag(MouseButton::Left), 19, 4))
            .unwrap();
        assert_eq!(app.ui().channel_width(), 20);
        app.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), 19, 4))
            .unwrap();
        assert!(!app.ui().channel_col_clicked());

        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 84, 4))
            .unwrap();
        app.handle_event(AppEvent::Click(Click::MemberColumn)).unwrap();
        app.handle_event(mouse(MouseEventKind::Drag(MouseButton::Left), 80, 4))
            .unwrap();
        assert_eq!(app.ui().member_width(), 20);
    }

    #[test]
    fn member_click_opens_query() {
        let mut app = app();
        join(&mut app, "#rust", &["amy", "bob"]);
        app.ui.go_to_buffer_no(1);
        app.handle_event(AppEvent::Click(Click::Member(1))).unwrap();
        assert_eq!(app.ui().current_buffer(), Some((NET_ID, "bob")));
    }

    #[test]
    fn wheel_scrolls_the_pane_under_the_pointer() {
        let mut app = app();
        for i in 0..40 {
            join(&mut app, &format!("#c{:02}", i), &[]);
        }
        app.handle_event(mouse(MouseEventKind::ScrollDown, 2, 5))
            .unwrap();
        app.handle_event(mouse(MouseEventKind::ScrollDown, 2, 5))
            .unwrap();
        assert_eq!(app.ui().channel_offset(), 2);
        app.handle_event(mouse(MouseEventKind::ScrollUp, 2, 5))
            .unwrap();
        assert_eq!(app.ui().channel_offset(), 1);

        app.handle_event(mouse(MouseEventKind::ScrollDown, 95, 5))
            .unwrap();
        assert_eq!(app.ui().member_offset(), 1);
    }

    #[test]
    fn help_overlay_opens_and_closes() {
        let mut app = app();
        app.handle_event(key(KeyCode::F(1), KeyModifiers::NONE))
            .unwrap();
        assert!(app.ui().has_overlay());
        app.draw().unwrap();
        assert!(screen(&app).contains("Ctrl+C / Ctrl+Q      quit"));

        app.handle_event(key(KeyCode::Esc, KeyModifiers::NONE))
            .unwrap();
        assert!(!app.ui().has_overlay());
    }

    #[test]
    fn help_menu_click_prefills_input() {
        let mut app = app();
        app.handle_event(AppEvent::Click(Click::Help(HelpAction::JoinChannel)))
            .unwrap();
        assert_eq!(input(&app), "/join #");
    }

    #[test]
    fn help_menu_row_highlights_while_pressed() {
        let mut app = app();
        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 90, 4))
            .unwrap();
        app.handle_event(AppEvent::Click(Click::Help(HelpAction::JoinChannel)))
            .unwrap();
        assert_eq!(app.ui().clicked_member(), Some(1));
        assert_eq!(input(&app), "");

        app.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), 90, 4))
            .unwrap();
        assert_eq!(app.ui().clicked_member(), None);
        assert_eq!(input(&app), "/join #");
        // releasing the help row must not open a query
        assert_eq!(app.ui().current_buffer(), Some((NET_ID, "")));
    }

    #[test]
    fn keyboard_navigation_keeps_selection_in_the_list() {
        let mut app = app();
        for i in 0..50 {
            join(&mut app, &format!("#c{:02}", i), &[]);
        }
        for _ in 0..45 {
            app.handle_event(key(KeyCode::Char('n'), KeyModifiers::CONTROL))
                .unwrap();
        }
        assert_eq!(app.ui().current_buffer(), Some((NET_ID, "#c44")));
        app.draw().unwrap();

        let offset = app.ui().channel_offset();
        assert!(offset <= 45 && 45 < offset + 30, "offset {}", offset);
        let width = app.ui().channel_width();
        let listed = (0..30).any(|y| cells(&app, 0, y, width).contains("#c44"));
        assert!(listed, "current buffer #c44 not in the list");

        app.handle_event(key(KeyCode::Char('p'), KeyModifiers::CONTROL))
            .unwrap();
        typed(&mut app, "/buffer 2");
        app.handle_event(key(KeyCode::Enter, KeyModifiers::NONE))
            .unwrap();
        assert_eq!(app.ui().current_buffer(), Some((NET_ID, "#c01")));
        assert!(app.ui().channel_offset() <= 2);
    }

    #[test]
    fn joins_are_merged() {
        let mut app = app();
        join(&mut app, "#rust", &[]);
        app.ui.go_to_buffer_no(1);
        for nick in ["guest1", "guest2"] {
            app.handle_demo(DemoEvent::MemberJoin {
                channel: "#rust".into(),
                nick: nick.into(),
            });
        }
        app.draw().unwrap();
        let screen = screen(&app);
        assert!(screen.contains("+guest1  +guest2"));
        assert_eq!(app.current_members().len(), 2);
    }

    #[test]
    fn away_updates_every_channel() {
        let mut app = app();
        join(&mut app, "#a", &["amy"]);
        join(&mut app, "#b", &["amy"]);
        app.handle_demo(DemoEvent::Away {
            nick: "amy".into(),
            away: true,
        });
        assert!(app.members.values().flatten().all(|m| m.away));
    }

    #[test]
    fn logs_land_in_server_buffer() {
        let mut app = app();
        app.logs.add(chatview::logging::LogEntry {
            timestamp: Utc::now(),
            level: LogLevel::Warn,
            target: "test".into(),
            message: "something odd".into(),
        });
        app.draw().unwrap();
        assert!(screen(&app).contains("something odd"));
        assert!(app.logs.is_empty());
    }

    #[test]
    fn mentions_match_whole_words() {
        assert!(mentions("me: ping", "me"));
        assert!(mentions("ping ME!", "me"));
        assert!(!mentions("did the meeting move?", "me"));
    }

    #[test]
    fn members_sorted_by_power_then_name() {
        let mut members = vec![Member::new("zed"), Member::new("Amy"), Member::new("bob")];
        members[0].power_level = "@".into();
        sort_members(&mut members);
        let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["zed", "Amy", "bob"]);
    }
}
