// Buffer list
//
// Owns every open buffer (network server buffers and their channels), the
// lines they hold, the selection, and the drawing of the timeline and the
// two buffer list layouts.
//
// Scroll positions are counted in rows from the bottom of the timeline, so
// a buffer at 0 follows new lines and a scrolled-up buffer stays put while
// lines arrive underneath.

use super::color::{COLOR_GRAY, COLOR_RED};
use super::draw::{
    clear_area, draw_horizontal_line, draw_vertical_line, print_ident, print_string, set_cell,
    string_width, styled, truncate, wrap, StyledString, ELLIPSIS,
};
use super::hit::{Click, HitRegistry};
use super::layout::{CHROME_WIDTH, NICK_COL_OFFSET};
use super::ConfigColors;
use chrono::{DateTime, Local, Utc};
use ratatui::buffer::Buffer as Surface;
use ratatui::style::{Color, Modifier, Style};
use std::sync::Arc;

/// Folds a new line into the previous one
pub type MergeLineFn = Arc<dyn Fn(&mut Line, Line) + Send + Sync>;

/// How a line affects the buffer it lands in when not focused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyType {
    #[default]
    None,
    /// Marks the buffer unread
    Unread,
    /// Marks the buffer unread and counts as a highlight
    Highlight,
}

/// One message in a buffer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Line {
    pub at: DateTime<Utc>,
    /// Shown right-aligned in the nick column
    pub head: String,
    pub head_style: Style,
    pub body: StyledString,
    pub notify: NotifyType,
    /// Draw the head reversed
    pub highlight: bool,
    /// Consecutive mergeable lines are folded together by the merge function
    pub mergeable: bool,
}

impl Line {
    pub fn new(at: DateTime<Utc>, head: impl Into<String>, body: impl Into<StyledString>) -> Self {
        Self {
            at,
            head: head.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    fn rows(&self, width: usize) -> Vec<StyledString> {
        wrap(&self.body, width)
    }

    fn height(&self, width: usize) -> usize {
        self.rows(width).len()
    }
}

/// A server buffer (empty title) or a channel/query buffer
#[derive(Debug, Clone, Default)]
pub struct ChatBuffer {
    net_id: String,
    net_name: String,
    title: String,
    topic: String,
    lines: Vec<Line>,
    unread: bool,
    highlights: usize,
    read: Option<DateTime<Utc>>,
    /// Rows scrolled up from the bottom
    scroll_amt: usize,
    notifications: Vec<u32>,
}

impl ChatBuffer {
    fn new(net_id: &str, net_name: &str, title: &str) -> Self {
        Self {
            net_id: net_id.to_string(),
            net_name: net_name.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn net_id(&self) -> &str {
        &self.net_id
    }

    pub fn net_name(&self) -> &str {
        &self.net_name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn unread(&self) -> bool {
        self.unread
    }

    pub fn highlights(&self) -> usize {
        self.highlights
    }

    pub fn read(&self) -> Option<DateTime<Utc>> {
        self.read
    }

    /// Label in buffer lists: the network name for server buffers
    pub fn display_name(&self) -> &str {
        if !self.title.is_empty() {
            &self.title
        } else if !self.net_name.is_empty() {
            &self.net_name
        } else {
            &self.net_id
        }
    }

    fn is(&self, net_id: &str, title: &str) -> bool {
        self.net_id == net_id && self.title.to_lowercase() == title.to_lowercase()
    }

    fn total_rows(&self, width: usize) -> usize {
        self.lines.iter().map(|l| l.height(width)).sum()
    }

    fn push_line(&mut self, line: Line, width: usize, merge: Option<&MergeLineFn>) {
        if line.mergeable {
            if let (Some(last), Some(merge)) = (self.lines.last_mut(), merge) {
                if last.mergeable {
                    let before = last.height(width);
                    merge(last, line);
                    if self.scroll_amt > 0 {
                        self.scroll_amt += last.height(width).saturating_sub(before);
                    }
                    return;
                }
            }
        }

        let height = line.height(width);
        self.lines.push(line);
        if self.scroll_amt > 0 {
            self.scroll_amt += height;
        }
    }

    fn refresh_unread(&mut self) {
        let read = self.read;
        let newer = |l: &&Line| read.map_or(true, |r| l.at > r);
        self.unread = self
            .lines
            .iter()
            .filter(newer)
            .any(|l| l.notify != NotifyType::None);
        self.highlights = self
            .lines
            .iter()
            .filter(newer)
            .filter(|l| l.notify == NotifyType::Highlight)
            .count();
    }
}

/// All open buffers plus selection and timeline geometry
pub struct BufferList {
    list: Vec<ChatBuffer>,
    overlay: Option<ChatBuffer>,
    current: usize,
    clicked: Option<usize>,
    show_numbers: bool,

    tl_inner_width: u16,
    tl_height: u16,
    text_width: u16,

    colors: ConfigColors,
    merge_line: Option<MergeLineFn>,
    /// Notification ids of buffers that got focus, waiting to be closed
    closed_notifications: Vec<u32>,
}

impl BufferList {
    pub fn new(colors: ConfigColors, merge_line: Option<MergeLineFn>) -> Self {
        Self {
            list: Vec::new(),
            overlay: None,
            current: 0,
            clicked: None,
            show_numbers: false,
            tl_inner_width: 0,
            tl_height: 0,
            text_width: 0,
            colors,
            merge_line,
            closed_notifications: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatBuffer> {
        self.list.iter()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// `(net_id, title)` of the selected buffer
    pub fn current(&self) -> Option<(&str, &str)> {
        self.buffer(self.current)
    }

    pub fn buffer(&self, i: usize) -> Option<(&str, &str)> {
        self.list
            .get(i)
            .map(|b| (b.net_id.as_str(), b.title.as_str()))
    }

    pub fn get(&self, net_id: &str, title: &str) -> Option<&ChatBuffer> {
        self.find(net_id, title).map(|i| &self.list[i])
    }

    pub fn find(&self, net_id: &str, title: &str) -> Option<usize> {
        self.list.iter().position(|b| b.is(net_id, title))
    }

    pub fn clicked(&self) -> Option<usize> {
        self.clicked
    }

    pub fn set_clicked(&mut self, i: Option<usize>) {
        self.clicked = i.filter(|&i| i < self.list.len());
    }

    pub fn show_buffer_numbers(&mut self, enable: bool) {
        self.show_numbers = enable;
    }

    /// Rows of the timeline used by messages (below the topic and separator)
    pub fn message_height(&self) -> usize {
        usize::from(self.tl_height.saturating_sub(2))
    }

    pub fn timeline_height(&self) -> u16 {
        self.tl_height
    }

    /// Insert a buffer, keeping server buffers first and channels sorted.
    ///
    /// Returns the buffer index and whether it was newly added.
    pub fn add(&mut self, net_id: &str, net_name: &str, title: &str) -> (usize, bool) {
        if let Some(i) = self.find(net_id, title) {
            return (i, false);
        }

        let lower = title.to_lowercase();
        let first = self.list.iter().position(|b| b.net_id == net_id);
        let last = self.list.iter().rposition(|b| b.net_id == net_id);
        let idx = match (first, last) {
            (Some(first), Some(last)) => {
                if title.is_empty() {
                    first
                } else {
                    (first..=last)
                        .find(|&i| {
                            let other = &self.list[i].title;
                            !other.is_empty() && other.to_lowercase() > lower
                        })
                        .unwrap_or(last + 1)
                }
            }
            _ => self.list.len(),
        };

        let net_name = match first {
            Some(first) if net_name.is_empty() => self.list[first].net_name.clone(),
            _ => net_name.to_string(),
        };

        let was_empty = self.list.is_empty();
        self.list.insert(idx, ChatBuffer::new(net_id, &net_name, title));
        if !was_empty && idx <= self.current {
            self.current += 1;
        }
        if let Some(clicked) = self.clicked {
            if idx <= clicked {
                self.clicked = Some(clicked + 1);
            }
        }
        (idx, true)
    }

    pub fn remove(&mut self, net_id: &str, title: &str) -> bool {
        match self.find(net_id, title) {
            Some(i) => {
                self.remove_at(i);
                true
            }
            None => false,
        }
    }

    pub fn remove_network(&mut self, net_id: &str) {
        while let Some(i) = self.list.iter().rposition(|b| b.net_id == net_id) {
            self.remove_at(i);
        }
    }

    fn remove_at(&mut self, idx: usize) {
        self.list.remove(idx);
        let was_current = idx == self.current;
        if idx < self.current || (self.current >= self.list.len() && self.current > 0) {
            self.current -= 1;
        }
        if was_current {
            self.focus_current();
        }
        self.clicked = match self.clicked {
            Some(c) if c == idx => None,
            Some(c) if c > idx => Some(c - 1),
            other => other,
        };
    }

    fn focus_current(&mut self) {
        if let Some(b) = self.list.get_mut(self.current) {
            b.unread = false;
            b.highlights = 0;
            self.closed_notifications.append(&mut b.notifications);
        }
    }

    /// Notification ids that belong to buffers which got focus since last call
    pub fn take_closed_notifications(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.closed_notifications)
    }

    pub fn push_notification(&mut self, net_id: &str, title: &str, id: u32) {
        if let Some(i) = self.find(net_id, title) {
            self.list[i].notifications.push(id);
        }
    }

    /// Select buffer `i` (clamped), closing any overlay.
    ///
    /// Returns whether the selection changed.
    pub fn to(&mut self, i: usize) -> bool {
        self.overlay = None;
        if self.list.is_empty() {
            return false;
        }
        let i = i.min(self.list.len() - 1);
        if i == self.current {
            return false;
        }
        self.current = i;
        self.focus_current();
        true
    }

    pub fn next(&mut self) {
        if !self.list.is_empty() {
            self.to((self.current + 1) % self.list.len());
        }
    }

    pub fn previous(&mut self) {
        if !self.list.is_empty() {
            let len = self.list.len();
            self.to((self.current + len - 1) % len);
        }
    }

    pub fn next_unread(&mut self) {
        let len = self.list.len();
        if let Some(i) = (1..len)
            .map(|d| (self.current + d) % len)
            .find(|&i| self.list[i].unread)
        {
            self.to(i);
        }
    }

    pub fn previous_unread(&mut self) {
        let len = self.list.len();
        if let Some(i) = (1..len)
            .map(|d| (self.current + len - d) % len)
            .find(|&i| self.list[i].unread)
        {
            self.to(i);
        }
    }

    /// Append a line to a buffer, counting it as unread when not focused
    pub fn add_line(&mut self, net_id: &str, title: &str, line: Line) {
        let Some(idx) = self.find(net_id, title) else {
            return;
        };
        let focused = idx == self.current;
        let width = usize::from(self.text_width);
        let merge = self.merge_line.clone();

        let b = &mut self.list[idx];
        let newer = b.read.map_or(true, |read| line.at > read);
        if !focused && newer {
            match line.notify {
                NotifyType::None => {}
                NotifyType::Unread => b.unread = true,
                NotifyType::Highlight => {
                    b.unread = true;
                    b.highlights += 1;
                }
            }
        }
        b.push_line(line, width, merge.as_ref());
    }

    /// Prepend history and append newer lines without touching unread state
    pub fn add_lines(&mut self, net_id: &str, title: &str, before: Vec<Line>, after: Vec<Line>) {
        let Some(idx) = self.find(net_id, title) else {
            return;
        };
        let width = usize::from(self.text_width);
        let merge = self.merge_line.clone();

        let b = &mut self.list[idx];
        if !before.is_empty() {
            let mut lines = before;
            lines.append(&mut b.lines);
            b.lines = lines;
        }
        for line in after {
            b.push_line(line, width, merge.as_ref());
        }
    }

    pub fn set_topic(&mut self, net_id: &str, title: &str, topic: &str) {
        if let Some(i) = self.find(net_id, title) {
            self.list[i].topic = topic.to_string();
        }
    }

    /// Move a read marker forward; older timestamps are ignored
    pub fn set_read(&mut self, net_id: &str, title: &str, at: DateTime<Utc>) {
        let Some(i) = self.find(net_id, title) else {
            return;
        };
        let b = &mut self.list[i];
        if b.read.is_some_and(|read| read >= at) {
            return;
        }
        b.read = Some(at);
        b.refresh_unread();
    }

    /// Advance the current buffer's read marker to the newest visible line
    pub fn update_read(&mut self) -> Option<(String, String, DateTime<Utc>)> {
        if self.overlay.is_some() {
            return None;
        }
        let width = usize::from(self.text_width);
        let b = self.list.get_mut(self.current)?;

        let mut y = 0;
        let mut newest = None;
        for line in b.lines.iter().rev() {
            let height = line.height(width);
            if y + height > b.scroll_amt {
                newest = Some(line.at);
                break;
            }
            y += height;
        }

        let at = newest?;
        if b.read.is_some_and(|read| read >= at) {
            return None;
        }
        b.read = Some(at);
        Some((b.net_id.clone(), b.title.clone(), at))
    }

    pub fn open_overlay(&mut self) {
        self.overlay = Some(ChatBuffer::default());
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn add_overlay_line(&mut self, line: Line) {
        let width = usize::from(self.text_width);
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.push_line(line, width, None);
        }
    }

    /// The buffer shown in the timeline: the overlay when open
    fn shown(&self) -> Option<&ChatBuffer> {
        self.overlay.as_ref().or_else(|| self.list.get(self.current))
    }

    fn shown_mut(&mut self) -> Option<&mut ChatBuffer> {
        match self.overlay {
            Some(ref mut overlay) => Some(overlay),
            None => self.list.get_mut(self.current),
        }
    }

    pub fn resize_timeline(&mut self, inner_width: u16, height: u16, text_width: u16) {
        self.tl_inner_width = inner_width;
        self.tl_height = height;
        self.text_width = text_width;
    }

    pub fn scroll_up(&mut self, n: usize) {
        let width = usize::from(self.text_width);
        let page = self.message_height();
        if let Some(b) = self.shown_mut() {
            let max = b.total_rows(width).saturating_sub(page);
            b.scroll_amt = (b.scroll_amt + n).min(max);
        }
    }

    pub fn scroll_down(&mut self, n: usize) {
        if let Some(b) = self.shown_mut() {
            b.scroll_amt = b.scroll_amt.saturating_sub(n);
        }
    }

    /// Whether the oldest line is in view
    pub fn is_at_top(&self) -> bool {
        let width = usize::from(self.text_width);
        match self.shown() {
            Some(b) => b.scroll_amt + self.message_height() >= b.total_rows(width),
            None => true,
        }
    }

    /// Scroll to the closest highlighted line above the view
    pub fn scroll_up_highlight(&mut self) -> bool {
        let width = usize::from(self.text_width);
        let page = self.message_height();
        let Some(b) = self.shown_mut() else {
            return false;
        };

        let mut y = 0;
        let mut target = None;
        for line in b.lines.iter().rev() {
            let height = line.height(width);
            if line.highlight && y >= b.scroll_amt + page {
                target = Some((y + height).saturating_sub(page));
                break;
            }
            y += height;
        }

        match target {
            Some(amt) => {
                let max = b.total_rows(width).saturating_sub(page);
                b.scroll_amt = amt.min(max);
                true
            }
            None => false,
        }
    }

    /// Scroll to the closest highlighted line below the view
    pub fn scroll_down_highlight(&mut self) -> bool {
        let width = usize::from(self.text_width);
        let Some(b) = self.shown_mut() else {
            return false;
        };

        let mut y = 0;
        let mut target = None;
        for line in b.lines.iter().rev() {
            let height = line.height(width);
            if y + height > b.scroll_amt {
                break;
            }
            if line.highlight {
                target = Some(y);
            }
            y += height;
        }

        match target {
            Some(amt) => {
                b.scroll_amt = amt;
                true
            }
            None => false,
        }
    }

    fn entry_style(&self, i: usize) -> Style {
        let b = &self.list[i];
        let mut style = Style::default();
        if b.highlights > 0 {
            style = style.fg(COLOR_RED).add_modifier(Modifier::BOLD);
        } else if b.unread {
            style = style.fg(self.colors.unread).add_modifier(Modifier::BOLD);
        }
        if i == self.current {
            style = style.add_modifier(Modifier::REVERSED);
        }
        style
    }

    fn tab_label(&self, i: usize) -> String {
        let name = self.list[i].display_name();
        if self.show_numbers {
            format!("{} {}", i, name)
        } else {
            name.to_string()
        }
    }

    fn tab_width(&self, i: usize) -> usize {
        string_width(&self.tab_label(i))
    }

    /// Smallest first tab index that keeps the current tab fully visible
    /// in a bar of `width` cells
    pub fn get_left_most(&self, width: u16) -> usize {
        if self.list.is_empty() {
            return 0;
        }
        let width = usize::from(width);
        let mut used = 0;
        let mut left = self.current;
        for i in (0..=self.current).rev() {
            let needed = self.tab_width(i) + usize::from(i != self.current);
            if used + needed > width && i != self.current {
                break;
            }
            used += needed;
            left = i;
        }
        left
    }

    /// Index of the tab under column `x` when the bar starts at `offset`
    pub fn horizontal_buffer_offset(&self, x: u16, offset: usize) -> Option<usize> {
        let x = usize::from(x);
        let mut pos = 0;
        for i in offset..self.list.len() {
            let end = pos + self.tab_width(i);
            if x < pos {
                return None;
            }
            if x < end {
                return Some(i);
            }
            pos = end + 1;
        }
        None
    }

    /// Draw the topic row, separator and messages of the shown buffer
    pub fn draw_timeline(&self, buf: &mut Surface, x0: u16, y0: u16, nick_col_width: u16) {
        let width = CHROME_WIDTH + nick_col_width + self.tl_inner_width;
        let height = self.tl_height;
        clear_area(buf, x0, y0, width, height);
        if height == 0 {
            return;
        }
        let Some(b) = self.shown() else {
            return;
        };

        let topic = truncate(&b.topic, usize::from(width.saturating_sub(1)), ELLIPSIS);
        let mut x = x0 + 1;
        print_string(buf, &mut x, y0, &styled(topic, Style::default()));
        if height > 1 {
            draw_horizontal_line(buf, x0, y0 + 1, width);
        }

        let top = i64::from(y0) + 2;
        let bottom = i64::from(y0) + i64::from(height);
        if bottom <= top {
            return;
        }
        let page = (bottom - top) as usize;
        let text_width = usize::from(self.text_width);
        let scroll = b
            .scroll_amt
            .min(b.total_rows(text_width).saturating_sub(page));

        let body_x = x0 + CHROME_WIDTH + nick_col_width;
        let mut y = bottom + scroll as i64;
        for (i, line) in b.lines.iter().enumerate().rev() {
            if y <= top {
                break;
            }
            let rows = line.rows(text_width);
            y -= rows.len() as i64;

            for (r, row) in rows.iter().enumerate() {
                let ry = y + r as i64;
                if ry < top || ry >= bottom {
                    continue;
                }
                let ry = ry as u16;

                if r == 0 {
                    let time = time_label(line.at);
                    let previous = i.checked_sub(1).map(|p| time_label(b.lines[p].at));
                    if previous.as_deref() != Some(time.as_str()) {
                        let mut tx = x0;
                        print_string(buf, &mut tx, ry, &styled(time, Style::default().fg(COLOR_GRAY)));
                    }

                    let mut head_style = line.head_style;
                    if line.highlight {
                        head_style = head_style.add_modifier(Modifier::REVERSED);
                    }
                    let head = styled(line.head.clone(), head_style);
                    print_ident(buf, x0 + NICK_COL_OFFSET, ry, nick_col_width, &head);
                }

                let mut bx = body_x;
                print_string(buf, &mut bx, ry, row);
            }
        }
    }

    /// Draw one row per buffer with a divider on the right edge
    #[allow(clippy::too_many_arguments)]
    pub fn draw_vertical_buffer_list(
        &self,
        buf: &mut Surface,
        hits: &mut HitRegistry,
        x0: u16,
        y0: u16,
        width: u16,
        height: u16,
        offset: &mut usize,
    ) {
        if width == 0 || height == 0 {
            return;
        }
        let len = self.list.len();
        let rows = usize::from(height);
        if len.saturating_sub(*offset) < rows {
            *offset = len.saturating_sub(rows);
        }

        let inner = width - 1;
        clear_area(buf, x0, y0, inner, height);
        draw_vertical_line(buf, x0 + inner, y0, height);
        for y in y0..y0 + height {
            hits.push(x0 + inner, x0 + width, y, Click::ChannelColumn);
        }

        for (row, i) in (*offset..len).take(rows).enumerate() {
            let b = &self.list[i];
            let y = y0 + row as u16;
            let style = self.entry_style(i);
            if i == self.current {
                for x in x0..x0 + inner {
                    set_cell(buf, x, y, " ", style);
                }
            }

            let badge = (b.highlights > 0).then(|| format!(" {} ", b.highlights));
            let badge_width = badge.as_deref().map_or(0, string_width);

            let mut label = String::new();
            if self.show_numbers {
                label.push_str(&format!("{} ", i));
            }
            if !b.title.is_empty() {
                label.push(' ');
            }
            label.push_str(b.display_name());
            let room = usize::from(inner).saturating_sub(badge_width);
            let label = truncate(&label, room, ELLIPSIS);

            let mut x = x0;
            print_string(buf, &mut x, y, &styled(label, style));
            if let Some(badge) = badge {
                let mut x = x0 + inner - (badge_width as u16).min(inner);
                let badge_style = Style::default().fg(Color::Black).bg(COLOR_RED);
                print_string(buf, &mut x, y, &styled(badge, badge_style));
            }

            hits.push(x0, x0 + inner, y, Click::Buffer(i));
        }
    }

    /// Draw buffers as tabs on one row, starting at `*offset`
    pub fn draw_horizontal_buffer_list(
        &self,
        buf: &mut Surface,
        hits: &mut HitRegistry,
        x0: u16,
        y0: u16,
        width: u16,
        offset: &mut usize,
    ) {
        clear_area(buf, x0, y0, width, 1);
        let len = self.list.len();
        if *offset >= len {
            *offset = len.saturating_sub(1);
        }

        let right = usize::from(x0) + usize::from(width);
        let mut x = x0;
        for i in *offset..len {
            let label = self.tab_label(i);
            if usize::from(x) + string_width(&label) > right {
                break;
            }
            let start = x;
            print_string(buf, &mut x, y0, &styled(label, self.entry_style(i)));
            hits.push(start, x, y0, Click::Buffer(i));
            x = x.saturating_add(1);
        }
    }
}

fn time_label(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M").to_string()
}
