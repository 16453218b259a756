// Input line editor
//
// Single-line editor with history, word motions, autocompletion and a
// reverse history search. The line being typed is the last history entry;
// walking up the history edits past entries in place until the next flush.

use super::color::COLOR_GRAY;
use super::draw::{char_width, clear_area, print_string, styled};
use ratatui::buffer::Buffer;
use ratatui::style::{Modifier, Style};
use std::sync::Arc;

/// Flushed lines kept for history navigation
const HISTORY_LIMIT: usize = 256;

/// One autocompletion candidate
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Completion {
    /// Range of the original text the completion replaces
    pub start_idx: usize,
    pub end_idx: usize,
    /// Full line after applying the completion
    pub text: Vec<char>,
    /// Label shown in the suggestion row
    pub display: Vec<char>,
    /// Cursor position after applying the completion
    pub cursor_idx: usize,
}

/// Computes completions for `(cursor_idx, text)`
pub type AutoCompleteFn = Arc<dyn Fn(usize, &[char]) -> Vec<Completion> + Send + Sync>;

pub struct Editor {
    /// History entries followed by the draft line
    text: Vec<Vec<char>>,
    line_idx: usize,
    cursor_idx: usize,
    /// First visible char when the line is wider than the editor
    offset_idx: usize,
    width: usize,

    auto_complete: Option<AutoCompleteFn>,
    completions: Vec<Completion>,
    completion_idx: usize,

    backsearch: Option<Vec<char>>,
}

impl Editor {
    pub fn new(auto_complete: Option<AutoCompleteFn>) -> Self {
        Self {
            text: vec![Vec::new()],
            line_idx: 0,
            cursor_idx: 0,
            offset_idx: 0,
            width: 1,
            auto_complete,
            completions: Vec::new(),
            completion_idx: 0,
            backsearch: None,
        }
    }

    /// Current input; valid until the next mutation
    pub fn content(&self) -> &[char] {
        &self.text[self.line_idx]
    }

    pub fn is_empty(&self) -> bool {
        self.content().is_empty()
    }

    fn line_mut(&mut self) -> &mut Vec<char> {
        &mut self.text[self.line_idx]
    }

    /// Forget cached completions and leave history search
    fn reset_modes(&mut self) {
        self.completions.clear();
        self.completion_idx = 0;
        self.backsearch = None;
    }

    pub fn put_char(&mut self, c: char) {
        self.completions.clear();
        if let Some(pattern) = self.backsearch.as_mut() {
            pattern.push(c);
            self.search_from(self.text.len() - 1);
            return;
        }
        let cursor = self.cursor_idx;
        self.line_mut().insert(cursor, c);
        self.cursor_idx += 1;
        self.scroll_to_cursor();
    }

    /// Accept the shown completion; returns true when the key was used for that
    pub fn enter(&mut self) -> bool {
        if self.completions.is_empty() {
            return false;
        }
        self.completions.clear();
        self.completion_idx = 0;
        true
    }

    pub fn left(&mut self) {
        self.reset_modes();
        self.cursor_idx = self.cursor_idx.saturating_sub(1);
        self.scroll_to_cursor();
    }

    pub fn right(&mut self) {
        self.reset_modes();
        if self.cursor_idx < self.content().len() {
            self.cursor_idx += 1;
        }
        self.scroll_to_cursor();
    }

    pub fn left_word(&mut self) {
        self.reset_modes();
        let line = &self.text[self.line_idx];
        let mut i = self.cursor_idx;
        while i > 0 && line[i - 1] == ' ' {
            i -= 1;
        }
        while i > 0 && line[i - 1] != ' ' {
            i -= 1;
        }
        self.cursor_idx = i;
        self.scroll_to_cursor();
    }

    pub fn right_word(&mut self) {
        self.reset_modes();
        let line = &self.text[self.line_idx];
        let mut i = self.cursor_idx;
        while i < line.len() && line[i] == ' ' {
            i += 1;
        }
        while i < line.len() && line[i] != ' ' {
            i += 1;
        }
        self.cursor_idx = i;
        self.scroll_to_cursor();
    }

    pub fn home(&mut self) {
        self.reset_modes();
        self.cursor_idx = 0;
        self.scroll_to_cursor();
    }

    pub fn end(&mut self) {
        self.reset_modes();
        self.cursor_idx = self.content().len();
        self.scroll_to_cursor();
    }

    /// Previous history entry
    pub fn up(&mut self) {
        self.reset_modes();
        if self.line_idx == 0 {
            return;
        }
        self.line_idx -= 1;
        self.end();
    }

    /// Next history entry, down to the draft line
    pub fn down(&mut self) {
        self.reset_modes();
        if self.line_idx + 1 >= self.text.len() {
            return;
        }
        self.line_idx += 1;
        self.end();
    }

    /// Backspace: remove the character before the cursor with its combining marks
    pub fn rem_cluster(&mut self) -> bool {
        self.reset_modes();
        if self.cursor_idx == 0 {
            return false;
        }
        loop {
            self.cursor_idx -= 1;
            let cursor = self.cursor_idx;
            let removed = self.line_mut().remove(cursor);
            if char_width(removed) != 0 || self.cursor_idx == 0 {
                break;
            }
        }
        self.scroll_to_cursor();
        true
    }

    /// Delete: remove the character under the cursor with its combining marks
    pub fn rem_cluster_forward(&mut self) -> bool {
        self.reset_modes();
        let cursor = self.cursor_idx;
        if cursor >= self.content().len() {
            return false;
        }
        let line = self.line_mut();
        line.remove(cursor);
        while cursor < line.len() && char_width(line[cursor]) == 0 {
            line.remove(cursor);
        }
        true
    }

    /// Remove the word before the cursor along with the spaces after it
    pub fn rem_word(&mut self) -> bool {
        self.reset_modes();
        let end = self.cursor_idx;
        if end == 0 {
            return false;
        }
        let line = &self.text[self.line_idx];
        let mut start = end;
        while start > 0 && line[start - 1] == ' ' {
            start -= 1;
        }
        while start > 0 && line[start - 1] != ' ' {
            start -= 1;
        }
        self.line_mut().drain(start..end);
        self.cursor_idx = start;
        self.scroll_to_cursor();
        true
    }

    /// Complete at the cursor; repeated calls cycle through candidates
    pub fn auto_complete(&mut self) -> bool {
        self.backsearch = None;
        if self.completions.is_empty() {
            let Some(complete) = self.auto_complete.clone() else {
                return false;
            };
            let completions = complete(self.cursor_idx, self.content());
            if completions.is_empty() {
                return false;
            }
            self.completions = completions;
            self.completion_idx = 0;
        } else {
            self.completion_idx = (self.completion_idx + 1) % self.completions.len();
        }

        let completion = &self.completions[self.completion_idx];
        let text = completion.text.clone();
        self.cursor_idx = completion.cursor_idx.min(text.len());
        *self.line_mut() = text;
        self.scroll_to_cursor();
        true
    }

    /// Take the input, record it in history and start a fresh line
    pub fn flush(&mut self) -> String {
        self.reset_modes();
        let content = self.content().to_vec();

        // the draft slot is replaced by the submitted line
        self.text.pop();
        if !content.is_empty() {
            self.text.push(content.clone());
            if self.text.len() > HISTORY_LIMIT {
                self.text.remove(0);
            }
        }
        self.text.push(Vec::new());
        self.line_idx = self.text.len() - 1;
        self.cursor_idx = 0;
        self.offset_idx = 0;

        content.into_iter().collect()
    }

    /// Empty the input; false when it was already empty
    pub fn clear(&mut self) -> bool {
        self.reset_modes();
        if self.is_empty() {
            return false;
        }
        self.line_mut().clear();
        self.cursor_idx = 0;
        self.offset_idx = 0;
        true
    }

    pub fn set(&mut self, text: &str) {
        self.reset_modes();
        *self.line_mut() = text.chars().collect();
        self.cursor_idx = self.content().len();
        self.scroll_to_cursor();
    }

    /// Reverse history search; the input typed so far is the pattern and
    /// repeated calls look further back
    pub fn back_search(&mut self) {
        self.completions.clear();
        if self.backsearch.is_none() {
            self.backsearch = Some(self.content().to_vec());
        }
        self.search_from(self.line_idx);
    }

    /// Show the newest history entry before `before` matching the pattern
    fn search_from(&mut self, before: usize) {
        let Some(pattern) = self.backsearch.as_ref() else {
            return;
        };
        let found = self.text[..before]
            .iter()
            .rposition(|entry| contains(entry, pattern));
        if let Some(i) = found {
            self.line_idx = i;
            self.cursor_idx = self.content().len();
            self.scroll_to_cursor();
        }
    }

    pub fn resize(&mut self, width: u16) {
        self.width = usize::from(width).max(1);
        self.scroll_to_cursor();
    }

    fn scroll_to_cursor(&mut self) {
        if self.cursor_idx < self.offset_idx {
            self.offset_idx = self.cursor_idx;
            return;
        }
        // leave a cell for the cursor itself
        let line = &self.text[self.line_idx];
        let mut used: usize = line[self.offset_idx..self.cursor_idx]
            .iter()
            .map(|&c| char_width(c))
            .sum();
        while used + 1 > self.width && self.offset_idx < self.cursor_idx {
            used -= char_width(line[self.offset_idx]);
            self.offset_idx += 1;
        }
    }

    /// Draw the input at `(x0, y)` and return the cursor column.
    ///
    /// An empty input shows `hint` instead. While several completions are
    /// pending they are listed on the row above.
    pub fn draw(&self, buf: &mut Buffer, x0: u16, y: u16, hint: &str) -> u16 {
        let width = self.width as u16;
        clear_area(buf, x0, y, width, 1);

        let line = self.content();
        if line.is_empty() && !hint.is_empty() {
            let mut x = x0;
            print_string(buf, &mut x, y, &styled(hint, Style::default().fg(COLOR_GRAY)));
        }

        let mut x = x0;
        let mut cursor_x = x0;
        let right = usize::from(x0) + self.width;
        for (i, &c) in line.iter().enumerate().skip(self.offset_idx) {
            if i == self.cursor_idx {
                cursor_x = x;
            }
            if usize::from(x) + char_width(c) > right {
                break;
            }
            print_string(buf, &mut x, y, &styled(c.to_string(), Style::default()));
        }
        if self.cursor_idx >= line.len() {
            cursor_x = x;
        }

        if self.completions.len() > 1 && y > 0 {
            self.draw_completions(buf, x0, y - 1);
        }
        if let Some(pattern) = &self.backsearch {
            let label: String = pattern.iter().collect();
            let mut x = x0;
            let style = Style::default().fg(COLOR_GRAY);
            if y > 0 {
                clear_area(buf, x0, y - 1, width, 1);
                print_string(buf, &mut x, y - 1, &styled(format!("(search) {}", label), style));
            }
        }

        cursor_x
    }

    fn draw_completions(&self, buf: &mut Buffer, x0: u16, y: u16) {
        clear_area(buf, x0, y, self.width as u16, 1);
        let right = usize::from(x0) + self.width;
        let mut x = x0;
        for (i, completion) in self.completions.iter().enumerate() {
            let label: String = completion.display.iter().collect();
            let label_width: usize = completion.display.iter().map(|&c| char_width(c)).sum();
            if usize::from(x) + label_width > right {
                break;
            }
            let mut style = Style::default();
            if i == self.completion_idx {
                style = style.add_modifier(Modifier::REVERSED);
            }
            print_string(buf, &mut x, y, &styled(label, style));
            x = x.saturating_add(1);
        }
    }
}

fn contains(haystack: &[char], needle: &[char]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}
