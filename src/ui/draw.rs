// Cell-level drawing helpers shared by every pane
//
// All helpers clip against the buffer area instead of panicking, so panes
// laid out for a degenerate terminal size still draw what fits.

use ratatui::buffer::Buffer;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Styled text as drawn by the panes
pub type StyledString = Line<'static>;

pub const ELLIPSIS: &str = "\u{2026}";
const VERTICAL_LINE: &str = "\u{2502}";
const HORIZONTAL_LINE: &str = "\u{2500}";

/// Single-style text
pub fn styled(text: impl Into<String>, style: Style) -> StyledString {
    Line::from(Span::styled(text.into(), style))
}

/// Display width of a string in cells
pub fn string_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Display width of one character (control characters count as zero)
pub fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(0)
}

fn contains(buf: &Buffer, x: u16, y: u16) -> bool {
    let area = buf.area;
    x >= area.left() && x < area.right() && y >= area.top() && y < area.bottom()
}

pub fn set_cell(buf: &mut Buffer, x: u16, y: u16, symbol: &str, style: Style) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.reset();
        cell.set_symbol(symbol).set_style(style);
    }
}

/// Print `line` starting at `*x`, advancing `*x` past what was drawn
pub fn print_string(buf: &mut Buffer, x: &mut u16, y: u16, line: &StyledString) {
    for span in &line.spans {
        if !contains(buf, *x, y) {
            // keep advancing so callers can still lay out relative to the end
            *x = x.saturating_add(string_width(&span.content) as u16);
            continue;
        }
        let style = line.style.patch(span.style);
        let (next, _) = buf.set_stringn(*x, y, &span.content, usize::MAX, style);
        *x = next;
    }
}

/// Print `line` right-aligned in `width` cells ending just before `x + width`
///
/// One padding cell on each side takes the style of the adjacent span, so
/// prompts with a background color read as a pill.
pub fn print_ident(buf: &mut Buffer, x: u16, y: u16, width: u16, line: &StyledString) {
    let line = truncate_line(line, usize::from(width));
    let mut x = x + width - (line.width() as u16).min(width);

    let first = line.spans.first().map(|s| line.style.patch(s.style));
    let last = line.spans.last().map(|s| line.style.patch(s.style));
    if let Some(style) = first {
        if x > 0 {
            set_cell(buf, x - 1, y, " ", style);
        }
    }
    print_string(buf, &mut x, y, &line);
    if let Some(style) = last {
        set_cell(buf, x, y, " ", style);
    }
}

/// Reset every cell of the rectangle to a blank
pub fn clear_area(buf: &mut Buffer, x: u16, y: u16, width: u16, height: u16) {
    for cy in y..y.saturating_add(height) {
        for cx in x..x.saturating_add(width) {
            if let Some(cell) = buf.cell_mut((cx, cy)) {
                cell.reset();
            }
        }
    }
}

pub fn draw_vertical_line(buf: &mut Buffer, x: u16, y: u16, height: u16) {
    for cy in y..y.saturating_add(height) {
        set_cell(buf, x, cy, VERTICAL_LINE, Style::default());
    }
}

pub fn draw_horizontal_line(buf: &mut Buffer, x: u16, y: u16, width: u16) {
    for cx in x..x.saturating_add(width) {
        set_cell(buf, cx, y, HORIZONTAL_LINE, Style::default());
    }
}

/// Cut `s` to at most `width` cells, ending with `tail` when anything was cut
pub fn truncate(s: &str, width: usize, tail: &str) -> String {
    if string_width(s) <= width {
        return s.to_string();
    }
    let tail_width = string_width(tail);
    if width < tail_width {
        return String::new();
    }

    let budget = width - tail_width;
    let mut used = 0;
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        let w = char_width(c);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str(tail);
    out
}

/// Styled variant of [`truncate`] using the ellipsis as tail
pub fn truncate_line(line: &StyledString, width: usize) -> StyledString {
    if line.width() <= width {
        return line.clone();
    }
    if width == 0 {
        return Line::default();
    }

    let mut budget = width - 1;
    let mut spans = Vec::with_capacity(line.spans.len() + 1);
    let mut tail_style = line.style;
    for span in &line.spans {
        tail_style = line.style.patch(span.style);
        let w = string_width(&span.content);
        if w <= budget {
            budget -= w;
            spans.push(span.clone());
            continue;
        }
        let mut text = String::new();
        for c in span.content.chars() {
            let cw = char_width(c);
            if cw > budget {
                break;
            }
            budget -= cw;
            text.push(c);
        }
        if !text.is_empty() {
            spans.push(Span::styled(text, span.style));
        }
        break;
    }
    spans.push(Span::styled(ELLIPSIS, tail_style));
    Line::from(spans).style(line.style)
}

/// Split `line` into rows no wider than `width`, breaking after spaces when
/// a word fits on the next row
pub fn wrap(line: &StyledString, width: usize) -> Vec<StyledString> {
    let width = width.max(1);
    let chars: Vec<(char, Style)> = line
        .spans
        .iter()
        .flat_map(|span| {
            let style = line.style.patch(span.style);
            span.content.chars().map(move |c| (c, style))
        })
        .filter(|(c, _)| !c.is_control())
        .collect();

    let mut rows = Vec::new();
    let mut start = 0;
    let mut used = 0;
    let mut last_space: Option<usize> = None;
    let mut i = 0;
    while i < chars.len() {
        let (c, _) = chars[i];
        let w = char_width(c);
        if used + w > width && i > start {
            let end = match last_space {
                Some(space) if space >= start => space + 1,
                _ => i,
            };
            rows.push(collect_row(&chars[start..end]));
            start = end;
            used = chars[start..i].iter().map(|(c, _)| char_width(*c)).sum();
            last_space = None;
            continue;
        }
        if c == ' ' {
            last_space = Some(i);
        }
        used += w;
        i += 1;
    }
    if start < chars.len() || rows.is_empty() {
        rows.push(collect_row(&chars[start..]));
    }
    rows
}

fn collect_row(chars: &[(char, Style)]) -> StyledString {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut text = String::new();
    let mut current: Option<Style> = None;
    for &(c, style) in chars {
        if current.is_some_and(|s| s != style) {
            spans.push(Span::styled(std::mem::take(&mut text), current.unwrap_or_default()));
        }
        current = Some(style);
        text.push(c);
    }
    if let Some(style) = current {
        spans.push(Span::styled(text, style));
    }
    Line::from(spans)
}

/// Plain text of a styled string
pub fn plain(line: &StyledString) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;
    use ratatui::style::Color;

    fn row(buf: &Buffer, y: u16) -> String {
        (buf.area.left()..buf.area.right())
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("alice", 5, ELLIPSIS), "alice");
        assert_eq!(truncate("alice", 4, ELLIPSIS), "ali\u{2026}");
        assert_eq!(truncate("alice", 0, ELLIPSIS), "");
    }

    #[test]
    fn truncate_counts_wide_chars() {
        // each CJK char is two cells
        assert_eq!(truncate("日本語", 5, ELLIPSIS), "日本\u{2026}");
        assert_eq!(truncate("日本語", 4, ELLIPSIS), "日\u{2026}");
    }

    #[test]
    fn print_string_advances_and_clips() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 6, 1));
        let mut x = 2;
        print_string(&mut buf, &mut x, 0, &styled("hello", Style::default()));
        assert_eq!(row(&buf, 0), "  hell");
        assert_eq!(x, 6);

        // off-buffer rows are ignored
        let mut x = 0;
        print_string(&mut buf, &mut x, 5, &styled("zz", Style::default()));
        assert_eq!(x, 2);
    }

    #[test]
    fn print_ident_right_aligns() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 1));
        print_ident(&mut buf, 2, 0, 6, &styled("bob", Style::default().fg(Color::Red)));
        assert_eq!(row(&buf, 0), "     bob  ");
        assert_eq!(buf[(5, 0)].fg, Color::Red);
        assert_eq!(buf[(8, 0)].fg, Color::Red);
    }

    #[test]
    fn print_ident_truncates_long_names() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 8, 1));
        print_ident(&mut buf, 0, 0, 4, &styled("alexander", Style::default()));
        assert_eq!(row(&buf, 0), "ale\u{2026}    ");
    }

    #[test]
    fn clear_area_clips() {
        let mut buf = Buffer::with_lines(["abcd", "efgh"]);
        clear_area(&mut buf, 1, 1, 10, 10);
        assert_eq!(row(&buf, 0), "abcd");
        assert_eq!(row(&buf, 1), "e   ");
    }

    #[test]
    fn lines_are_drawn() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 3, 3));
        draw_vertical_line(&mut buf, 0, 0, 3);
        draw_horizontal_line(&mut buf, 1, 1, 5);
        assert_eq!(row(&buf, 0), "\u{2502}  ");
        assert_eq!(row(&buf, 1), "\u{2502}\u{2500}\u{2500}");
    }

    #[test]
    fn wrap_breaks_after_spaces() {
        let rows = wrap(&styled("hello big world", Style::default()), 10);
        let texts: Vec<String> = rows.iter().map(plain).collect();
        assert_eq!(texts, vec!["hello big ", "world"]);
    }

    #[test]
    fn wrap_splits_long_words() {
        let rows = wrap(&styled("abcdefghij", Style::default()), 4);
        let texts: Vec<String> = rows.iter().map(plain).collect();
        assert_eq!(texts, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_keeps_styles() {
        let line = Line::from(vec![
            Span::styled("ab", Style::default().fg(Color::Red)),
            Span::raw("cd"),
        ]);
        let rows = wrap(&line, 3);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].spans[0].style.fg, Some(Color::Red));
        assert_eq!(plain(&rows[0]), "abc");
        assert_eq!(plain(&rows[1]), "d");
    }

    #[test]
    fn wrap_empty_yields_one_row() {
        assert_eq!(wrap(&Line::default(), 10).len(), 1);
    }
}
