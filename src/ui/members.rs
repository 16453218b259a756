// Member pane
//
// Right-hand column listing the members of the current channel. When the
// current buffer is not a channel it shows a small help menu instead.

use super::color::{ident_color, COLOR_GRAY, COLOR_RED};
use super::draw::{
    char_width, clear_area, draw_horizontal_line, draw_vertical_line, print_string, styled,
    truncate, ELLIPSIS,
};
use super::hit::{Click, HelpAction, HitRegistry};
use super::ConfigColors;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};

const DISCONNECTED_MARKER: char = '\u{274C}';

/// A channel member as supplied by the caller on every draw
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub is_self: bool,
    pub away: bool,
    pub disconnected: bool,
    /// Membership prefix such as `@` or `+`, empty for regular members
    pub power_level: String,
}

impl Member {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Everything the member pane reads while drawing
pub(crate) struct MemberPane<'a> {
    pub members: &'a [Member],
    pub colors: &'a ConfigColors,
    /// False when the current buffer is a server buffer
    pub in_channel: bool,
}

impl MemberPane<'_> {
    /// Draw the pane in `area`, whose first column is the divider.
    ///
    /// `offset` is clamped so the window never scrolls past the last member,
    /// `clicked` is clamped to the member count.
    pub fn draw(
        &self,
        buf: &mut Buffer,
        hits: &mut HitRegistry,
        area: Rect,
        offset: &mut usize,
        clicked: &mut Option<usize>,
    ) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        draw_vertical_line(buf, area.x, area.y, area.height);
        for y in area.top()..area.bottom() {
            hits.push(area.x, area.x + 1, y, Click::MemberColumn);
        }
        let x0 = area.x + 1;
        let width = area.width - 1;
        clear_area(buf, x0, area.y, width, area.height);

        if !self.in_channel {
            self.draw_help(buf, hits, x0, area.y, width, *clicked);
            return;
        }

        let list_height = usize::from(area.height.saturating_sub(2));
        let count = self.members.len();
        *offset = (*offset).min(count.saturating_sub(list_height));
        if let Some(i) = *clicked {
            if i >= count {
                *clicked = count.checked_sub(1);
            }
        }

        if count > 0 {
            let label = if count > 1 {
                format!("{} members", count)
            } else {
                format!("{} member", count)
            };
            let label = truncate(&label, usize::from(width.saturating_sub(1)), ELLIPSIS);
            let mut x = x0 + 1;
            let header = styled(label, Style::default().fg(self.colors.status));
            print_string(buf, &mut x, area.y, &header);
        }
        draw_horizontal_line(buf, x0, area.y + 1, width);

        let padding = if self.members.iter().any(|m| m.disconnected) {
            char_width(DISCONNECTED_MARKER) as u16
        } else {
            1
        };

        let rows = self.members.iter().enumerate().skip(*offset).take(list_height);
        for (row, (i, member)) in rows.enumerate() {
            let y = area.y + 2 + row as u16;
            let mut modifier = Modifier::empty();
            if *clicked == Some(i) {
                modifier |= Modifier::REVERSED;
            }

            let mut x = x0;
            if member.disconnected {
                let marker = styled(
                    DISCONNECTED_MARKER.to_string(),
                    Style::default().fg(COLOR_RED).add_modifier(modifier),
                );
                print_string(buf, &mut x, y, &marker);
            } else if let Some(badge) = member.power_level.chars().next() {
                x += padding - 1;
                let badge = styled(
                    badge.to_string(),
                    Style::default()
                        .fg(Color::Indexed(2))
                        .add_modifier(modifier),
                );
                print_string(buf, &mut x, y, &badge);
            } else {
                x += padding;
            }

            let name = truncate(
                &member.name,
                usize::from(width.saturating_sub(padding)),
                ELLIPSIS,
            );
            let style = if member.away {
                Style::default()
                    .fg(COLOR_GRAY)
                    .add_modifier(Modifier::DIM | modifier)
            } else {
                let color = ident_color(&self.colors.nicks, &member.name, member.is_self);
                Style::default().fg(color).add_modifier(modifier)
            };
            print_string(buf, &mut x, y, &styled(name, style));

            hits.push(x0, x0 + width, y, Click::Member(i));
        }
    }

    fn draw_help(
        &self,
        buf: &mut Buffer,
        hits: &mut HitRegistry,
        x0: u16,
        y0: u16,
        width: u16,
        clicked: Option<usize>,
    ) {
        let mut x = x0 + 1;
        let title = styled("Help", Style::default().fg(self.colors.status));
        print_string(buf, &mut x, y0, &title);
        draw_horizontal_line(buf, x0, y0 + 1, width);

        let mut y = y0 + 2;
        for (i, action) in HelpAction::ALL.iter().enumerate() {
            let mut style = Style::default();
            if clicked == Some(i) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            let mut x = x0;
            print_string(buf, &mut x, y, &styled(action.label(), style));
            hits.push(x0, x0 + width, y, Click::Help(*action));
            draw_horizontal_line(buf, x0, y + 1, width);
            y += 2;
        }
    }
}
