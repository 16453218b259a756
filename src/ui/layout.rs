//! Pane geometry for the chat layout.
//!
//! Single source of truth for the fixed chrome widths and column limits -
//! no magic numbers scattered in render code.
//!
//! ```text
//! ┌────────┬─────┬───┬──────┬──┬──────────────────────┬─────────┐
//! │channels│time │   │ nick │  │ message text         │ members │
//! └────────┴─────┴───┴──────┴──┴──────────────────────┴─────────┘
//!           └──── 7 ────┘      └2┘
//! ```

/// Cells used by the time column, gaps and separators around the nick column
pub const CHROME_WIDTH: u16 = 9;

/// Offset of the nick column from the left edge of the timeline
pub const NICK_COL_OFFSET: u16 = 7;

/// Narrowest a side column can be resized to
pub const MIN_COL_WIDTH: u16 = 6;

/// Widest a side column can be resized to
pub const MAX_COL_WIDTH: u16 = 24;

/// Clamp a requested side column width to the allowed range
pub fn clamp_col_width(width: i32) -> u16 {
    width.clamp(i32::from(MIN_COL_WIDTH), i32::from(MAX_COL_WIDTH)) as u16
}

/// Derived sizes for one terminal size and pane configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Width of the message column, never below 1
    pub inner_width: u16,
    /// Width text is wrapped at (inner width capped by the max text width)
    pub text_width: u16,
    /// Rows owned by the timeline
    pub timeline_height: u16,
}

impl Geometry {
    /// Compute pane sizes.
    ///
    /// A collapsed channel pane (`channel_width == 0`) moves the buffer list to
    /// a horizontal bar at the bottom, costing the timeline one more row.
    pub fn compute(
        width: u16,
        height: u16,
        channel_width: u16,
        nick_col_width: u16,
        member_width: u16,
        text_max_width: u16,
    ) -> Self {
        let chrome = i32::from(CHROME_WIDTH)
            + i32::from(channel_width)
            + i32::from(nick_col_width)
            + i32::from(member_width);
        let inner = i32::from(width) - chrome;
        // degraded display on tiny terminals, but never a zero-width column
        let inner_width = if inner <= 0 { 1 } else { inner as u16 };

        let text_width = if text_max_width > 0 && text_max_width < inner_width {
            text_max_width
        } else {
            inner_width
        };

        let reserved = if channel_width == 0 { 3 } else { 2 };
        let timeline_height = height.saturating_sub(reserved);

        Self {
            inner_width,
            text_width,
            timeline_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn col_width_clamping() {
        assert_eq!(clamp_col_width(0), 6);
        assert_eq!(clamp_col_width(5), 6);
        assert_eq!(clamp_col_width(6), 6);
        assert_eq!(clamp_col_width(24), 24);
        assert_eq!(clamp_col_width(25), 24);
        assert_eq!(clamp_col_width(100), 24);
        assert_eq!(clamp_col_width(-3), 6);
    }

    #[test]
    fn vertical_layout_geometry() {
        let g = Geometry::compute(80, 24, 16, 14, 0, 0);
        assert_eq!(g.inner_width, 80 - 9 - 16 - 14);
        assert_eq!(g.text_width, g.inner_width);
        assert_eq!(g.timeline_height, 22);
    }

    #[test]
    fn horizontal_layout_costs_a_row() {
        let g = Geometry::compute(80, 24, 0, 14, 16, 0);
        assert_eq!(g.inner_width, 80 - 9 - 14 - 16);
        assert_eq!(g.timeline_height, 21);
    }

    #[test]
    fn tiny_terminal_floors_inner_width() {
        let g = Geometry::compute(20, 3, 16, 14, 16, 0);
        assert_eq!(g.inner_width, 1);
        assert_eq!(g.text_width, 1);
        assert_eq!(g.timeline_height, 1);

        let g = Geometry::compute(0, 0, 0, 0, 0, 0);
        assert_eq!(g.inner_width, 1);
        assert_eq!(g.timeline_height, 0);
    }

    #[test]
    fn text_max_width_caps_only_when_smaller() {
        let g = Geometry::compute(120, 40, 16, 14, 16, 40);
        assert_eq!(g.text_width, 40);
        assert_eq!(g.inner_width, 120 - 9 - 16 - 14 - 16);

        let g = Geometry::compute(80, 24, 16, 14, 0, 200);
        assert_eq!(g.text_width, g.inner_width);
    }
}
