//! Clickable regions for mouse dispatch.
//!
//! Drawing code registers a region for every interactive span it paints
//! (buffer tabs, column dividers, member rows). The registry is cleared at
//! the start of every frame and refilled while drawing, so a region is only
//! meaningful for the frame that produced it.
//!
//! Lookup is first-match-wins in registration order: when two regions
//! overlap, the one registered first shadows the other.

/// Entries of the help menu shown when no channel is selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpAction {
    AddNetwork,
    JoinChannel,
    MessageUser,
}

impl HelpAction {
    pub const ALL: [HelpAction; 3] = [
        HelpAction::AddNetwork,
        HelpAction::JoinChannel,
        HelpAction::MessageUser,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HelpAction::AddNetwork => "\u{2192}Add network",
            HelpAction::JoinChannel => "\u{2192}Join channel",
            HelpAction::MessageUser => "\u{2192}Message user",
        }
    }
}

/// Logical event bound to a clickable region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Click {
    /// A buffer entry in the vertical list or a tab in the horizontal bar
    Buffer(usize),
    /// Divider on the right edge of the channel pane
    ChannelColumn,
    /// Divider on the left edge of the member pane
    MemberColumn,
    /// A member row, by index in the member slice passed to `draw`
    Member(usize),
    /// A help menu row
    Help(HelpAction),
}

/// A clickable span on one row: columns `[x_begin, x_end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Region {
    x_begin: u16,
    x_end: u16,
    y: u16,
    event: Click,
}

impl Region {
    fn contains(&self, x: u16, y: u16) -> bool {
        y == self.y && x >= self.x_begin && x < self.x_end
    }
}

/// Per-frame list of clickable regions
#[derive(Debug)]
pub struct HitRegistry {
    regions: Vec<Region>,
}

impl HitRegistry {
    pub fn new() -> Self {
        Self {
            regions: Vec::with_capacity(128),
        }
    }

    /// Drop all regions, keeping the allocation for the next frame
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    /// Register a clickable span
    pub fn push(&mut self, x_begin: u16, x_end: u16, y: u16, event: Click) {
        if x_end <= x_begin {
            return;
        }
        self.regions.push(Region {
            x_begin,
            x_end,
            y,
            event,
        });
    }

    /// First registered event whose region contains the point
    pub fn find(&self, x: u16, y: u16) -> Option<Click> {
        self.regions
            .iter()
            .find(|region| region.contains(x, y))
            .map(|region| region.event)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl Default for HitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_is_half_open() {
        let mut hits = HitRegistry::new();
        hits.push(2, 5, 3, Click::Buffer(1));

        assert_eq!(hits.find(1, 3), None);
        assert_eq!(hits.find(2, 3), Some(Click::Buffer(1)));
        assert_eq!(hits.find(4, 3), Some(Click::Buffer(1)));
        assert_eq!(hits.find(5, 3), None);
        assert_eq!(hits.find(3, 2), None);
        assert_eq!(hits.find(3, 4), None);
    }

    #[test]
    fn first_registered_wins() {
        let mut hits = HitRegistry::new();
        hits.push(0, 10, 0, Click::Buffer(0));
        hits.push(5, 15, 0, Click::MemberColumn);

        assert_eq!(hits.find(7, 0), Some(Click::Buffer(0)));
        assert_eq!(hits.find(12, 0), Some(Click::MemberColumn));
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut hits = HitRegistry::new();
        for i in 0..200 {
            hits.push(0, 1, i, Click::Member(i as usize));
        }
        let capacity = hits.regions.capacity();
        hits.clear();

        assert!(hits.is_empty());
        assert_eq!(hits.regions.capacity(), capacity);
        assert_eq!(hits.find(0, 0), None);
    }

    #[test]
    fn empty_spans_are_ignored() {
        let mut hits = HitRegistry::new();
        hits.push(4, 4, 0, Click::ChannelColumn);
        hits.push(6, 2, 0, Click::ChannelColumn);
        assert_eq!(hits.len(), 0);
    }
}
