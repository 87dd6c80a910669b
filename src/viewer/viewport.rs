//! Scroll viewport geometry and visibility events
//!
//! The viewer core consumes enter/leave visibility transitions (the same
//! contract a browser intersection observer provides). This module derives
//! those transitions from a scroll offset and the per-page layout extents:
//! a page is visible while its span overlaps the viewport by any amount.

/// Scroll direction for viewport navigation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// One visibility transition for a page surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibilityEvent {
    /// Page number (1-based)
    pub page: usize,
    /// True when the page entered the viewport, false when it left
    pub visible: bool,
}

/// Tracks the scroll offset and which pages currently overlap the viewport.
#[derive(Debug, Default)]
pub struct ViewportTracker {
    /// Vertical scroll offset in pixels from the top of the page stack
    offset_px: u32,

    /// Viewport height in pixels
    viewport_height_px: u32,

    /// Pages overlapping the viewport as of the last update
    visible: Vec<usize>,
}

impl ViewportTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn offset_px(&self) -> u32 {
        self.offset_px
    }

    /// Pages overlapping the viewport as of the last update.
    #[must_use]
    pub fn visible_pages(&self) -> &[usize] {
        &self.visible
    }

    pub fn set_viewport_height(&mut self, height_px: u32) {
        self.viewport_height_px = height_px;
    }

    /// Scroll by `step_px`, clamped to the scrollable range of the stack.
    pub fn scroll(
        &mut self,
        direction: ScrollDirection,
        step_px: u32,
        extents: &[u32],
        separator_px: u32,
    ) {
        let max_offset =
            total_height(extents, separator_px).saturating_sub(self.viewport_height_px);

        self.offset_px = match direction {
            ScrollDirection::Up => self.offset_px.saturating_sub(step_px),
            ScrollDirection::Down => self.offset_px.saturating_add(step_px).min(max_offset),
        };
    }

    /// Scroll to the top of the stack
    pub fn scroll_to_top(&mut self) {
        self.offset_px = 0;
    }

    /// Scroll to the bottom of the stack
    pub fn scroll_to_bottom(&mut self, extents: &[u32], separator_px: u32) {
        self.offset_px =
            total_height(extents, separator_px).saturating_sub(self.viewport_height_px);
    }

    /// Scroll to position the given page (1-based) at the top of the viewport
    pub fn scroll_to_page(&mut self, page: usize, extents: &[u32], separator_px: u32) {
        self.offset_px = extents
            .iter()
            .take(page.saturating_sub(1))
            .map(|&h| h + separator_px)
            .sum();
    }

    /// Forget scroll position and visibility. Called on every relayout;
    /// rebuilding the stack puts the viewport back at the top.
    pub fn reset(&mut self) {
        self.offset_px = 0;
        self.visible.clear();
    }

    /// Diff the overlapping page set against the previous frame and emit
    /// visibility transitions.
    ///
    /// Enter events come before leave events: on a jump scroll the newly
    /// visible pages are pushed before the departed ones are removed, so
    /// the observer's leave guard never pins a long-gone page as active.
    pub fn update(&mut self, extents: &[u32], separator_px: u32) -> Vec<VisibilityEvent> {
        let viewport_top = self.offset_px;
        let viewport_bottom = self.offset_px.saturating_add(self.viewport_height_px);

        let mut now = Vec::new();
        let mut top = 0u32;
        for (idx, &extent) in extents.iter().enumerate() {
            let bottom = top + extent;
            if extent > 0 && top < viewport_bottom && bottom > viewport_top {
                now.push(idx + 1);
            }
            top = bottom + separator_px;
        }

        let mut events = Vec::new();
        for &page in &now {
            if !self.visible.contains(&page) {
                events.push(VisibilityEvent {
                    page,
                    visible: true,
                });
            }
        }
        for &page in &self.visible {
            if !now.contains(&page) {
                events.push(VisibilityEvent {
                    page,
                    visible: false,
                });
            }
        }

        self.visible = now;
        events
    }
}

fn total_height(extents: &[u32], separator_px: u32) -> u32 {
    extents.iter().map(|&h| h + separator_px).sum()
}
