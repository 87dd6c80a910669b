//! Active-page tracking for continuous scroll

/// Derives the active page from surface visibility transitions.
///
/// Pages are pushed as they enter the viewport and removed as they leave,
/// so the most recently entered page that is still in view sits on top of
/// the stack and is reported as the active page. During momentum scrolling
/// several pages are partially visible at once; entry order approximates
/// "the page the user scrolled into" without comparing intersection ratios.
///
/// The stack never drains below one entry while pages are still tracked,
/// so the page indicator cannot blank out between a leave event and the
/// matching enter of the next page.
#[derive(Debug, Default)]
pub struct ViewportObserver {
    /// Pages registered for visibility tracking
    tracked: Vec<usize>,

    /// Visibility stack, most recently entered page last
    stack: Vec<usize>,
}

impl ViewportObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page for visibility tracking.
    ///
    /// Events for unregistered pages are ignored, so transitions arriving
    /// for surfaces of a torn-down layout cannot pollute the stack.
    pub fn observe(&mut self, page: usize) {
        if !self.tracked.contains(&page) {
            self.tracked.push(page);
        }
    }

    /// Apply one visibility transition for a registered page.
    ///
    /// Entering pushes the page on top of the stack; re-entry moves it to
    /// the top rather than duplicating it. Leaving removes the page unless
    /// the stack would become empty, and removing a page that is not on
    /// the stack is a no-op since transitions can arrive out of order
    /// during rapid re-layout.
    pub fn on_visibility_change(&mut self, page: usize, visible: bool) {
        if !self.tracked.contains(&page) {
            return;
        }

        if visible {
            self.stack.retain(|&p| p != page);
            self.stack.push(page);
        } else if let Some(pos) = self.stack.iter().position(|&p| p == page) {
            if self.stack.len() > 1 {
                self.stack.remove(pos);
            }
        }
    }

    /// The most recently entered page still in view.
    #[must_use]
    pub fn active_page(&self) -> Option<usize> {
        self.stack.last().copied()
    }

    /// Number of pages currently on the visibility stack.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.stack.len()
    }

    /// Forget all registrations and visibility history.
    ///
    /// Called whenever surfaces are torn down and recreated.
    pub fn reset(&mut self) {
        self.tracked.clear();
        self.stack.clear();
    }
}
