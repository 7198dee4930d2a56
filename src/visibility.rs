//! Page visibility tracking
//!
//! The host reports every visibility observation; the tracker reports a
//! transition only when the state actually flips, so repeated or spurious
//! `visibilitychange` events collapse to one.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityTransition {
    BecameVisible,
    BecameHidden,
}

#[derive(Debug, Clone, Copy)]
pub struct VisibilityTracker {
    visible: bool,
}

impl Default for VisibilityTracker {
    /// Pages load in the foreground
    fn default() -> Self {
        Self { visible: true }
    }
}

impl VisibilityTracker {
    pub fn new(visible: bool) -> Self {
        Self { visible }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn observe(&mut self, visible: bool) -> Option<VisibilityTransition> {
        if visible == self.visible {
            return None;
        }
        self.visible = visible;
        Some(if visible {
            VisibilityTransition::BecameVisible
        } else {
            VisibilityTransition::BecameHidden
        })
    }
}
