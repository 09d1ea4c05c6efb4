//! Activity windows

use jiff::Timestamp;

/// Time box an offer is live in. Bounds are inclusive; an unset bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityWindow {
    starts_at: Option<Timestamp>,
    ends_at: Option<Timestamp>,
}

/// Where a point in time falls relative to a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// Before the window opens.
    NotYetActive,

    /// Inside the window.
    Active,

    /// After the window closes.
    Expired,
}

impl ActivityWindow {
    /// A window that is always active.
    #[must_use]
    pub const fn always() -> Self {
        Self {
            starts_at: None,
            ends_at: None,
        }
    }

    /// A window bounded on both ends.
    #[must_use]
    pub const fn between(starts_at: Timestamp, ends_at: Timestamp) -> Self {
        Self {
            starts_at: Some(starts_at),
            ends_at: Some(ends_at),
        }
    }

    /// A window that opens at a point in time and never closes.
    #[must_use]
    pub const fn starting(starts_at: Timestamp) -> Self {
        Self {
            starts_at: Some(starts_at),
            ends_at: None,
        }
    }

    /// A window that is open until a point in time.
    #[must_use]
    pub const fn until(ends_at: Timestamp) -> Self {
        Self {
            starts_at: None,
            ends_at: Some(ends_at),
        }
    }

    /// A window from optional bounds.
    #[must_use]
    pub const fn new(starts_at: Option<Timestamp>, ends_at: Option<Timestamp>) -> Self {
        Self { starts_at, ends_at }
    }

    /// When the window opens, if bounded.
    #[must_use]
    pub const fn starts_at(&self) -> Option<Timestamp> {
        self.starts_at
    }

    /// When the window closes, if bounded.
    #[must_use]
    pub const fn ends_at(&self) -> Option<Timestamp> {
        self.ends_at
    }

    /// Classify a point in time against the window.
    #[must_use]
    pub fn state(&self, now: Timestamp) -> WindowState {
        if let Some(starts_at) = self.starts_at
            && now < starts_at
        {
            return WindowState::NotYetActive;
        }

        if let Some(ends_at) = self.ends_at
            && now > ends_at
        {
            return WindowState::Expired;
        }

        WindowState::Active
    }

    /// Check whether the window is active at a point in time.
    #[must_use]
    pub fn contains(&self, now: Timestamp) -> bool {
        self.state(now) == WindowState::Active
    }
}
