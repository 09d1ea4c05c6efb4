//! Usage budgets

/// Global redemption cap for an offer.
///
/// The engine only reads the budget; incrementing `current_uses` is the offer
/// store's job, via an atomic conditional update so two concurrent checkouts
/// cannot both pass the limit check.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsageBudget {
    max_uses: Option<u32>,
    current_uses: u32,
}

impl UsageBudget {
    /// A budget with no redemption cap.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_uses: None,
            current_uses: 0,
        }
    }

    /// A budget capped at a total number of redemptions.
    #[must_use]
    pub const fn with_limit(max_uses: u32) -> Self {
        Self {
            max_uses: Some(max_uses),
            current_uses: 0,
        }
    }

    /// A budget restored from storage with a recorded usage count.
    #[must_use]
    pub const fn with_usage(max_uses: Option<u32>, current_uses: u32) -> Self {
        Self {
            max_uses,
            current_uses,
        }
    }

    /// The redemption cap, if any.
    #[must_use]
    pub const fn max_uses(&self) -> Option<u32> {
        self.max_uses
    }

    /// Redemptions recorded so far.
    #[must_use]
    pub const fn current_uses(&self) -> u32 {
        self.current_uses
    }

    /// Check whether the cap has been reached.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.max_uses
            .is_some_and(|max_uses| self.current_uses >= max_uses)
    }

    /// Record a redemption if the cap allows one more.
    ///
    /// Returns `false`, without recording, when the budget is exhausted. This
    /// is the compare-and-swap shape storage implementations mirror.
    pub fn record_use(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }

        self.current_uses = self.current_uses.saturating_add(1);
        true
    }
}
