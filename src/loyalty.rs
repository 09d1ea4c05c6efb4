//! Loyalty tiers and points
//!
//! A derived, read-only view over historical spend and the points ledger.
//! Nothing here touches cart pricing: tiers feed customer-facing badges and
//! the balance is always recomputed from the ledger, never stored.

use std::fmt;

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

/// Customer loyalty tier, ordered by cumulative spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoyaltyTier {
    /// Below the silver threshold.
    Bronze,

    /// At or above the silver threshold.
    Silver,

    /// At or above the gold threshold.
    Gold,

    /// At or above the platinum threshold; the terminal tier.
    Platinum,
}

impl fmt::Display for LoyaltyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Platinum => "Platinum",
        };
        f.write_str(name)
    }
}

/// Cumulative-spend thresholds for the upper three tiers.
///
/// Lower bounds are inclusive: spend equal to a threshold reaches the tier.
#[derive(Debug, Clone, Copy)]
pub struct TierThresholds<'a> {
    silver: Money<'a, Currency>,
    gold: Money<'a, Currency>,
    platinum: Money<'a, Currency>,
}

impl<'a> TierThresholds<'a> {
    /// Create thresholds from the three tier boundaries.
    pub const fn new(
        silver: Money<'a, Currency>,
        gold: Money<'a, Currency>,
        platinum: Money<'a, Currency>,
    ) -> Self {
        Self {
            silver,
            gold,
            platinum,
        }
    }

    /// The standard 20k / 50k / 100k boundaries in the given currency.
    #[must_use]
    pub fn standard(currency: &'a Currency) -> Self {
        Self {
            silver: Money::from_major(20_000, currency),
            gold: Money::from_major(50_000, currency),
            platinum: Money::from_major(100_000, currency),
        }
    }

    /// The tier a cumulative spend falls in.
    #[must_use]
    pub fn tier_for(&self, total_spent: Money<'a, Currency>) -> LoyaltyTier {
        let spent = total_spent.to_minor_units();

        if spent >= self.platinum.to_minor_units() {
            LoyaltyTier::Platinum
        } else if spent >= self.gold.to_minor_units() {
            LoyaltyTier::Gold
        } else if spent >= self.silver.to_minor_units() {
            LoyaltyTier::Silver
        } else {
            LoyaltyTier::Bronze
        }
    }

    /// Additional spend needed to reach the next tier; zero at Platinum.
    #[must_use]
    pub fn spend_to_next_tier(&self, total_spent: Money<'a, Currency>) -> Money<'a, Currency> {
        let next_threshold = match self.tier_for(total_spent) {
            LoyaltyTier::Bronze => self.silver,
            LoyaltyTier::Silver => self.gold,
            LoyaltyTier::Gold => self.platinum,
            LoyaltyTier::Platinum => {
                return Money::from_minor(0, total_spent.currency());
            }
        };

        Money::from_minor(
            next_threshold.to_minor_units() - total_spent.to_minor_units(),
            total_spent.currency(),
        )
    }
}

/// Whether a ledger entry earned or redeemed points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryKind {
    /// Points granted to the customer.
    Earn,

    /// Points spent by the customer.
    Redeem,
}

/// One movement in a customer's points ledger.
///
/// Earn entries carry positive points and redeem entries negative ones, by
/// construction at the ledger writer.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    /// The customer the entry belongs to.
    pub user_id: String,

    /// Signed points delta.
    pub points: i64,

    /// Whether the entry earned or redeemed points.
    pub kind: LedgerEntryKind,

    /// When the entry was written.
    pub created_at: Timestamp,
}

/// Derived totals over a customer's ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointsSummary {
    /// Signed sum of every entry.
    pub balance: i64,

    /// Sum of positive deltas.
    pub earned: i64,

    /// Magnitude of negative deltas.
    pub redeemed: i64,
}

/// Sum a customer's ledger into balance, earned, and redeemed totals.
///
/// Earned and redeemed are filtered by sign, independent of the running
/// balance, so a miswritten entry cannot silently cancel out.
#[must_use]
pub fn summarize_ledger(entries: &[LedgerEntry]) -> PointsSummary {
    let balance = entries.iter().map(|entry| entry.points).sum();
    let earned = entries
        .iter()
        .filter(|entry| entry.points > 0)
        .map(|entry| entry.points)
        .sum();
    let redeemed = entries
        .iter()
        .filter(|entry| entry.points < 0)
        .map(|entry| entry.points.saturating_neg())
        .sum();

    PointsSummary {
        balance,
        earned,
        redeemed,
    }
}
