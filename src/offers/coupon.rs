//! Coupons
//!
//! A coupon reduces the order total by a percentage or a fixed amount. At
//! most one coupon applies per order. Validation is ordered and fails fast:
//! unknown/inactive code, then not-yet-active, then expired, then
//! below-minimum-order, then usage limit. The computed discount is capped by
//! `max_discount` (percentage coupons) and finally clamped to the order total
//! so a coupon can never refund more than was charged.

use std::fmt;

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    discounts::{DiscountError, percent_of_minor},
    offers::{budget::UsageBudget, window::{ActivityWindow, WindowState}},
};

/// A coupon code, unique and matched case-insensitively.
///
/// Codes are normalized to lowercase on construction, so lookups and
/// comparisons are case-insensitive by design.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CouponCode(String);

impl CouponCode {
    /// Create a code, normalizing it to lowercase.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().to_lowercase())
    }

    /// The normalized code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a coupon reduces the order total.
#[derive(Debug, Copy, Clone)]
pub enum CouponDiscount<'a> {
    /// Percentage of the order total, rounded half away from zero.
    PercentageOff(Percentage),

    /// Fixed amount off the order total.
    AmountOff(Money<'a, Currency>),
}

/// Reasons a coupon fails to apply, in validation order.
#[derive(Debug, Error)]
pub enum CouponError<'a> {
    /// Unknown code or the coupon has been deactivated.
    #[error("coupon is invalid")]
    Invalid,

    /// The coupon's window has not opened yet.
    #[error("coupon is not active yet")]
    NotYetActive,

    /// The coupon's window has closed.
    #[error("coupon has expired")]
    Expired,

    /// The order total is below the coupon's minimum.
    #[error("order total is below the minimum order value of {0}")]
    BelowMinimumOrder(Money<'a, Currency>),

    /// The coupon has been redeemed as many times as allowed.
    #[error("coupon usage limit reached")]
    UsageLimitReached,

    /// Discount arithmetic failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// A coupon rule as defined in the offer store.
#[derive(Debug, Clone)]
pub struct Coupon<'a> {
    code: CouponCode,
    discount: CouponDiscount<'a>,
    max_discount: Option<Money<'a, Currency>>,
    min_order_value: Option<Money<'a, Currency>>,
    window: ActivityWindow,
    budget: UsageBudget,
    is_active: bool,
}

impl<'a> Coupon<'a> {
    /// Create an active coupon with no window, minimum, cap or usage limit.
    pub fn new(code: CouponCode, discount: CouponDiscount<'a>) -> Self {
        Self {
            code,
            discount,
            max_discount: None,
            min_order_value: None,
            window: ActivityWindow::always(),
            budget: UsageBudget::unlimited(),
            is_active: true,
        }
    }

    /// Cap the discount a percentage coupon may grant.
    #[must_use]
    pub const fn with_max_discount(mut self, max_discount: Money<'a, Currency>) -> Self {
        self.max_discount = Some(max_discount);
        self
    }

    /// Require a minimum order total before the coupon applies.
    #[must_use]
    pub const fn with_min_order_value(mut self, min_order_value: Money<'a, Currency>) -> Self {
        self.min_order_value = Some(min_order_value);
        self
    }

    /// Restrict the coupon to an activity window.
    #[must_use]
    pub const fn with_window(mut self, window: ActivityWindow) -> Self {
        self.window = window;
        self
    }

    /// Restrict the coupon to a usage budget.
    #[must_use]
    pub const fn with_budget(mut self, budget: UsageBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Deactivate the coupon.
    #[must_use]
    pub const fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// The coupon's normalized code.
    pub const fn code(&self) -> &CouponCode {
        &self.code
    }

    /// The discount configuration.
    pub const fn discount(&self) -> &CouponDiscount<'a> {
        &self.discount
    }

    /// The usage budget.
    pub const fn budget(&self) -> &UsageBudget {
        &self.budget
    }

    /// Mutable access to the usage budget, for the offer store's counters.
    pub const fn budget_mut(&mut self) -> &mut UsageBudget {
        &mut self.budget
    }

    /// Whether the coupon is live.
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Evaluate the coupon against an order total at a point in time.
    ///
    /// Returns the discount amount, already capped by `max_discount` and
    /// clamped to the order total. The caller owns incrementing the usage
    /// counter once the order completes.
    ///
    /// # Errors
    ///
    /// Returns the first failing check as a [`CouponError`], in the order:
    /// inactive, not yet active, expired, below minimum order, usage limit.
    pub fn apply(
        &self,
        order_total: Money<'a, Currency>,
        now: Timestamp,
    ) -> Result<Money<'a, Currency>, CouponError<'a>> {
        if !self.is_active {
            return Err(CouponError::Invalid);
        }

        match self.window.state(now) {
            WindowState::NotYetActive => return Err(CouponError::NotYetActive),
            WindowState::Expired => return Err(CouponError::Expired),
            WindowState::Active => {}
        }

        if let Some(min_order_value) = self.min_order_value
            && order_total.to_minor_units() < min_order_value.to_minor_units()
        {
            return Err(CouponError::BelowMinimumOrder(min_order_value));
        }

        if self.budget.is_exhausted() {
            return Err(CouponError::UsageLimitReached);
        }

        let total_minor = order_total.to_minor_units();
        let discount_minor = match &self.discount {
            CouponDiscount::PercentageOff(percent) => {
                let raw = percent_of_minor(percent, total_minor)?;
                match self.max_discount {
                    Some(cap) => raw.min(cap.to_minor_units()),
                    None => raw,
                }
            }
            CouponDiscount::AmountOff(amount) => amount.to_minor_units(),
        };

        // A coupon may never make the order negative.
        let clamped = discount_minor.clamp(0, total_minor);

        Ok(Money::from_minor(clamped, order_total.currency()))
    }
}
