//! Discount arithmetic
//!
//! Shared money/percentage math used by the coupon, BXGY and flash-sale
//! evaluators. All calculations are performed in minor units and clamped so a
//! discount can never drive a price below zero.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Minor-unit arithmetic overflowed.
    #[error("monetary amount overflowed")]
    AmountOverflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Discount configuration shared by rule variants that reduce a unit price.
#[derive(Debug, Copy, Clone)]
pub enum SimpleDiscount<'a> {
    /// Reduce the price by a percentage (e.g. "20% off").
    PercentageOff(Percentage),

    /// Subtract a fixed amount from the price (e.g. "₹50 off").
    AmountOff(Money<'a, Currency>),

    /// Replace the price with a fixed amount (e.g. "₹99 each").
    AmountOverride(Money<'a, Currency>),
}

impl<'a> SimpleDiscount<'a> {
    /// Apply the discount to a unit price, clamping the result to zero.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the percentage calculation overflows or
    /// cannot be safely represented.
    pub fn reduced_price(
        &self,
        base: Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, DiscountError> {
        let base_minor = base.to_minor_units();

        let reduced_minor = match self {
            Self::PercentageOff(percent) => base_minor
                .checked_sub(percent_of_minor(percent, base_minor)?)
                .ok_or(DiscountError::AmountOverflow)?,
            Self::AmountOff(amount) => base_minor
                .checked_sub(amount.to_minor_units())
                .ok_or(DiscountError::AmountOverflow)?,
            Self::AmountOverride(amount) => amount.to_minor_units(),
        };

        Ok(Money::from_minor(0.max(reduced_minor), base.currency()))
    }
}

/// Calculate a percentage of a minor-unit amount, rounded half away from zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows
/// or cannot be safely represented.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Multiply a minor-unit amount by a quantity without overflowing.
///
/// # Errors
///
/// Returns [`DiscountError::AmountOverflow`] on overflow.
pub fn minor_times_quantity(minor: i64, quantity: u32) -> Result<i64, DiscountError> {
    minor
        .checked_mul(i64::from(quantity))
        .ok_or(DiscountError::AmountOverflow)
}
