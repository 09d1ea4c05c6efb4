//! Cart pricing
//!
//! The single pricing pass a checkout runs: resolve each line's unit price
//! against the live flash sales, sum the line totals, apply at most one
//! coupon and every qualifying BXGY offer, then settle shipping and the
//! final total. The pass is stateless and never aborts on a bad offer: a
//! rejected coupon contributes zero and its reason is surfaced on the
//! summary, so the worst case is a cart priced at full price.

use jiff::Timestamp;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    cart::{Cart, CartError},
    catalog::{CatalogSnapshot, ProductId},
    discounts::DiscountError,
    offers::{
        bxgy::evaluate_bxgy,
        coupon::{CouponCode, CouponError},
        flash_sale::resolve_line_price,
    },
    repository::OfferRepository,
};

/// Errors that abort a pricing pass outright.
///
/// Offer-level failures never appear here; they downgrade to a zero
/// contribution. Only broken money arithmetic is fatal.
#[derive(Debug, Error)]
pub enum PricingError {
    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// A line or discount amount overflowed.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Cart totals could not be computed.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Shipping and discount-ceiling configuration for a pricing pass.
#[derive(Debug, Clone, Copy)]
pub struct PricingConfig<'a> {
    free_shipping_threshold: Money<'a, Currency>,
    shipping_rate: Money<'a, Currency>,
    max_total_discount: Option<Money<'a, Currency>>,
}

impl<'a> PricingConfig<'a> {
    /// Configure the free-shipping threshold and the flat rate below it.
    pub const fn new(
        free_shipping_threshold: Money<'a, Currency>,
        shipping_rate: Money<'a, Currency>,
    ) -> Self {
        Self {
            free_shipping_threshold,
            shipping_rate,
            max_total_discount: None,
        }
    }

    /// Cap the combined coupon and BXGY discount for an order.
    ///
    /// Stacked discounts are additive by default; this makes a ceiling an
    /// explicit business rule instead of an accident.
    #[must_use]
    pub const fn with_max_total_discount(mut self, ceiling: Money<'a, Currency>) -> Self {
        self.max_total_discount = Some(ceiling);
        self
    }

    /// The subtotal at which shipping becomes free.
    pub const fn free_shipping_threshold(&self) -> Money<'a, Currency> {
        self.free_shipping_threshold
    }

    /// The flat shipping rate below the threshold.
    pub const fn shipping_rate(&self) -> Money<'a, Currency> {
        self.shipping_rate
    }
}

/// The priced order a checkout charges and displays.
#[derive(Debug, Clone)]
pub struct OrderSummary<'a> {
    /// Sum of line totals at the effective (flash-sale resolved) unit prices.
    pub subtotal: Money<'a, Currency>,

    /// Sum of line totals at MRP, the pre-discount reference value.
    pub total_mrp: Money<'a, Currency>,

    /// MRP minus subtotal; the saving already baked into the prices.
    pub product_discount: Money<'a, Currency>,

    /// Discount granted by the applied coupon, zero if none applied.
    pub coupon_discount: Money<'a, Currency>,

    /// Summed discount of every qualifying BXGY offer.
    pub bxgy_discount: Money<'a, Currency>,

    /// Shipping charged for the order.
    pub shipping: Money<'a, Currency>,

    /// Amount to charge: `subtotal + shipping - coupon - bxgy`, never below zero.
    pub total: Money<'a, Currency>,

    /// Code of the coupon that applied, if any.
    pub applied_coupon: Option<CouponCode>,

    /// Human-readable reason the requested coupon was rejected, if it was.
    pub coupon_rejection: Option<String>,

    /// Products the BXGY rewards resolved to, for the checkout to honour.
    pub bxgy_products: Vec<ProductId>,
}

fn checked_sum<'a>(
    amounts: impl IntoIterator<Item = i64>,
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, DiscountError> {
    let mut total: i64 = 0;
    for amount in amounts {
        total = total
            .checked_add(amount)
            .ok_or(DiscountError::AmountOverflow)?;
    }

    Ok(Money::from_minor(total, currency))
}

/// Price a cart against the live offers at a point in time.
///
/// The requested coupon code, if any, is looked up case-insensitively; a
/// failed lookup or validation surfaces as [`OrderSummary::coupon_rejection`]
/// while the rest of the cart still prices normally.
///
/// # Errors
///
/// Returns a [`PricingError`] only when money arithmetic itself fails;
/// offer-level problems are absorbed into the summary.
pub fn price_cart<'a>(
    cart: &Cart<'a>,
    catalog: &CatalogSnapshot<'a>,
    offers: &impl OfferRepository<'a>,
    coupon_code: Option<&CouponCode>,
    config: &PricingConfig<'a>,
    now: Timestamp,
) -> Result<OrderSummary<'a>, PricingError> {
    let currency = cart.currency();
    let flash_sales = offers.active_flash_sales(now);

    // Line resolution: effective unit prices, then subtotal and MRP total.
    let mut subtotal = Money::from_minor(0, currency);
    for line in cart.lines() {
        let resolved = resolve_line_price(
            line.product_id(),
            line.unit_price(),
            line.quantity(),
            &flash_sales,
            now,
        );
        subtotal = subtotal.add(resolved.total()?)?;
    }
    let total_mrp = cart.total_mrp()?;

    let product_discount_minor =
        0.max(total_mrp.to_minor_units() - subtotal.to_minor_units());
    let product_discount = Money::from_minor(product_discount_minor, currency);

    // At most one coupon per order.
    let mut applied_coupon = None;
    let mut coupon_rejection = None;
    let mut coupon_discount = Money::from_minor(0, currency);
    if let Some(code) = coupon_code {
        let outcome = offers
            .coupon_by_code(code)
            .ok_or(CouponError::Invalid)
            .and_then(|coupon| coupon.apply(subtotal, now));

        match outcome {
            Ok(discount) => {
                coupon_discount = discount;
                applied_coupon = Some(code.clone());
            }
            Err(reason) => {
                warn!(code = %code, reason = %reason, "coupon rejected");
                coupon_rejection = Some(reason.to_string());
            }
        }
    }

    // Every qualifying BXGY offer stacks.
    let bxgy_offers = offers.active_bxgy_offers(now);
    let applications = evaluate_bxgy(cart, bxgy_offers.iter().copied(), catalog, now);
    let mut bxgy_discount = checked_sum(
        applications
            .iter()
            .map(|application| application.discount.to_minor_units()),
        currency,
    )?;
    let bxgy_products = applications
        .iter()
        .map(|application| application.product_id.clone())
        .collect();

    // Optional ceiling on the stacked discounts; the coupon keeps precedence
    // and the BXGY share is trimmed first.
    if let Some(ceiling) = config.max_total_discount {
        let ceiling_minor = 0.max(ceiling.to_minor_units());
        let coupon_minor = coupon_discount.to_minor_units().min(ceiling_minor);
        let bxgy_minor = bxgy_discount
            .to_minor_units()
            .min(ceiling_minor - coupon_minor);

        coupon_discount = Money::from_minor(coupon_minor, currency);
        bxgy_discount = Money::from_minor(bxgy_minor, currency);
    }

    // Totals.
    let shipping = if subtotal.to_minor_units()
        >= config.free_shipping_threshold.to_minor_units()
    {
        Money::from_minor(0, currency)
    } else {
        config.shipping_rate
    };

    let total_minor = subtotal
        .to_minor_units()
        .checked_add(shipping.to_minor_units())
        .and_then(|minor| minor.checked_sub(coupon_discount.to_minor_units()))
        .and_then(|minor| minor.checked_sub(bxgy_discount.to_minor_units()))
        .ok_or(DiscountError::AmountOverflow)?;
    let total = Money::from_minor(0.max(total_minor), currency);

    debug!(
        subtotal = subtotal.to_minor_units(),
        coupon = coupon_discount.to_minor_units(),
        bxgy = bxgy_discount.to_minor_units(),
        shipping = shipping.to_minor_units(),
        total = total.to_minor_units(),
        "priced cart"
    );

    Ok(OrderSummary {
        subtotal,
        total_mrp,
        product_discount,
        coupon_discount,
        bxgy_discount,
        shipping,
        total,
        applied_coupon,
        coupon_rejection,
        bxgy_products,
    })
}
