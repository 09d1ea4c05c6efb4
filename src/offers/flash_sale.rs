//! Flash sales
//!
//! Time-boxed price overrides for specific products. Resolution picks the
//! active sales listing a product, computes each candidate unit price (a
//! per-product special price wins over the sale-level discount), and when
//! several sales overlap the lowest resulting price wins. The per-user
//! quantity cap splits a line instead of rejecting it: units past the cap
//! revert to the base price.

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use tracing::warn;

use crate::{
    catalog::ProductId,
    discounts::{DiscountError, SimpleDiscount, minor_times_quantity},
    offers::{OfferId, budget::UsageBudget, window::ActivityWindow},
};

/// A product's entry in a flash sale.
#[derive(Debug, Clone)]
pub struct FlashSaleProduct<'a> {
    product_id: ProductId,
    special_price: Option<Money<'a, Currency>>,
    max_quantity_per_user: Option<u32>,
}

impl<'a> FlashSaleProduct<'a> {
    /// List a product in a sale at the sale-level discount.
    pub const fn new(product_id: ProductId) -> Self {
        Self {
            product_id,
            special_price: None,
            max_quantity_per_user: None,
        }
    }

    /// Override the sale-level discount with an exact unit price.
    #[must_use]
    pub const fn with_special_price(mut self, special_price: Money<'a, Currency>) -> Self {
        self.special_price = Some(special_price);
        self
    }

    /// Cap the units one customer may buy at the sale price.
    #[must_use]
    pub const fn with_max_quantity_per_user(mut self, max_quantity_per_user: u32) -> Self {
        self.max_quantity_per_user = Some(max_quantity_per_user);
        self
    }

    /// The listed product.
    pub const fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// The exact sale unit price, if one overrides the sale-level discount.
    pub const fn special_price(&self) -> Option<Money<'a, Currency>> {
        self.special_price
    }

    /// The per-user unit cap, if any.
    pub const fn max_quantity_per_user(&self) -> Option<u32> {
        self.max_quantity_per_user
    }
}

/// A flash sale as defined in the offer store.
#[derive(Debug, Clone)]
pub struct FlashSale<'a> {
    id: OfferId,
    discount: SimpleDiscount<'a>,
    window: ActivityWindow,
    budget: UsageBudget,
    products: Vec<FlashSaleProduct<'a>>,
    is_active: bool,
}

impl<'a> FlashSale<'a> {
    /// Create an active sale over a set of product entries.
    pub fn new(
        id: OfferId,
        discount: SimpleDiscount<'a>,
        window: ActivityWindow,
        products: impl Into<Vec<FlashSaleProduct<'a>>>,
    ) -> Self {
        Self {
            id,
            discount,
            window,
            budget: UsageBudget::unlimited(),
            products: products.into(),
            is_active: true,
        }
    }

    /// Restrict the sale to a global usage budget.
    #[must_use]
    pub fn with_budget(mut self, budget: UsageBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Deactivate the sale.
    #[must_use]
    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// The sale's storage id.
    pub const fn id(&self) -> &OfferId {
        &self.id
    }

    /// The usage budget.
    pub const fn budget(&self) -> &UsageBudget {
        &self.budget
    }

    /// Mutable access to the usage budget, for the offer store's counters.
    pub const fn budget_mut(&mut self) -> &mut UsageBudget {
        &mut self.budget
    }

    /// Whether the sale is live.
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Check activity, window, and budget at a point in time.
    #[must_use]
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.is_active && self.window.contains(now) && !self.budget.is_exhausted()
    }

    /// The sale's entry for a product, if listed.
    #[must_use]
    pub fn product_entry(&self, product_id: &ProductId) -> Option<&FlashSaleProduct<'a>> {
        self.products
            .iter()
            .find(|entry| entry.product_id() == product_id)
    }

    /// Compute the sale unit price for an entry, clamped to zero.
    fn sale_unit_price(
        &self,
        entry: &FlashSaleProduct<'a>,
        base_price: Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, DiscountError> {
        match entry.special_price() {
            Some(special) => Ok(Money::from_minor(
                0.max(special.to_minor_units()),
                base_price.currency(),
            )),
            None => self.discount.reduced_price(base_price),
        }
    }
}

/// A cart line's resolved pricing: units at the sale price and units that
/// reverted to the base price past the per-user cap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLinePrice<'a> {
    /// Unit price for the discounted units.
    pub sale_unit_price: Money<'a, Currency>,

    /// Units priced at the sale price.
    pub sale_units: u32,

    /// Unit price for the remaining units.
    pub base_unit_price: Money<'a, Currency>,

    /// Units priced at the base price.
    pub base_units: u32,
}

impl<'a> ResolvedLinePrice<'a> {
    /// All units at the base price, untouched by any sale.
    #[must_use]
    pub const fn full_price(base_unit_price: Money<'a, Currency>, quantity: u32) -> Self {
        Self {
            sale_unit_price: base_unit_price,
            sale_units: 0,
            base_unit_price,
            base_units: quantity,
        }
    }

    /// Whether any unit was discounted by a sale.
    #[must_use]
    pub const fn is_discounted(&self) -> bool {
        self.sale_units > 0
    }

    /// Total for the line across both splits.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::AmountOverflow`] if the total overflows.
    pub fn total(&self) -> Result<Money<'a, Currency>, DiscountError> {
        let sale_minor =
            minor_times_quantity(self.sale_unit_price.to_minor_units(), self.sale_units)?;
        let base_minor =
            minor_times_quantity(self.base_unit_price.to_minor_units(), self.base_units)?;

        let total = sale_minor
            .checked_add(base_minor)
            .ok_or(DiscountError::AmountOverflow)?;

        Ok(Money::from_minor(total, self.base_unit_price.currency()))
    }
}

/// Resolve the effective pricing of a product at a point in time.
///
/// Among the live sales listing the product, the one producing the lowest
/// unit price wins. A sale whose price cannot be computed is skipped with a
/// warning. With no matching sale, every unit stays at the base price.
pub fn resolve_line_price<'a>(
    product_id: &ProductId,
    base_price: Money<'a, Currency>,
    quantity: u32,
    sales: &[&FlashSale<'a>],
    now: Timestamp,
) -> ResolvedLinePrice<'a> {
    let mut best: Option<(Money<'a, Currency>, Option<u32>)> = None;

    for sale in sales {
        if !sale.is_live(now) {
            continue;
        }

        let Some(entry) = sale.product_entry(product_id) else {
            continue;
        };

        let unit_price = match sale.sale_unit_price(entry, base_price) {
            Ok(price) => price,
            Err(err) => {
                warn!(sale = %sale.id(), error = %err, "skipping flash sale whose price could not be computed");
                continue;
            }
        };

        // Overlapping sales: lowest resulting price wins.
        let is_better = best.is_none_or(|(best_price, _)| {
            unit_price.to_minor_units() < best_price.to_minor_units()
        });
        if is_better {
            best = Some((unit_price, entry.max_quantity_per_user()));
        }
    }

    match best {
        Some((sale_unit_price, cap)) => {
            let sale_units = cap.map_or(quantity, |cap| cap.min(quantity));
            ResolvedLinePrice {
                sale_unit_price,
                sale_units,
                base_unit_price: base_price,
                base_units: quantity - sale_units,
            }
        }
        None => ResolvedLinePrice::full_price(base_price, quantity),
    }
}
