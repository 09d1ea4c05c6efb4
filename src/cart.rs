//! Cart
//!
//! Cart lines as the pricing engine sees them: a product reference, a
//! quantity, and the prices captured when the line was added. Lines whose
//! quantity drops below one are removed, never stored as zero.

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    catalog::{CategoryId, ProductId},
    discounts::minor_times_quantity,
};

/// Errors related to cart construction or totals.
#[derive(Debug, Error)]
pub enum CartError {
    /// A line's currency differs from the cart currency (index, line currency, cart currency).
    #[error("line {0} has currency {1}, but the cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A line total overflowed the minor-unit range.
    #[error("line total overflowed")]
    LineTotalOverflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A single product line in a cart.
#[derive(Debug, Clone)]
pub struct CartLine<'a> {
    product_id: ProductId,
    quantity: u32,
    unit_price: Money<'a, Currency>,
    mrp: Option<Money<'a, Currency>>,
    category: Option<CategoryId>,
}

impl<'a> CartLine<'a> {
    /// Create a cart line for a quantity of one product.
    pub const fn new(product_id: ProductId, quantity: u32, unit_price: Money<'a, Currency>) -> Self {
        Self {
            product_id,
            quantity,
            unit_price,
            mrp: None,
            category: None,
        }
    }

    /// Set the struck-through maximum retail price for the line.
    #[must_use]
    pub const fn with_mrp(mut self, mrp: Money<'a, Currency>) -> Self {
        self.mrp = Some(mrp);
        self
    }

    /// Set the category of the line's product.
    #[must_use]
    pub fn with_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    /// The referenced product.
    pub const fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Units of the product in the cart.
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Price per unit captured when the line was added.
    pub const fn unit_price(&self) -> Money<'a, Currency> {
        self.unit_price
    }

    /// MRP per unit, falling back to the unit price when unset.
    pub fn mrp_or_price(&self) -> Money<'a, Currency> {
        self.mrp.unwrap_or(self.unit_price)
    }

    /// Category of the line's product, if known.
    pub const fn category(&self) -> Option<&CategoryId> {
        self.category.as_ref()
    }

    /// Line total at the captured unit price.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineTotalOverflow`] if the total overflows.
    pub fn total(&self) -> Result<Money<'a, Currency>, CartError> {
        let minor = minor_times_quantity(self.unit_price.to_minor_units(), self.quantity)
            .map_err(|_err| CartError::LineTotalOverflow)?;

        Ok(Money::from_minor(minor, self.unit_price.currency()))
    }

    /// Line total at the MRP.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineTotalOverflow`] if the total overflows.
    pub fn mrp_total(&self) -> Result<Money<'a, Currency>, CartError> {
        let minor = minor_times_quantity(self.mrp_or_price().to_minor_units(), self.quantity)
            .map_err(|_err| CartError::LineTotalOverflow)?;

        Ok(Money::from_minor(minor, self.unit_price.currency()))
    }
}

/// A customer's cart, holding one line per product.
#[derive(Debug)]
pub struct Cart<'a> {
    lines: Vec<CartLine<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart in the given currency.
    pub const fn new(currency: &'static Currency) -> Self {
        Self {
            lines: Vec::new(),
            currency,
        }
    }

    /// Create a cart from existing lines.
    ///
    /// Lines with a quantity below one are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CurrencyMismatch`] if any line's currency differs
    /// from the cart currency.
    pub fn with_lines(
        lines: impl Into<Vec<CartLine<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let lines = lines.into();

        lines.iter().enumerate().try_for_each(|(i, line)| {
            let line_currency = line.unit_price().currency();
            if line_currency == currency {
                Ok(())
            } else {
                Err(CartError::CurrencyMismatch(
                    i,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ))
            }
        })?;

        let mut cart = Self {
            lines: Vec::new(),
            currency,
        };
        for line in lines {
            if line.quantity() >= 1 {
                cart.lines.push(line);
            }
        }

        Ok(cart)
    }

    /// Add a line, replacing any existing line for the same product.
    ///
    /// A quantity below one removes the line instead.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CurrencyMismatch`] if the line's currency differs
    /// from the cart currency.
    pub fn upsert_line(&mut self, line: CartLine<'a>) -> Result<(), CartError> {
        let line_currency = line.unit_price().currency();
        if line_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                self.lines.len(),
                line_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        self.remove(line.product_id());
        if line.quantity() >= 1 {
            self.lines.push(line);
        }

        Ok(())
    }

    /// Change the quantity of an existing line. Zero removes the line.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        if quantity < 1 {
            self.remove(product_id);
            return;
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product_id() == product_id)
        {
            line.quantity = quantity;
        }
    }

    /// Remove the line for a product, if present.
    pub fn remove(&mut self, product_id: &ProductId) {
        self.lines.retain(|line| line.product_id() != product_id);
    }

    /// All lines in the cart.
    #[must_use]
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Quantity of a single product across the cart.
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.lines
            .iter()
            .filter(|line| line.product_id() == product_id)
            .map(CartLine::quantity)
            .sum()
    }

    /// Summed quantity of every line belonging to a category.
    ///
    /// Category totals aggregate across lines, so mixed baskets within one
    /// category still qualify for category-triggered offers.
    #[must_use]
    pub fn quantity_in_category(&self, category: &CategoryId) -> u32 {
        self.lines
            .iter()
            .filter(|line| line.category() == Some(category))
            .map(CartLine::quantity)
            .sum()
    }

    /// Subtotal of the cart at the captured unit prices.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if a line total overflows or money arithmetic
    /// fails.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, CartError> {
        self.lines
            .iter()
            .try_fold(Money::from_minor(0, self.currency), |acc, line| {
                Ok(acc.add(line.total()?)?)
            })
    }

    /// Total of the cart at MRP prices, the pre-discount reference value.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if a line total overflows or money arithmetic
    /// fails.
    pub fn total_mrp(&self) -> Result<Money<'a, Currency>, CartError> {
        self.lines
            .iter()
            .try_fold(Money::from_minor(0, self.currency), |acc, line| {
                Ok(acc.add(line.mrp_total()?)?)
            })
    }

    /// Number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The currency every line is priced in.
    #[must_use]
    pub const fn currency(&self) -> &'static Currency {
        self.currency
    }
}
