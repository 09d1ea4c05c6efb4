//! Catalog snapshot
//!
//! A read-only view of the products a cart references, fetched once by the
//! caller from the product store and passed into the pricing pass. The engine
//! never reaches back to storage; a missing id is surfaced as `None` and
//! promoted to a skipped offer by the evaluators.

use std::fmt;

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

/// Identifier of a product in the external product store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product id from its storage representation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The storage representation of the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a product category in the external product store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(String);

impl CategoryId {
    /// Create a category id from its storage representation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The storage representation of the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A product as seen by the pricing engine.
#[derive(Debug, Clone)]
pub struct Product<'a> {
    price: Money<'a, Currency>,
    mrp: Option<Money<'a, Currency>>,
    stock_quantity: u32,
    category: Option<CategoryId>,
}

impl<'a> Product<'a> {
    /// Create a product with a selling price and stock level.
    pub const fn new(price: Money<'a, Currency>, stock_quantity: u32) -> Self {
        Self {
            price,
            mrp: None,
            stock_quantity,
            category: None,
        }
    }

    /// Set the maximum retail price shown struck through.
    #[must_use]
    pub const fn with_mrp(mut self, mrp: Money<'a, Currency>) -> Self {
        self.mrp = Some(mrp);
        self
    }

    /// Set the category the product belongs to.
    #[must_use]
    pub fn with_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    /// Current selling price.
    pub const fn price(&self) -> Money<'a, Currency> {
        self.price
    }

    /// Maximum retail price, falling back to the selling price when unset.
    pub fn mrp_or_price(&self) -> Money<'a, Currency> {
        self.mrp.unwrap_or(self.price)
    }

    /// Units currently in stock.
    pub const fn stock_quantity(&self) -> u32 {
        self.stock_quantity
    }

    /// Category the product belongs to, if any.
    pub const fn category(&self) -> Option<&CategoryId> {
        self.category.as_ref()
    }
}

/// Keyed snapshot of every product a pricing pass may reference.
#[derive(Debug, Default)]
pub struct CatalogSnapshot<'a> {
    products: FxHashMap<ProductId, Product<'a>>,
}

impl<'a> CatalogSnapshot<'a> {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product to the snapshot, replacing any previous entry.
    pub fn insert(&mut self, id: ProductId, product: Product<'a>) {
        self.products.insert(id, product);
    }

    /// Look up a product by id.
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product<'a>> {
        self.products.get(id)
    }

    /// Iterate over the products belonging to a category.
    pub fn products_in_category<'c>(
        &'c self,
        category: &'c CategoryId,
    ) -> impl Iterator<Item = (&'c ProductId, &'c Product<'a>)> {
        self.products
            .iter()
            .filter(move |(_, product)| product.category() == Some(category))
    }

    /// The cheapest product in a category, if the category has any products.
    #[must_use]
    pub fn cheapest_in_category(
        &self,
        category: &CategoryId,
    ) -> Option<(&ProductId, &Product<'a>)> {
        self.products
            .iter()
            .filter(|(_, product)| product.category() == Some(category))
            .min_by_key(|(_, product)| product.price().to_minor_units())
    }

    /// Number of products in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
