//! Catalog fixtures

use rustc_hash::FxHashMap;
use rusty_money::Money;
use serde::Deserialize;

use crate::{
    catalog::{CatalogSnapshot, CategoryId, Product, ProductId},
    fixtures::{FixtureError, parse_price},
};

/// Catalog section of a fixture document.
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Map of product id to product definition.
    pub products: FxHashMap<String, ProductFixture>,
}

/// One product definition.
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Selling price (e.g. `"299 INR"`).
    pub price: String,

    /// Optional struck-through MRP.
    pub mrp: Option<String>,

    /// Units in stock.
    #[serde(default)]
    pub stock: u32,

    /// Optional category id.
    pub category: Option<String>,
}

impl CatalogFixture {
    /// Build the catalog snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] when a price does not parse.
    pub fn build(self) -> Result<CatalogSnapshot<'static>, FixtureError> {
        let mut snapshot = CatalogSnapshot::new();

        for (id, fixture) in self.products {
            let (price_minor, currency) = parse_price(&fixture.price)?;
            let mut product = Product::new(Money::from_minor(price_minor, currency), fixture.stock);

            if let Some(mrp) = &fixture.mrp {
                let (mrp_minor, mrp_currency) = parse_price(mrp)?;
                product = product.with_mrp(Money::from_minor(mrp_minor, mrp_currency));
            }

            if let Some(category) = fixture.category {
                product = product.with_category(CategoryId::new(category));
            }

            snapshot.insert(ProductId::new(id), product);
        }

        Ok(snapshot)
    }
}
