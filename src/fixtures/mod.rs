//! Fixtures
//!
//! YAML definitions of a catalog snapshot and an offer set, for tests and
//! demos. Prices are strings like `"499 INR"` and percentages strings like
//! `"20%"`, parsed into the engine's money and percentage types.

use std::{fs, path::Path};

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::iso::{Currency, EUR, GBP, INR, USD};
use serde::Deserialize;
use thiserror::Error;

use crate::{catalog::CatalogSnapshot, repository::InMemoryOffers};

pub mod catalog;
pub mod offers;

/// Fixture parsing errors.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files.
    #[error("failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format.
    #[error("invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format.
    #[error("invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// An offer definition is structurally invalid.
    #[error("invalid offer definition: {0}")]
    InvalidOffer(String),
}

/// Top-level fixture document: a catalog and the offers over it.
#[derive(Debug, Deserialize)]
pub struct StoreFixture {
    /// Product catalog definition.
    pub catalog: catalog::CatalogFixture,

    /// Offer set definition.
    #[serde(default)]
    pub offers: offers::OffersFixture,
}

impl StoreFixture {
    /// Parse a fixture document from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Yaml`] when the document is malformed.
    pub fn from_yaml(yaml: &str) -> Result<Self, FixtureError> {
        Ok(serde_norway::from_str(yaml)?)
    }

    /// Read and parse a fixture document from a file.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Io`] or [`FixtureError::Yaml`] on failure.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }

    /// Build the catalog snapshot and in-memory offer set the engine prices
    /// against.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] when a price, percentage, or offer
    /// definition cannot be converted.
    pub fn build(self) -> Result<(CatalogSnapshot<'static>, InMemoryOffers<'static>), FixtureError> {
        let catalog = self.catalog.build()?;
        let offers = self.offers.build()?;

        Ok((catalog, offers))
    }
}

/// Parse a price string (e.g. `"4.99 INR"`) into minor units and currency.
///
/// # Errors
///
/// Returns an error if the string is not `"AMOUNT CURRENCY"`, the amount does
/// not parse as a decimal, or the currency code is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();
    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "expected 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match code {
        "INR" => INR,
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}

/// Parse a percentage string (`"20%"` or `"0.2"`) into a [`Percentage`].
///
/// # Errors
///
/// Returns [`FixtureError::InvalidPercentage`] when the string does not parse.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    if let Some(percent) = trimmed.strip_suffix('%') {
        let value = percent
            .trim()
            .parse::<f64>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value / 100.0))
    } else {
        let value = trimmed
            .parse::<f64>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value))
    }
}
