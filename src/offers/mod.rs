//! Offers
//!
//! The three promotional rule variants the engine evaluates: coupons,
//! Buy-X-Get-Y offers, and flash sales. Each variant has its own evaluator;
//! dispatch is by variant, never by inheritance.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod budget;
pub mod bxgy;
pub mod coupon;
pub mod flash_sale;
pub mod window;

/// Identifier of an offer record in the external offer store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OfferId(String);

impl OfferId {
    /// Create an offer id from its storage representation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The storage representation of the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
