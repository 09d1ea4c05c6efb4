//! Tally
//!
//! Tally is a promotion and cart-pricing engine: given a catalog snapshot, a
//! cart, and the currently-defined offers (coupons, Buy-X-Get-Y offers, and
//! time-boxed flash sales), it computes the order summary a checkout charges.
//!
//! All evaluation is synchronous and side-effect free: the caller fetches
//! catalog and offer data up front and passes it in. The engine's only
//! mutation, offer usage counters, lives behind the
//! [`repository::OfferRepository`] seam.

pub mod cart;
pub mod catalog;
pub mod discounts;
pub mod fixtures;
pub mod loyalty;
pub mod offers;
pub mod payment;
pub mod prelude;
pub mod pricing;
pub mod repository;
