//! Prelude
//!
//! Re-exports of the types most callers need.

pub use crate::{
    cart::{Cart, CartLine},
    catalog::{CatalogSnapshot, CategoryId, Product, ProductId},
    discounts::SimpleDiscount,
    loyalty::{LedgerEntry, LedgerEntryKind, LoyaltyTier, TierThresholds, summarize_ledger},
    offers::{
        OfferId,
        budget::UsageBudget,
        bxgy::{BxgyOffer, BxgyReward, BxgyTarget, BxgyTrigger, evaluate_bxgy},
        coupon::{Coupon, CouponCode, CouponDiscount, CouponError},
        flash_sale::{FlashSale, FlashSaleProduct, resolve_line_price},
        window::ActivityWindow,
    },
    pricing::{OrderSummary, PricingConfig, price_cart},
    repository::{InMemoryOffers, OfferHandle, OfferRepository},
};
