//! Offer repository boundary
//!
//! The engine never talks to storage directly: the checkout flow fetches the
//! currently-defined offers and hands the engine an [`OfferRepository`]. The
//! one mutating operation, [`OfferRepository::increment_usage_if_below_limit`],
//! is deliberately a conditional update rather than read-then-write, so a
//! storage-backed implementation can map it onto an atomic update or a
//! transaction and two concurrent checkouts cannot both slip past a usage
//! limit.

use jiff::Timestamp;
use rustc_hash::FxHashMap;

use crate::offers::{
    OfferId,
    bxgy::BxgyOffer,
    coupon::{Coupon, CouponCode},
    flash_sale::FlashSale,
};

/// A reference to the offer whose usage counter should move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferHandle {
    /// A coupon, addressed by its normalized code.
    Coupon(CouponCode),

    /// A BXGY offer, addressed by its storage id.
    Bxgy(OfferId),

    /// A flash sale, addressed by its storage id.
    FlashSale(OfferId),
}

/// Read access to the currently-defined offers, plus the single conditional
/// counter update the checkout flow performs on order completion.
pub trait OfferRepository<'a> {
    /// Look up a coupon by its case-insensitive code.
    fn coupon_by_code(&self, code: &CouponCode) -> Option<&Coupon<'a>>;

    /// The BXGY offers live at a point in time.
    fn active_bxgy_offers(&self, now: Timestamp) -> Vec<&BxgyOffer<'a>>;

    /// The flash sales live at a point in time.
    fn active_flash_sales(&self, now: Timestamp) -> Vec<&FlashSale<'a>>;

    /// Record one redemption of an offer if its usage cap allows it.
    ///
    /// Returns `false`, without recording, when the offer is unknown or its
    /// budget is exhausted. Implementations over shared storage must make the
    /// check-and-increment atomic.
    fn increment_usage_if_below_limit(&mut self, offer: &OfferHandle) -> bool;
}

/// In-memory offer set, used by tests and by callers that fetch all offers
/// up front.
#[derive(Debug, Default)]
pub struct InMemoryOffers<'a> {
    coupons: FxHashMap<CouponCode, Coupon<'a>>,
    bxgy_offers: Vec<BxgyOffer<'a>>,
    flash_sales: Vec<FlashSale<'a>>,
}

impl<'a> InMemoryOffers<'a> {
    /// Create an empty offer set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a coupon, replacing any previous coupon with the same code.
    pub fn add_coupon(&mut self, coupon: Coupon<'a>) {
        self.coupons.insert(coupon.code().clone(), coupon);
    }

    /// Add a BXGY offer.
    pub fn add_bxgy_offer(&mut self, offer: BxgyOffer<'a>) {
        self.bxgy_offers.push(offer);
    }

    /// Add a flash sale.
    pub fn add_flash_sale(&mut self, sale: FlashSale<'a>) {
        self.flash_sales.push(sale);
    }
}

impl<'a> OfferRepository<'a> for InMemoryOffers<'a> {
    fn coupon_by_code(&self, code: &CouponCode) -> Option<&Coupon<'a>> {
        self.coupons.get(code)
    }

    fn active_bxgy_offers(&self, now: Timestamp) -> Vec<&BxgyOffer<'a>> {
        self.bxgy_offers
            .iter()
            .filter(|offer| offer.is_live(now))
            .collect()
    }

    fn active_flash_sales(&self, now: Timestamp) -> Vec<&FlashSale<'a>> {
        self.flash_sales
            .iter()
            .filter(|sale| sale.is_live(now))
            .collect()
    }

    fn increment_usage_if_below_limit(&mut self, offer: &OfferHandle) -> bool {
        match offer {
            OfferHandle::Coupon(code) => self
                .coupons
                .get_mut(code)
                .is_some_and(|coupon| coupon.budget_mut().record_use()),
            OfferHandle::Bxgy(id) => self
                .bxgy_offers
                .iter_mut()
                .find(|candidate| candidate.id() == id)
                .is_some_and(|candidate| candidate.budget_mut().record_use()),
            OfferHandle::FlashSale(id) => self
                .flash_sales
                .iter_mut()
                .find(|candidate| candidate.id() == id)
                .is_some_and(|candidate| candidate.budget_mut().record_use()),
        }
    }
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use jiff::Timestamp;
    use rusty_money::{Money, iso::INR};
    use testresult::TestResult;

    use crate::offers::{
        budget::UsageBudget,
        bxgy::{BxgyReward, BxgyTarget, BxgyTrigger},
        coupon::CouponDiscount,
        window::ActivityWindow,
    };
    use crate::{catalog::ProductId, discounts::SimpleDiscount};

    use super::*;

    fn sample_coupon() -> Coupon<'static> {
        Coupon::new(
            CouponCode::new("WELCOME20"),
            CouponDiscount::PercentageOff(Percentage::from(0.2)),
        )
        .with_budget(UsageBudget::with_limit(1))
    }

    #[test]
    fn coupon_lookup_is_case_insensitive() {
        let mut offers = InMemoryOffers::new();
        offers.add_coupon(sample_coupon());

        assert!(offers.coupon_by_code(&CouponCode::new("welcome20")).is_some());
        assert!(offers.coupon_by_code(&CouponCode::new("WeLcOmE20")).is_some());
        assert!(offers.coupon_by_code(&CouponCode::new("other")).is_none());
    }

    #[test]
    fn active_listings_filter_by_window() -> TestResult {
        let mut offers = InMemoryOffers::new();
        offers.add_flash_sale(FlashSale::new(
            OfferId::new("past"),
            SimpleDiscount::PercentageOff(Percentage::from(0.1)),
            ActivityWindow::until("2026-01-01T00:00:00Z".parse()?),
            Vec::new(),
        ));
        offers.add_bxgy_offer(
            BxgyOffer::new(
                OfferId::new("live"),
                BxgyTrigger::Product {
                    product_id: ProductId::new("a"),
                    quantity: 1,
                },
                BxgyTarget::Product(ProductId::new("b")),
                1,
                BxgyReward::Free,
            ),
        );

        let now: Timestamp = "2026-06-01T00:00:00Z".parse()?;

        assert!(offers.active_flash_sales(now).is_empty());
        assert_eq!(offers.active_bxgy_offers(now).len(), 1);

        Ok(())
    }

    #[test]
    fn increment_stops_at_the_limit() {
        let mut offers = InMemoryOffers::new();
        offers.add_coupon(sample_coupon());
        let handle = OfferHandle::Coupon(CouponCode::new("welcome20"));

        assert!(offers.increment_usage_if_below_limit(&handle));
        assert!(
            !offers.increment_usage_if_below_limit(&handle),
            "second redemption should be refused at the cap"
        );
    }

    #[test]
    fn increment_unknown_offer_is_refused() {
        let mut offers = InMemoryOffers::new();

        assert!(!offers.increment_usage_if_below_limit(&OfferHandle::Bxgy(OfferId::new("nope"))));
    }

    #[test]
    fn fixed_coupon_applies_through_repository() -> TestResult {
        let mut offers = InMemoryOffers::new();
        offers.add_coupon(Coupon::new(
            CouponCode::new("flat50"),
            CouponDiscount::AmountOff(Money::from_minor(50, INR)),
        ));

        let coupon = offers
            .coupon_by_code(&CouponCode::new("FLAT50"))
            .ok_or("coupon should be found")?;
        let discount = coupon.apply(Money::from_minor(500, INR), Timestamp::UNIX_EPOCH)?;

        assert_eq!(discount, Money::from_minor(50, INR));

        Ok(())
    }
}
