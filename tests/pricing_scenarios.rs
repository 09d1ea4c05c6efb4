//! End-to-end pricing scenarios through the aggregator.

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rusty_money::{Money, iso::INR};
use testresult::TestResult;

use tally::{
    cart::{Cart, CartLine},
    catalog::{CatalogSnapshot, Product, ProductId},
    offers::{
        OfferId,
        bxgy::{BxgyOffer, BxgyReward, BxgyTarget, BxgyTrigger},
        coupon::{Coupon, CouponCode, CouponDiscount},
    },
    pricing::{PricingConfig, price_cart},
    repository::InMemoryOffers,
};

fn epoch() -> Timestamp {
    Timestamp::UNIX_EPOCH
}

fn config() -> PricingConfig<'static> {
    PricingConfig::new(Money::from_minor(499, INR), Money::from_minor(49, INR))
}

fn single_line_cart(price_minor: i64) -> TestResult<Cart<'static>> {
    Ok(Cart::with_lines(
        [CartLine::new(
            ProductId::new("thing"),
            1,
            Money::from_minor(price_minor, INR),
        )],
        INR,
    )?)
}

#[test]
fn welcome20_takes_twenty_percent() -> TestResult {
    let mut offers = InMemoryOffers::new();
    offers.add_coupon(Coupon::new(
        CouponCode::new("WELCOME20"),
        CouponDiscount::PercentageOff(Percentage::from(0.2)),
    ));

    let summary = price_cart(
        &single_line_cart(1000)?,
        &CatalogSnapshot::new(),
        &offers,
        Some(&CouponCode::new("WELCOME20")),
        &config(),
        epoch(),
    )?;

    // 20% of 1000, free shipping above the threshold.
    assert_eq!(summary.coupon_discount, Money::from_minor(200, INR));
    assert_eq!(summary.shipping, Money::from_minor(0, INR));
    assert_eq!(summary.total, Money::from_minor(800, INR));
    assert_eq!(summary.applied_coupon, Some(CouponCode::new("welcome20")));

    Ok(())
}

#[test]
fn shipping_threshold_scenarios() -> TestResult {
    let offers = InMemoryOffers::new();
    let catalog = CatalogSnapshot::new();

    let below = price_cart(
        &single_line_cart(300)?,
        &catalog,
        &offers,
        None,
        &config(),
        epoch(),
    )?;
    let above = price_cart(
        &single_line_cart(500)?,
        &catalog,
        &offers,
        None,
        &config(),
        epoch(),
    )?;

    assert_eq!(below.shipping, Money::from_minor(49, INR));
    assert_eq!(above.shipping, Money::from_minor(0, INR));

    Ok(())
}

#[test]
fn below_minimum_coupon_is_rejected_with_reason() -> TestResult {
    let mut offers = InMemoryOffers::new();
    offers.add_coupon(
        Coupon::new(
            CouponCode::new("BIGSPENDER"),
            CouponDiscount::PercentageOff(Percentage::from(0.2)),
        )
        .with_min_order_value(Money::from_minor(500, INR)),
    );

    let summary = price_cart(
        &single_line_cart(300)?,
        &CatalogSnapshot::new(),
        &offers,
        Some(&CouponCode::new("bigspender")),
        &config(),
        epoch(),
    )?;

    assert_eq!(summary.coupon_discount, Money::from_minor(0, INR));
    let reason = summary.coupon_rejection.ok_or("expected a rejection")?;
    assert!(
        reason.contains("minimum order value"),
        "reason should name the threshold, got: {reason}"
    );
    // The cart still prices: 300 + 49 shipping.
    assert_eq!(summary.total, Money::from_minor(349, INR));

    Ok(())
}

#[test]
fn buy_two_get_one_free_discounts_the_companion() -> TestResult {
    let mut catalog = CatalogSnapshot::new();
    catalog.insert(
        ProductId::new("a"),
        Product::new(Money::from_minor(200, INR), 10),
    );
    catalog.insert(
        ProductId::new("b"),
        Product::new(Money::from_minor(150, INR), 10),
    );

    let mut offers = InMemoryOffers::new();
    offers.add_bxgy_offer(BxgyOffer::new(
        OfferId::new("b2g1"),
        BxgyTrigger::Product {
            product_id: ProductId::new("a"),
            quantity: 2,
        },
        BxgyTarget::Product(ProductId::new("b")),
        1,
        BxgyReward::Free,
    ));

    let cart = Cart::with_lines(
        [
            CartLine::new(ProductId::new("a"), 2, Money::from_minor(200, INR)),
            CartLine::new(ProductId::new("b"), 1, Money::from_minor(150, INR)),
        ],
        INR,
    )?;

    let summary = price_cart(&cart, &catalog, &offers, None, &config(), epoch())?;

    // Subtotal 550, B free: 550 - 150, free shipping above threshold.
    assert_eq!(summary.bxgy_discount, Money::from_minor(150, INR));
    assert_eq!(summary.bxgy_products, vec![ProductId::new("b")]);
    assert_eq!(summary.total, Money::from_minor(400, INR));

    Ok(())
}

#[test]
fn oversized_fixed_coupon_clamps_to_subtotal() -> TestResult {
    let mut offers = InMemoryOffers::new();
    offers.add_coupon(Coupon::new(
        CouponCode::new("FLAT5000"),
        CouponDiscount::AmountOff(Money::from_minor(5000, INR)),
    ));

    let summary = price_cart(
        &single_line_cart(3000)?,
        &CatalogSnapshot::new(),
        &offers,
        Some(&CouponCode::new("flat5000")),
        &config(),
        epoch(),
    )?;

    assert_eq!(summary.coupon_discount, Money::from_minor(3000, INR));
    assert_eq!(summary.total, Money::from_minor(0, INR));

    Ok(())
}

#[test]
fn removing_a_coupon_restores_the_total_exactly() -> TestResult {
    let mut offers = InMemoryOffers::new();
    offers.add_coupon(Coupon::new(
        CouponCode::new("WELCOME20"),
        CouponDiscount::PercentageOff(Percentage::from(0.2)),
    ));
    let catalog = CatalogSnapshot::new();
    let cart = single_line_cart(1000)?;

    let without = price_cart(&cart, &catalog, &offers, None, &config(), epoch())?;
    let with = price_cart(
        &cart,
        &catalog,
        &offers,
        Some(&CouponCode::new("welcome20")),
        &config(),
        epoch(),
    )?;
    let removed = price_cart(&cart, &catalog, &offers, None, &config(), epoch())?;

    assert_eq!(removed.total, without.total);
    assert_eq!(
        with.total.to_minor_units() + with.coupon_discount.to_minor_units(),
        without.total.to_minor_units()
    );

    Ok(())
}

#[test]
fn totals_never_go_negative() -> TestResult {
    let mut catalog = CatalogSnapshot::new();
    catalog.insert(
        ProductId::new("bonus"),
        Product::new(Money::from_minor(10_000, INR), 5),
    );

    let mut offers = InMemoryOffers::new();
    offers.add_coupon(Coupon::new(
        CouponCode::new("ALL"),
        CouponDiscount::PercentageOff(Percentage::from(1.0)),
    ));
    offers.add_bxgy_offer(BxgyOffer::new(
        OfferId::new("huge"),
        BxgyTrigger::Product {
            product_id: ProductId::new("thing"),
            quantity: 1,
        },
        BxgyTarget::Product(ProductId::new("bonus")),
        1,
        BxgyReward::Free,
    ));

    let summary = price_cart(
        &single_line_cart(300)?,
        &catalog,
        &offers,
        Some(&CouponCode::new("all")),
        &config(),
        epoch(),
    )?;

    assert_eq!(summary.total, Money::from_minor(0, INR));

    Ok(())
}

#[test]
fn summary_invariants_hold() -> TestResult {
    let cart = Cart::with_lines(
        [
            CartLine::new(ProductId::new("a"), 2, Money::from_minor(400, INR))
                .with_mrp(Money::from_minor(500, INR)),
            CartLine::new(ProductId::new("b"), 1, Money::from_minor(300, INR)),
        ],
        INR,
    )?;

    let summary = price_cart(
        &cart,
        &CatalogSnapshot::new(),
        &InMemoryOffers::new(),
        None,
        &config(),
        epoch(),
    )?;

    assert!(
        summary.subtotal.to_minor_units() <= summary.total_mrp.to_minor_units(),
        "subtotal must not exceed the MRP total"
    );
    assert!(
        summary.product_discount.to_minor_units() >= 0,
        "product discount is never negative"
    );
    assert_eq!(
        summary.total.to_minor_units(),
        summary.subtotal.to_minor_units() + summary.shipping.to_minor_units()
            - summary.coupon_discount.to_minor_units()
            - summary.bxgy_discount.to_minor_units()
    );

    Ok(())
}
