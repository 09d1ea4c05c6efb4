//! Offer fixtures

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;

use crate::{
    catalog::{CategoryId, ProductId},
    discounts::SimpleDiscount,
    fixtures::{FixtureError, parse_percentage, parse_price},
    offers::{
        OfferId,
        budget::UsageBudget,
        bxgy::{BxgyOffer, BxgyReward, BxgyTarget, BxgyTrigger},
        coupon::{Coupon, CouponCode, CouponDiscount},
        flash_sale::{FlashSale, FlashSaleProduct},
        window::ActivityWindow,
    },
    repository::InMemoryOffers,
};

const fn default_active() -> bool {
    true
}

/// Offers section of a fixture document.
#[derive(Debug, Default, Deserialize)]
pub struct OffersFixture {
    /// Coupon definitions.
    #[serde(default)]
    pub coupons: Vec<CouponFixture>,

    /// BXGY offer definitions.
    #[serde(default)]
    pub bxgy: Vec<BxgyFixture>,

    /// Flash sale definitions.
    #[serde(default)]
    pub flash_sales: Vec<FlashSaleFixture>,
}

/// One coupon definition.
#[derive(Debug, Deserialize)]
pub struct CouponFixture {
    /// Coupon code, matched case-insensitively.
    pub code: String,

    /// `"20%"` for a percentage, `"200 INR"` for a fixed amount off.
    pub discount: String,

    /// Optional cap on a percentage discount.
    pub max_discount: Option<String>,

    /// Optional minimum order total.
    pub min_order_value: Option<String>,

    /// Optional window open.
    pub valid_from: Option<Timestamp>,

    /// Optional window close.
    pub valid_until: Option<Timestamp>,

    /// Optional total redemption cap.
    pub usage_limit: Option<u32>,

    /// Redemptions recorded so far.
    #[serde(default)]
    pub usage_count: u32,

    /// Whether the coupon is live.
    #[serde(default = "default_active")]
    pub active: bool,
}

/// One BXGY offer definition. Exactly one `buy_*` and one `get_*` field must
/// be set.
#[derive(Debug, Deserialize)]
pub struct BxgyFixture {
    /// Storage id of the offer.
    pub id: String,

    /// Trigger product id.
    pub buy_product: Option<String>,

    /// Trigger category id.
    pub buy_category: Option<String>,

    /// Units required to qualify.
    pub buy_quantity: u32,

    /// Target product id.
    pub get_product: Option<String>,

    /// Target category id.
    pub get_category: Option<String>,

    /// Units the reward covers.
    pub get_quantity: u32,

    /// `"free"`, `"50%"`, or `"20 INR"` off each target unit.
    pub reward: String,

    /// Optional window open.
    pub starts_at: Option<Timestamp>,

    /// Optional window close.
    pub ends_at: Option<Timestamp>,

    /// Optional total redemption cap.
    pub max_uses: Option<u32>,

    /// Redemptions recorded so far.
    #[serde(default)]
    pub current_uses: u32,

    /// Optional per-customer redemption cap.
    pub usage_per_customer: Option<u32>,

    /// Whether the offer is live.
    #[serde(default = "default_active")]
    pub active: bool,
}

/// One flash sale definition.
#[derive(Debug, Deserialize)]
pub struct FlashSaleFixture {
    /// Storage id of the sale.
    pub id: String,

    /// Sale-level discount: `"10%"` or `"50 INR"` off.
    pub discount: String,

    /// Window open.
    pub starts_at: Timestamp,

    /// Window close.
    pub ends_at: Timestamp,

    /// Optional total redemption cap.
    pub max_uses: Option<u32>,

    /// Redemptions recorded so far.
    #[serde(default)]
    pub current_uses: u32,

    /// Products listed in the sale.
    pub products: Vec<FlashSaleProductFixture>,

    /// Whether the sale is live.
    #[serde(default = "default_active")]
    pub active: bool,
}

/// One product entry in a flash sale definition.
#[derive(Debug, Deserialize)]
pub struct FlashSaleProductFixture {
    /// Listed product id.
    pub product: String,

    /// Optional exact sale unit price.
    pub special_price: Option<String>,

    /// Optional per-user unit cap.
    pub max_per_user: Option<u32>,
}

fn parse_money(s: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let (minor, currency) = parse_price(s)?;
    Ok(Money::from_minor(minor, currency))
}

/// Parse a discount string: a percentage when it ends in `%`, otherwise a
/// fixed amount off.
fn parse_simple_discount(s: &str) -> Result<SimpleDiscount<'static>, FixtureError> {
    if s.trim_end().ends_with('%') {
        Ok(SimpleDiscount::PercentageOff(parse_percentage(s)?))
    } else {
        Ok(SimpleDiscount::AmountOff(parse_money(s)?))
    }
}

impl TryFrom<CouponFixture> for Coupon<'static> {
    type Error = FixtureError;

    fn try_from(fixture: CouponFixture) -> Result<Self, Self::Error> {
        let discount = if fixture.discount.trim_end().ends_with('%') {
            CouponDiscount::PercentageOff(parse_percentage(&fixture.discount)?)
        } else {
            CouponDiscount::AmountOff(parse_money(&fixture.discount)?)
        };

        let mut coupon = Self::new(CouponCode::new(&fixture.code), discount)
            .with_window(ActivityWindow::new(fixture.valid_from, fixture.valid_until))
            .with_budget(UsageBudget::with_usage(
                fixture.usage_limit,
                fixture.usage_count,
            ));

        if let Some(max_discount) = &fixture.max_discount {
            coupon = coupon.with_max_discount(parse_money(max_discount)?);
        }
        if let Some(min_order_value) = &fixture.min_order_value {
            coupon = coupon.with_min_order_value(parse_money(min_order_value)?);
        }
        if !fixture.active {
            coupon = coupon.deactivated();
        }

        Ok(coupon)
    }
}

impl TryFrom<BxgyFixture> for BxgyOffer<'static> {
    type Error = FixtureError;

    fn try_from(fixture: BxgyFixture) -> Result<Self, Self::Error> {
        let trigger = match (&fixture.buy_product, &fixture.buy_category) {
            (Some(product), None) => BxgyTrigger::Product {
                product_id: ProductId::new(product),
                quantity: fixture.buy_quantity,
            },
            (None, Some(category)) => BxgyTrigger::Category {
                category_id: CategoryId::new(category),
                quantity: fixture.buy_quantity,
            },
            _ => {
                return Err(FixtureError::InvalidOffer(format!(
                    "offer {}: exactly one of buy_product/buy_category must be set",
                    fixture.id
                )));
            }
        };

        let target = match (&fixture.get_product, &fixture.get_category) {
            (Some(product), None) => BxgyTarget::Product(ProductId::new(product)),
            (None, Some(category)) => BxgyTarget::Category(CategoryId::new(category)),
            _ => {
                return Err(FixtureError::InvalidOffer(format!(
                    "offer {}: exactly one of get_product/get_category must be set",
                    fixture.id
                )));
            }
        };

        let reward = if fixture.reward.trim().eq_ignore_ascii_case("free") {
            BxgyReward::Free
        } else if fixture.reward.trim_end().ends_with('%') {
            BxgyReward::PercentageOff(parse_percentage(&fixture.reward)?)
        } else {
            BxgyReward::AmountOff(parse_money(&fixture.reward)?)
        };

        let mut offer = Self::new(
            OfferId::new(&fixture.id),
            trigger,
            target,
            fixture.get_quantity,
            reward,
        )
        .with_window(ActivityWindow::new(fixture.starts_at, fixture.ends_at))
        .with_budget(UsageBudget::with_usage(
            fixture.max_uses,
            fixture.current_uses,
        ));

        if let Some(usage_per_customer) = fixture.usage_per_customer {
            offer = offer.with_usage_per_customer(usage_per_customer);
        }
        if !fixture.active {
            offer = offer.deactivated();
        }

        Ok(offer)
    }
}

impl TryFrom<FlashSaleFixture> for FlashSale<'static> {
    type Error = FixtureError;

    fn try_from(fixture: FlashSaleFixture) -> Result<Self, Self::Error> {
        let mut products = Vec::with_capacity(fixture.products.len());
        for entry in &fixture.products {
            let mut product = FlashSaleProduct::new(ProductId::new(&entry.product));

            if let Some(special_price) = &entry.special_price {
                product = product.with_special_price(parse_money(special_price)?);
            }
            if let Some(max_per_user) = entry.max_per_user {
                product = product.with_max_quantity_per_user(max_per_user);
            }

            products.push(product);
        }

        let mut sale = Self::new(
            OfferId::new(&fixture.id),
            parse_simple_discount(&fixture.discount)?,
            ActivityWindow::between(fixture.starts_at, fixture.ends_at),
            products,
        )
        .with_budget(UsageBudget::with_usage(
            fixture.max_uses,
            fixture.current_uses,
        ));

        if !fixture.active {
            sale = sale.deactivated();
        }

        Ok(sale)
    }
}

impl OffersFixture {
    /// Build the in-memory offer set.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] when any definition cannot be converted.
    pub fn build(self) -> Result<InMemoryOffers<'static>, FixtureError> {
        let mut offers = InMemoryOffers::new();

        for coupon in self.coupons {
            offers.add_coupon(coupon.try_into()?);
        }
        for offer in self.bxgy {
            offers.add_bxgy_offer(offer.try_into()?);
        }
        for sale in self.flash_sales {
            offers.add_flash_sale(sale.try_into()?);
        }

        Ok(offers)
    }
}
