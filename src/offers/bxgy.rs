//! Buy-X-Get-Y offers
//!
//! A BXGY offer ties a trigger purchase (a quantity of one product, or a
//! summed quantity across one category) to a free or discounted companion
//! item. Offers are not mutually exclusive: every qualifying offer is
//! returned and the aggregator sums their discounts. An offer whose product
//! or category reference dangles is skipped, never fatal to the batch.

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tracing::warn;

use crate::{
    cart::Cart,
    catalog::{CatalogSnapshot, CategoryId, ProductId},
    discounts::{DiscountError, minor_times_quantity, percent_of_minor},
    offers::{OfferId, budget::UsageBudget, window::ActivityWindow},
};

/// What a customer must buy for the offer to qualify.
///
/// Exactly one trigger is set. Category triggers sum quantities across all
/// cart lines in the category, so mixed baskets qualify.
#[derive(Debug, Clone)]
pub enum BxgyTrigger {
    /// A minimum quantity of one product.
    Product {
        /// The product that must be bought.
        product_id: ProductId,

        /// Units required to qualify.
        quantity: u32,
    },

    /// A minimum summed quantity across a category.
    Category {
        /// The category that must be bought from.
        category_id: CategoryId,

        /// Summed units required to qualify.
        quantity: u32,
    },
}

/// What the customer gets when the offer qualifies.
#[derive(Debug, Clone)]
pub enum BxgyTarget {
    /// A specific product.
    Product(ProductId),

    /// The cheapest product of a category.
    Category(CategoryId),
}

/// How the target item is discounted.
#[derive(Debug, Copy, Clone)]
pub enum BxgyReward<'a> {
    /// The target units are free.
    Free,

    /// Percentage off the target units.
    PercentageOff(Percentage),

    /// Fixed amount off each target unit.
    AmountOff(Money<'a, Currency>),
}

/// A Buy-X-Get-Y rule as defined in the offer store.
#[derive(Debug, Clone)]
pub struct BxgyOffer<'a> {
    id: OfferId,
    trigger: BxgyTrigger,
    target: BxgyTarget,
    get_quantity: u32,
    reward: BxgyReward<'a>,
    window: ActivityWindow,
    budget: UsageBudget,
    usage_per_customer: Option<u32>,
    is_active: bool,
}

impl<'a> BxgyOffer<'a> {
    /// Create an active offer with no window or usage caps.
    pub const fn new(
        id: OfferId,
        trigger: BxgyTrigger,
        target: BxgyTarget,
        get_quantity: u32,
        reward: BxgyReward<'a>,
    ) -> Self {
        Self {
            id,
            trigger,
            target,
            get_quantity,
            reward,
            window: ActivityWindow::always(),
            budget: UsageBudget::unlimited(),
            usage_per_customer: None,
            is_active: true,
        }
    }

    /// Restrict the offer to an activity window.
    #[must_use]
    pub const fn with_window(mut self, window: ActivityWindow) -> Self {
        self.window = window;
        self
    }

    /// Restrict the offer to a global usage budget.
    #[must_use]
    pub const fn with_budget(mut self, budget: UsageBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Cap redemptions per customer.
    #[must_use]
    pub const fn with_usage_per_customer(mut self, usage_per_customer: u32) -> Self {
        self.usage_per_customer = Some(usage_per_customer);
        self
    }

    /// Deactivate the offer.
    #[must_use]
    pub const fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// The offer's storage id.
    pub const fn id(&self) -> &OfferId {
        &self.id
    }

    /// The buy trigger.
    pub const fn trigger(&self) -> &BxgyTrigger {
        &self.trigger
    }

    /// The get target.
    pub const fn target(&self) -> &BxgyTarget {
        &self.target
    }

    /// Units of the target the reward covers.
    pub const fn get_quantity(&self) -> u32 {
        self.get_quantity
    }

    /// The reward configuration.
    pub const fn reward(&self) -> &BxgyReward<'a> {
        &self.reward
    }

    /// The global usage budget.
    pub const fn budget(&self) -> &UsageBudget {
        &self.budget
    }

    /// Mutable access to the usage budget, for the offer store's counters.
    pub const fn budget_mut(&mut self) -> &mut UsageBudget {
        &mut self.budget
    }

    /// Per-customer redemption cap, if any.
    pub const fn usage_per_customer(&self) -> Option<u32> {
        self.usage_per_customer
    }

    /// Whether the offer is live.
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Check activity, window, and budget at a point in time.
    #[must_use]
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.is_active && self.window.contains(now) && !self.budget.is_exhausted()
    }

    fn qualifies(&self, cart: &Cart<'a>) -> bool {
        match &self.trigger {
            BxgyTrigger::Product {
                product_id,
                quantity,
            } => cart.quantity_of(product_id) >= *quantity,
            BxgyTrigger::Category {
                category_id,
                quantity,
            } => cart.quantity_in_category(category_id) >= *quantity,
        }
    }

    /// Resolve the target to a concrete product in the catalog.
    ///
    /// Category targets resolve to the cheapest product of the category.
    fn resolve_target(
        &self,
        catalog: &CatalogSnapshot<'a>,
    ) -> Option<(ProductId, Money<'a, Currency>)> {
        match &self.target {
            BxgyTarget::Product(product_id) => catalog
                .product(product_id)
                .map(|product| (product_id.clone(), product.price())),
            BxgyTarget::Category(category_id) => catalog
                .cheapest_in_category(category_id)
                .map(|(product_id, product)| (product_id.clone(), product.price())),
        }
    }

    fn reward_amount(&self, unit_price: Money<'a, Currency>) -> Result<i64, DiscountError> {
        let per_target = match &self.reward {
            BxgyReward::Free => unit_price.to_minor_units(),
            BxgyReward::PercentageOff(percent) => {
                percent_of_minor(percent, unit_price.to_minor_units())?
            }
            BxgyReward::AmountOff(amount) => amount.to_minor_units(),
        };

        Ok(0.max(minor_times_quantity(per_target, self.get_quantity)?))
    }
}

/// One qualifying offer and the discount it grants.
#[derive(Debug)]
pub struct BxgyApplication<'a, 'o> {
    /// The offer that qualified.
    pub offer: &'o BxgyOffer<'a>,

    /// The product the reward resolved to.
    pub product_id: ProductId,

    /// Discount granted by the offer.
    pub discount: Money<'a, Currency>,
}

/// Evaluate every offer against a cart at a point in time.
///
/// Offers that are inactive, out of window, budget-exhausted or unqualified
/// contribute nothing. An offer whose product or category reference is
/// missing from the catalog is skipped with a warning; it never aborts the
/// batch.
pub fn evaluate_bxgy<'a, 'o>(
    cart: &Cart<'a>,
    offers: impl IntoIterator<Item = &'o BxgyOffer<'a>>,
    catalog: &CatalogSnapshot<'a>,
    now: Timestamp,
) -> SmallVec<[BxgyApplication<'a, 'o>; 4]>
where
    'a: 'o,
{
    let mut applications = SmallVec::new();

    for offer in offers {
        if !offer.is_live(now) || !offer.qualifies(cart) {
            continue;
        }

        let Some((product_id, unit_price)) = offer.resolve_target(catalog) else {
            warn!(offer = %offer.id(), "skipping offer with dangling product or category reference");
            continue;
        };

        let discount_minor = match offer.reward_amount(unit_price) {
            Ok(minor) => minor,
            Err(err) => {
                warn!(offer = %offer.id(), error = %err, "skipping offer whose reward could not be computed");
                continue;
            }
        };

        applications.push(BxgyApplication {
            offer,
            product_id,
            discount: Money::from_minor(discount_minor, unit_price.currency()),
        });
    }

    applications
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use crate::{cart::CartLine, catalog::Product};

    use super::*;

    fn epoch() -> Timestamp {
        Timestamp::UNIX_EPOCH
    }

    fn catalog<'a>() -> CatalogSnapshot<'a> {
        let mut catalog = CatalogSnapshot::new();
        catalog.insert(
            ProductId::new("a"),
            Product::new(Money::from_minor(200, INR), 10),
        );
        catalog.insert(
            ProductId::new("b"),
            Product::new(Money::from_minor(150, INR), 10),
        );
        catalog.insert(
            ProductId::new("tea"),
            Product::new(Money::from_minor(120, INR), 10)
                .with_category(CategoryId::new("beverages")),
        );
        catalog.insert(
            ProductId::new("coffee"),
            Product::new(Money::from_minor(180, INR), 10)
                .with_category(CategoryId::new("beverages")),
        );

        catalog
    }

    fn buy_two_a_get_one_b_free() -> BxgyOffer<'static> {
        BxgyOffer::new(
            OfferId::new("b2g1"),
            BxgyTrigger::Product {
                product_id: ProductId::new("a"),
                quantity: 2,
            },
            BxgyTarget::Product(ProductId::new("b")),
            1,
            BxgyReward::Free,
        )
    }

    #[test]
    fn product_trigger_grants_free_target() -> TestResult {
        let cart = Cart::with_lines(
            [
                CartLine::new(ProductId::new("a"), 2, Money::from_minor(200, INR)),
                CartLine::new(ProductId::new("b"), 1, Money::from_minor(150, INR)),
            ],
            INR,
        )?;
        let offers = [buy_two_a_get_one_b_free()];

        let applications = evaluate_bxgy(&cart, &offers, &catalog(), epoch());

        assert_eq!(applications.len(), 1);
        let application = applications.first().ok_or("no application")?;
        assert_eq!(application.discount, Money::from_minor(150, INR));
        assert_eq!(application.product_id, ProductId::new("b"));

        Ok(())
    }

    #[test]
    fn under_quantity_does_not_qualify() -> TestResult {
        let cart = Cart::with_lines(
            [CartLine::new(
                ProductId::new("a"),
                1,
                Money::from_minor(200, INR),
            )],
            INR,
        )?;
        let offers = [buy_two_a_get_one_b_free()];

        let applications = evaluate_bxgy(&cart, &offers, &catalog(), epoch());

        assert!(applications.is_empty());

        Ok(())
    }

    #[test]
    fn category_trigger_sums_across_lines() -> TestResult {
        let beverages = CategoryId::new("beverages");
        let cart = Cart::with_lines(
            [
                CartLine::new(ProductId::new("tea"), 2, Money::from_minor(120, INR))
                    .with_category(beverages.clone()),
                CartLine::new(ProductId::new("coffee"), 1, Money::from_minor(180, INR))
                    .with_category(beverages.clone()),
            ],
            INR,
        )?;
        let offers = [BxgyOffer::new(
            OfferId::new("bev3"),
            BxgyTrigger::Category {
                category_id: beverages,
                quantity: 3,
            },
            BxgyTarget::Product(ProductId::new("b")),
            1,
            BxgyReward::PercentageOff(Percentage::from(0.5)),
        )];

        let applications = evaluate_bxgy(&cart, &offers, &catalog(), epoch());

        assert_eq!(applications.len(), 1);
        // 50% of 150
        let application = applications.first().ok_or("no application")?;
        assert_eq!(application.discount, Money::from_minor(75, INR));

        Ok(())
    }

    #[test]
    fn category_target_resolves_to_cheapest_product() -> TestResult {
        let cart = Cart::with_lines(
            [CartLine::new(
                ProductId::new("a"),
                2,
                Money::from_minor(200, INR),
            )],
            INR,
        )?;
        let offers = [BxgyOffer::new(
            OfferId::new("bevfree"),
            BxgyTrigger::Product {
                product_id: ProductId::new("a"),
                quantity: 2,
            },
            BxgyTarget::Category(CategoryId::new("beverages")),
            1,
            BxgyReward::Free,
        )];

        let applications = evaluate_bxgy(&cart, &offers, &catalog(), epoch());

        assert_eq!(applications.len(), 1);
        let application = applications.first().ok_or("no application")?;
        assert_eq!(application.product_id, ProductId::new("tea"));
        assert_eq!(application.discount, Money::from_minor(120, INR));

        Ok(())
    }

    #[test]
    fn dangling_reference_skips_offer_only() -> TestResult {
        let cart = Cart::with_lines(
            [
                CartLine::new(ProductId::new("a"), 2, Money::from_minor(200, INR)),
                CartLine::new(ProductId::new("b"), 1, Money::from_minor(150, INR)),
            ],
            INR,
        )?;
        let offers = [
            BxgyOffer::new(
                OfferId::new("dangling"),
                BxgyTrigger::Product {
                    product_id: ProductId::new("a"),
                    quantity: 2,
                },
                BxgyTarget::Product(ProductId::new("discontinued")),
                1,
                BxgyReward::Free,
            ),
            buy_two_a_get_one_b_free(),
        ];

        let applications = evaluate_bxgy(&cart, &offers, &catalog(), epoch());

        assert_eq!(applications.len(), 1, "good offer should still apply");

        Ok(())
    }

    #[test]
    fn multiple_qualifying_offers_all_returned() -> TestResult {
        let cart = Cart::with_lines(
            [CartLine::new(
                ProductId::new("a"),
                3,
                Money::from_minor(200, INR),
            )],
            INR,
        )?;
        let offers = [
            buy_two_a_get_one_b_free(),
            BxgyOffer::new(
                OfferId::new("b3-amount"),
                BxgyTrigger::Product {
                    product_id: ProductId::new("a"),
                    quantity: 3,
                },
                BxgyTarget::Product(ProductId::new("b")),
                2,
                BxgyReward::AmountOff(Money::from_minor(20, INR)),
            ),
        ];

        let applications = evaluate_bxgy(&cart, &offers, &catalog(), epoch());

        assert_eq!(applications.len(), 2);
        let total: i64 = applications
            .iter()
            .map(|application| application.discount.to_minor_units())
            .sum();
        // 150 free + 2 * 20 off
        assert_eq!(total, 190);

        Ok(())
    }

    #[test]
    fn exhausted_budget_is_skipped() -> TestResult {
        let cart = Cart::with_lines(
            [CartLine::new(
                ProductId::new("a"),
                2,
                Money::from_minor(200, INR),
            )],
            INR,
        )?;
        let offers = [buy_two_a_get_one_b_free().with_budget(UsageBudget::with_usage(Some(1), 1))];

        let applications = evaluate_bxgy(&cart, &offers, &catalog(), epoch());

        assert!(applications.is_empty());

        Ok(())
    }

    #[test]
    fn out_of_window_offer_is_skipped() -> TestResult {
        let cart = Cart::with_lines(
            [CartLine::new(
                ProductId::new("a"),
                2,
                Money::from_minor(200, INR),
            )],
            INR,
        )?;
        let offers = [buy_two_a_get_one_b_free().with_window(ActivityWindow::between(
            "2026-06-01T00:00:00Z".parse()?,
            "2026-06-02T00:00:00Z".parse()?,
        ))];

        let applications = evaluate_bxgy(&cart, &offers, &catalog(), "2026-07-01T00:00:00Z".parse()?);

        assert!(applications.is_empty());

        Ok(())
    }
}
