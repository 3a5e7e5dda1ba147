//! Amount Off
//!
//! Takes a percentage or a fixed amount off the lines a discount is scoped to.
//!
//! ```yaml
//! type: amount_off
//! data:
//!   percentage: 10        # 10% off each eligible line
//!   min_prices:
//!     GBP: 5000           # only when eligible lines total at least 50.00 GBP
//! ```
//!
//! With `fixed_value: true` the amount for the cart currency is read from `fixed_values` (minor
//! units) and split across eligible lines in proportion to what is left on each.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use smallvec::SmallVec;

use crate::{
    cart::CartLine,
    discounts::Discount,
    pricing::{percent_of_minor, percentage_from_points, split_proportionally},
    totals::DiscountedCart,
    types::{Adjustment, DiscountEffect, DiscountType, DiscountTypeError, parse_data},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AmountOffData {
    fixed_value: bool,
    fixed_values: FxHashMap<String, i64>,
    percentage: Option<Decimal>,
    min_prices: FxHashMap<String, i64>,
}

/// Percentage or fixed amount off eligible lines
#[derive(Debug, Clone, Copy, Default)]
pub struct AmountOff;

impl AmountOff {
    /// Identifier discounts use to select this type
    pub const IDENTIFIER: &'static str = "amount_off";
}

/// Whether a line passes the discount's collection, brand and limitation scoping.
fn is_eligible(discount: &Discount, line: &CartLine<'_>) -> bool {
    let in_collection = discount.collections().is_empty()
        || line
            .collections()
            .iter()
            .any(|collection| discount.collections().contains(collection));

    let of_brand = discount.brands().is_empty()
        || line
            .brand()
            .is_some_and(|brand| discount.brands().contains(&brand));

    let mut limitations = discount.purchasable_limitations().peekable();

    let within_limitations = limitations.peek().is_none()
        || limitations.any(|limitation| line.matches(&limitation.purchasable));

    in_collection && of_brand && within_limitations
}

impl DiscountType for AmountOff {
    fn identifier(&self) -> &str {
        Self::IDENTIFIER
    }

    fn name(&self) -> &str {
        "Amount off"
    }

    fn apply(
        &self,
        discount: &Discount,
        cart: &DiscountedCart<'_>,
    ) -> Result<DiscountEffect, DiscountTypeError> {
        let data: AmountOffData = parse_data(self.identifier(), discount)?;
        let currency = cart.currency().iso_alpha_code;

        let eligible: SmallVec<[(usize, i64); 8]> = cart
            .lines()
            .iter()
            .enumerate()
            .filter(|(_, line)| is_eligible(discount, line))
            .map(|(idx, _)| (idx, cart.line_total_minor(idx)))
            .filter(|(_, remaining)| *remaining > 0)
            .collect();

        let eligible_total = eligible
            .iter()
            .fold(0_i64, |acc, (_, remaining)| acc.saturating_add(*remaining));

        if eligible.is_empty()
            || data
                .min_prices
                .get(currency)
                .is_some_and(|min_price| eligible_total < *min_price)
        {
            return Ok(DiscountEffect::none());
        }

        let mut effect = DiscountEffect::none();

        if data.fixed_value {
            let Some(amount) = data.fixed_values.get(currency) else {
                return Ok(effect);
            };

            let weights: SmallVec<[i64; 8]> =
                eligible.iter().map(|(_, remaining)| *remaining).collect();

            let shares = split_proportionally(*amount, &weights)?;

            for ((line_idx, _), amount) in eligible.iter().zip(shares) {
                if amount > 0 {
                    effect.push(Adjustment::Line {
                        line_idx: *line_idx,
                        amount,
                        free_quantity: 0,
                    });
                }
            }

            return Ok(effect);
        }

        let points = data.percentage.ok_or(DiscountTypeError::InvalidConfiguration(
            "amount_off needs a percentage unless fixed_value is set",
        ))?;

        if points < Decimal::ZERO || points > Decimal::ONE_HUNDRED {
            return Err(DiscountTypeError::InvalidConfiguration(
                "amount_off percentage must be between 0 and 100",
            ));
        }

        let percent = percentage_from_points(points);

        for (line_idx, remaining) in eligible {
            let amount = percent_of_minor(&percent, remaining)?;

            if amount > 0 {
                effect.push(Adjustment::Line {
                    line_idx,
                    amount,
                    free_quantity: 0,
                });
            }
        }

        Ok(effect)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::GBP};
    use serde_json::json;
    use slotmap::SlotMap;
    use testresult::TestResult;

    use crate::{
        cart::Cart,
        products::{BrandKey, CollectionKey, ProductKey, VariantKey},
        purchasables::{DiscountPurchasable, PurchasableRef},
    };

    use super::*;

    struct Keys {
        products: SlotMap<ProductKey, ()>,
        variants: SlotMap<VariantKey, ()>,
    }

    impl Keys {
        fn new() -> Self {
            Self {
                products: SlotMap::with_key(),
                variants: SlotMap::with_key(),
            }
        }

        fn line<'a>(&mut self, minor: i64, quantity: u32) -> CartLine<'a> {
            CartLine::new(
                self.products.insert(()),
                self.variants.insert(()),
                Money::from_minor(minor, GBP),
                quantity,
            )
        }
    }

    fn discount(data: serde_json::Value) -> Discount {
        Discount::new("Sale", "sale", AmountOff::IDENTIFIER).with_data(data)
    }

    fn adjustments(effect: &DiscountEffect) -> Vec<(usize, i64)> {
        effect
            .adjustments()
            .iter()
            .filter_map(|adjustment| match adjustment {
                Adjustment::Line {
                    line_idx, amount, ..
                } => Some((*line_idx, *amount)),
                Adjustment::Cart { .. } => None,
            })
            .collect()
    }

    #[test]
    fn percentage_is_taken_off_each_line_and_rounded() -> TestResult {
        let mut keys = Keys::new();
        let cart = Cart::with_lines([keys.line(25, 1), keys.line(1_000, 2)], GBP)?;

        let effect = AmountOff.apply(
            &discount(json!({ "percentage": 10 })),
            &DiscountedCart::new(&cart),
        )?;

        assert_eq!(adjustments(&effect), [(0, 3), (1, 200)]);

        Ok(())
    }

    #[test]
    fn percentage_applies_to_running_totals() -> TestResult {
        let mut keys = Keys::new();
        let cart = Cart::with_lines([keys.line(1_000, 1)], GBP)?;

        let mut discounted = DiscountedCart::new(&cart);
        discounted.discount_line(0, 500, 0);

        let effect = AmountOff.apply(&discount(json!({ "percentage": "50" })), &discounted)?;

        assert_eq!(adjustments(&effect), [(0, 250)]);

        Ok(())
    }

    #[test]
    fn fixed_value_is_split_without_losing_pennies() -> TestResult {
        let mut keys = Keys::new();
        let cart = Cart::with_lines(
            [keys.line(300, 1), keys.line(300, 1), keys.line(300, 1)],
            GBP,
        )?;

        let effect = AmountOff.apply(
            &discount(json!({ "fixed_value": true, "fixed_values": { "GBP": 100 } })),
            &DiscountedCart::new(&cart),
        )?;

        assert_eq!(adjustments(&effect), [(0, 34), (1, 33), (2, 33)]);

        Ok(())
    }

    #[test]
    fn fixed_value_without_cart_currency_does_nothing() -> TestResult {
        let mut keys = Keys::new();
        let cart = Cart::with_lines([keys.line(300, 1)], GBP)?;

        let effect = AmountOff.apply(
            &discount(json!({ "fixed_value": true, "fixed_values": { "USD": 100 } })),
            &DiscountedCart::new(&cart),
        )?;

        assert!(effect.is_empty());

        Ok(())
    }

    #[test]
    fn minimum_spend_must_be_met() -> TestResult {
        let mut keys = Keys::new();
        let cart = Cart::with_lines([keys.line(4_999, 1)], GBP)?;
        let data = json!({ "percentage": 10, "min_prices": { "GBP": 5_000 } });

        let below = AmountOff.apply(&discount(data.clone()), &DiscountedCart::new(&cart))?;

        assert!(below.is_empty());

        let cart = Cart::with_lines([keys.line(5_000, 1)], GBP)?;
        let met = AmountOff.apply(&discount(data), &DiscountedCart::new(&cart))?;

        assert_eq!(adjustments(&met), [(0, 500)]);

        Ok(())
    }

    #[test]
    fn collections_and_brands_restrict_lines() -> TestResult {
        let mut keys = Keys::new();
        let mut collections = SlotMap::<CollectionKey, ()>::with_key();
        let mut brands = SlotMap::<BrandKey, ()>::with_key();
        let summer = collections.insert(());
        let acme = brands.insert(());

        let cart = Cart::with_lines(
            [
                keys.line(1_000, 1).with_collections([summer]),
                keys.line(1_000, 1).with_brand(acme),
                keys.line(1_000, 1),
            ],
            GBP,
        )?;

        let by_collection = discount(json!({ "percentage": 10 })).with_collection(summer);
        let by_brand = discount(json!({ "percentage": 10 })).with_brand(acme);

        let effect = AmountOff.apply(&by_collection, &DiscountedCart::new(&cart))?;
        assert_eq!(adjustments(&effect), [(0, 100)]);

        let effect = AmountOff.apply(&by_brand, &DiscountedCart::new(&cart))?;
        assert_eq!(adjustments(&effect), [(1, 100)]);

        Ok(())
    }

    #[test]
    fn limitations_restrict_lines() -> TestResult {
        let mut keys = Keys::new();
        let first = keys.line(1_000, 1);
        let limited_to = PurchasableRef::Variant(first.variant());
        let cart = Cart::with_lines([first, keys.line(1_000, 1)], GBP)?;

        let limited = discount(json!({ "percentage": 20 }))
            .with_purchasable(DiscountPurchasable::limitation(limited_to));

        let effect = AmountOff.apply(&limited, &DiscountedCart::new(&cart))?;

        assert_eq!(adjustments(&effect), [(0, 200)]);

        Ok(())
    }

    #[test]
    fn missing_percentage_is_a_configuration_error() -> TestResult {
        let mut keys = Keys::new();
        let cart = Cart::with_lines([keys.line(1_000, 1)], GBP)?;

        let result = AmountOff.apply(&discount(json!({})), &DiscountedCart::new(&cart));

        assert!(matches!(
            result,
            Err(DiscountTypeError::InvalidConfiguration(_))
        ));

        Ok(())
    }

    #[test]
    fn malformed_data_is_rejected() -> TestResult {
        let mut keys = Keys::new();
        let cart = Cart::with_lines([keys.line(1_000, 1)], GBP)?;

        let result = AmountOff.apply(
            &discount(json!({ "fixed_values": "lots" })),
            &DiscountedCart::new(&cart),
        );

        assert!(matches!(result, Err(DiscountTypeError::InvalidData { .. })));

        Ok(())
    }
}
