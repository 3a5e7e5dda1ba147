//! Discount Engine
//!
//! Holds the registered discount types and applies eligible discounts to a cart.

use std::sync::Arc;

use rusty_money::Money;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    applied::{CartDiscount, DiscountTarget},
    cart::Cart,
    discounts::DiscountCatalog,
    evaluation::Evaluation,
    totals::DiscountedCart,
    types::{
        Adjustment, AmountOff, BuyXGetY, DiscountType, DiscountTypeError, DiscountTypes,
        discount_type,
    },
};

/// Errors raised while applying discounts.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A discount names a type that is not registered.
    #[error("Discount type not registered: {0}")]
    StrategyNotFound(String),

    /// A discount type failed to compute its effect.
    #[error("Discount {handle} could not be applied: {source}")]
    Strategy {
        /// Handle of the failing discount
        handle: String,

        /// Strategy error
        #[source]
        source: DiscountTypeError,
    },
}

/// Discount Engine
#[derive(Debug, Clone)]
pub struct DiscountEngine {
    types: DiscountTypes,
}

impl Default for DiscountEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscountEngine {
    /// Engine with the built-in discount types registered.
    pub fn new() -> Self {
        let mut engine = Self::empty();

        engine.add_type(AmountOff).add_type(BuyXGetY);

        engine
    }

    /// Engine with no discount types registered.
    pub fn empty() -> Self {
        Self {
            types: DiscountTypes::new(),
        }
    }

    /// Registered discount types, in registration order
    pub fn get_types(&self) -> &[Arc<dyn DiscountType>] {
        self.types.types()
    }

    /// Register a discount type, replacing any type with the same identifier.
    pub fn add_type<T>(&mut self, strategy: T) -> &mut Self
    where
        T: DiscountType + 'static,
    {
        self.types.add(discount_type(strategy));
        self
    }

    /// Apply the discounts eligible in `evaluation` to `cart`.
    ///
    /// Discounts are applied in priority order against the running totals, so later discounts
    /// see what earlier ones took off. Every non-zero adjustment is recorded on the evaluation.
    /// A discount with `stop` set that changes the cart ends evaluation.
    ///
    /// # Errors
    ///
    /// - [`EngineError::StrategyNotFound`] if an eligible discount names an unregistered type.
    /// - [`EngineError::Strategy`] if a discount type fails.
    #[instrument(
        name = "engine.apply",
        skip_all,
        fields(lines = cart.len(), currency = cart.currency().iso_alpha_code)
    )]
    pub fn apply<'a>(
        &self,
        evaluation: &mut Evaluation<'a>,
        catalog: &DiscountCatalog,
        cart: &Cart<'a>,
    ) -> Result<DiscountedCart<'a>, EngineError> {
        let mut discounted = DiscountedCart::new(cart);
        let currency = cart.currency();

        for discount in evaluation.get_discounts(catalog, Some(cart)) {
            let strategy = self
                .types
                .get(discount.kind())
                .ok_or_else(|| EngineError::StrategyNotFound(discount.kind().to_string()))?;

            let effect = strategy
                .apply(discount, &discounted)
                .map_err(|source| EngineError::Strategy {
                    handle: discount.handle().to_string(),
                    source,
                })?;

            let mut changed = false;

            for adjustment in effect.adjustments() {
                let (target, (amount, free_quantity)) = match *adjustment {
                    Adjustment::Line {
                        line_idx,
                        amount,
                        free_quantity,
                    } => (
                        DiscountTarget::Line(line_idx),
                        discounted.discount_line(line_idx, amount, free_quantity),
                    ),
                    Adjustment::Cart { amount } => {
                        (DiscountTarget::Cart, (discounted.discount_cart(amount), 0))
                    }
                };

                if amount == 0 && free_quantity == 0 {
                    continue;
                }

                changed = true;

                if amount != 0 {
                    evaluation.add_applied(CartDiscount::new(
                        target,
                        discount.key(),
                        Money::from_minor(amount, currency),
                    ));
                }
            }

            debug!(
                handle = discount.handle(),
                kind = discount.kind(),
                changed,
                "applied discount"
            );

            if changed && discount.stop() {
                debug!(handle = discount.handle(), "stopping after discount");
                break;
            }
        }

        Ok(discounted)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rusty_money::iso::GBP;
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        cart::CartLine,
        discounts::Discount,
        products::{ProductKey, VariantKey},
        types::DiscountEffect,
    };

    use super::*;

    fn now() -> Result<Timestamp, jiff::Error> {
        "2024-06-01T12:00:00Z".parse()
    }

    fn cart<'a>() -> Result<Cart<'a>, crate::cart::CartError> {
        Cart::with_lines(
            [CartLine::new(
                ProductKey::default(),
                VariantKey::default(),
                Money::from_minor(1_000, GBP),
                1,
            )],
            GBP,
        )
    }

    #[derive(Debug)]
    struct CartLevel(i64);

    impl DiscountType for CartLevel {
        fn identifier(&self) -> &str {
            "cart_level"
        }

        fn name(&self) -> &str {
            "Cart level"
        }

        fn apply(
            &self,
            _discount: &Discount,
            _cart: &DiscountedCart<'_>,
        ) -> Result<DiscountEffect, DiscountTypeError> {
            Ok(DiscountEffect::none().with_cart(self.0))
        }
    }

    #[test]
    fn new_registers_built_in_types() {
        let engine = DiscountEngine::new();
        let identifiers: Vec<&str> = engine.get_types().iter().map(|t| t.identifier()).collect();

        assert_eq!(identifiers, ["amount_off", "buy_x_get_y"]);
        assert!(DiscountEngine::empty().get_types().is_empty());
    }

    #[test]
    fn add_type_replaces_existing_identifier() {
        let mut engine = DiscountEngine::new();

        engine.add_type(AmountOff);

        assert_eq!(engine.get_types().len(), 2);
    }

    #[test]
    fn unregistered_type_fails_at_apply_time() -> TestResult {
        let now = now()?;
        let mut catalog = DiscountCatalog::new();

        catalog.insert(
            Discount::new("Mystery", "mystery", "mystery")
                .with_starts_at(now)
                .with_data(json!({})),
        );

        let engine = DiscountEngine::empty();
        let cart = cart()?;
        let mut evaluation = Evaluation::new(now);

        assert_eq!(evaluation.get_discounts(&catalog, Some(&cart)).len(), 1);

        let result = engine.apply(&mut evaluation, &catalog, &cart);

        assert!(matches!(result, Err(EngineError::StrategyNotFound(kind)) if kind == "mystery"));

        Ok(())
    }

    #[test]
    fn strategy_errors_name_the_discount() -> TestResult {
        let now = now()?;
        let mut catalog = DiscountCatalog::new();

        catalog.insert(
            Discount::new("Broken", "broken", AmountOff::IDENTIFIER)
                .with_starts_at(now)
                .with_data(json!({ "percentage": 150 })),
        );

        let cart = cart()?;
        let result = DiscountEngine::new().apply(&mut Evaluation::new(now), &catalog, &cart);

        assert!(matches!(result, Err(EngineError::Strategy { handle, .. }) if handle == "broken"));

        Ok(())
    }

    #[test]
    fn cart_level_adjustments_are_recorded_against_the_cart() -> TestResult {
        let now = now()?;
        let mut catalog = DiscountCatalog::new();

        let key = catalog.insert(
            Discount::new("Fiver off", "fiver-off", "cart_level").with_starts_at(now),
        );

        let mut engine = DiscountEngine::empty();
        engine.add_type(CartLevel(500));

        let cart = cart()?;
        let mut evaluation = Evaluation::new(now);
        let discounted = engine.apply(&mut evaluation, &catalog, &cart)?;

        assert_eq!(discounted.total(), Money::from_minor(500, GBP));
        assert_eq!(
            evaluation.get_applied(),
            &[CartDiscount::new(
                DiscountTarget::Cart,
                key,
                Money::from_minor(500, GBP)
            )]
        );

        Ok(())
    }

    #[test]
    fn adjustments_are_clamped_to_what_is_left() -> TestResult {
        let now = now()?;
        let mut catalog = DiscountCatalog::new();

        catalog.insert(Discount::new("Huge", "huge", "cart_level").with_starts_at(now));

        let mut engine = DiscountEngine::empty();
        engine.add_type(CartLevel(50_000));

        let cart = cart()?;
        let mut evaluation = Evaluation::new(now);
        let discounted = engine.apply(&mut evaluation, &catalog, &cart)?;

        assert_eq!(discounted.total(), Money::from_minor(0, GBP));
        assert_eq!(discounted.discount_total(), Money::from_minor(1_000, GBP));

        Ok(())
    }
}
