//! Buy X Get Y
//!
//! For every `min_qty` units of the condition purchasables in the cart, `reward_qty` units of
//! the reward purchasables are free. The cheapest reward units are given away first.

use serde::Deserialize;
use smallvec::SmallVec;

use crate::{
    discounts::Discount,
    totals::DiscountedCart,
    types::{DiscountEffect, DiscountType, DiscountTypeError, parse_data},
};

#[derive(Debug, Deserialize)]
struct BuyXGetYData {
    min_qty: u32,
    reward_qty: u32,
    #[serde(default)]
    max_reward_qty: Option<u32>,
}

/// Free reward units for every set of condition units
#[derive(Debug, Clone, Copy, Default)]
pub struct BuyXGetY;

impl BuyXGetY {
    /// Identifier discounts use to select this type
    pub const IDENTIFIER: &'static str = "buy_x_get_y";
}

impl DiscountType for BuyXGetY {
    fn identifier(&self) -> &str {
        Self::IDENTIFIER
    }

    fn name(&self) -> &str {
        "Buy X get Y"
    }

    fn apply(
        &self,
        discount: &Discount,
        cart: &DiscountedCart<'_>,
    ) -> Result<DiscountEffect, DiscountTypeError> {
        let data: BuyXGetYData = parse_data(self.identifier(), discount)?;

        if data.min_qty == 0 {
            return Err(DiscountTypeError::InvalidConfiguration(
                "buy_x_get_y min_qty must be at least 1",
            ));
        }

        let condition_qty = cart
            .lines()
            .iter()
            .enumerate()
            .filter(|(_, line)| {
                discount
                    .purchasable_conditions()
                    .any(|condition| line.matches(&condition.purchasable))
            })
            .fold(0_u32, |acc, (idx, _)| {
                acc.saturating_add(cart.paid_quantity(idx))
            });

        let mut free_units = (condition_qty / data.min_qty).saturating_mul(data.reward_qty);

        if let Some(max_reward_qty) = data.max_reward_qty {
            free_units = free_units.min(max_reward_qty);
        }

        let mut rewards: SmallVec<[(usize, i64); 8]> = cart
            .lines()
            .iter()
            .enumerate()
            .filter(|(idx, line)| {
                cart.paid_quantity(*idx) > 0
                    && discount
                        .purchasable_rewards()
                        .any(|reward| line.matches(&reward.purchasable))
            })
            .map(|(idx, line)| (idx, line.unit_price().to_minor_units()))
            .collect();

        rewards.sort_by_key(|(idx, unit_price)| (*unit_price, *idx));

        let mut effect = DiscountEffect::none();

        for (line_idx, unit_price) in rewards {
            if free_units == 0 {
                break;
            }

            let free_quantity = free_units.min(cart.paid_quantity(line_idx));
            let amount = unit_price
                .saturating_mul(i64::from(free_quantity))
                .min(cart.line_total_minor(line_idx))
                .max(0);

            effect = effect.with_free_units(line_idx, free_quantity, amount);
            free_units = free_units.saturating_sub(free_quantity);
        }

        Ok(effect)
    }
}
