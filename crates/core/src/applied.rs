//! Applied Discounts
//!
//! Records of what each discount took off during a single evaluation.

use rusty_money::{Money, iso::Currency};

use crate::discounts::DiscountKey;

/// What an applied discount was taken off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscountTarget {
    /// A cart line, by index
    Line(usize),

    /// The cart as a whole
    Cart,
}

/// A discount applied to a cart line or to the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartDiscount<'a> {
    /// What the discount was taken off
    pub target: DiscountTarget,

    /// Discount that was applied
    pub discount: DiscountKey,

    /// Amount taken off
    pub amount: Money<'a, Currency>,
}

impl<'a> CartDiscount<'a> {
    /// Create a new applied discount record
    pub fn new(target: DiscountTarget, discount: DiscountKey, amount: Money<'a, Currency>) -> Self {
        Self {
            target,
            discount,
            amount,
        }
    }

    /// Whether this record applies to the given line
    pub fn is_for_line(&self, line_idx: usize) -> bool {
        self.target == DiscountTarget::Line(line_idx)
    }
}
