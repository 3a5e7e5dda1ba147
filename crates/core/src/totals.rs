//! Totals
//!
//! A cart with the discounts applied so far. Strategies read the running totals from it so
//! that discounts compound in evaluation order.

use rusty_money::{Money, iso::Currency};
use smallvec::{SmallVec, smallvec};

use crate::cart::{Cart, CartLine};

/// Cart with running discount totals
#[derive(Debug, Clone)]
pub struct DiscountedCart<'a> {
    cart: Cart<'a>,
    line_discounts: SmallVec<[i64; 8]>,
    free_quantities: SmallVec<[u32; 8]>,
    cart_discount: i64,
}

impl<'a> DiscountedCart<'a> {
    /// Start from an undiscounted cart
    pub fn new(cart: &Cart<'a>) -> Self {
        Self {
            cart: cart.clone(),
            line_discounts: smallvec![0; cart.len()],
            free_quantities: smallvec![0; cart.len()],
            cart_discount: 0,
        }
    }

    /// The underlying cart
    pub fn cart(&self) -> &Cart<'a> {
        &self.cart
    }

    /// Cart currency
    pub fn currency(&self) -> &'static Currency {
        self.cart.currency()
    }

    /// Cart lines
    pub fn lines(&self) -> &[CartLine<'a>] {
        self.cart.lines()
    }

    /// Line subtotal before discounts, in minor units
    pub fn line_subtotal_minor(&self, idx: usize) -> i64 {
        self.cart
            .line(idx)
            .and_then(CartLine::subtotal_minor)
            .unwrap_or_default()
    }

    /// Discount taken off a line, in minor units
    pub fn line_discount_minor(&self, idx: usize) -> i64 {
        self.line_discounts.get(idx).copied().unwrap_or_default()
    }

    /// What is left to pay on a line, in minor units
    pub fn line_total_minor(&self, idx: usize) -> i64 {
        self.line_subtotal_minor(idx)
            .saturating_sub(self.line_discount_minor(idx))
    }

    /// Units given away for free on a line
    pub fn free_quantity(&self, idx: usize) -> u32 {
        self.free_quantities.get(idx).copied().unwrap_or_default()
    }

    /// Units on a line that are not yet free
    pub fn paid_quantity(&self, idx: usize) -> u32 {
        self.cart
            .line(idx)
            .map(CartLine::quantity)
            .unwrap_or_default()
            .saturating_sub(self.free_quantity(idx))
    }

    /// Line subtotal before discounts
    pub fn line_subtotal(&self, idx: usize) -> Option<Money<'a, Currency>> {
        self.cart
            .line(idx)
            .map(|_| Money::from_minor(self.line_subtotal_minor(idx), self.currency()))
    }

    /// Discount taken off a line
    pub fn line_discount(&self, idx: usize) -> Option<Money<'a, Currency>> {
        self.cart
            .line(idx)
            .map(|_| Money::from_minor(self.line_discount_minor(idx), self.currency()))
    }

    /// Line total after discounts
    pub fn line_total(&self, idx: usize) -> Option<Money<'a, Currency>> {
        self.cart
            .line(idx)
            .map(|_| Money::from_minor(self.line_total_minor(idx), self.currency()))
    }

    /// Cart subtotal before discounts, in minor units
    pub fn subtotal_minor(&self) -> i64 {
        (0..self.cart.len())
            .map(|idx| self.line_subtotal_minor(idx))
            .fold(0, i64::saturating_add)
    }

    /// Discount taken off the cart as a whole, in minor units
    pub fn cart_discount_minor(&self) -> i64 {
        self.cart_discount
    }

    /// All discounts, line and cart level, in minor units
    pub fn discount_total_minor(&self) -> i64 {
        self.line_discounts
            .iter()
            .fold(self.cart_discount, |acc, amount| acc.saturating_add(*amount))
    }

    /// What is left to pay, in minor units
    pub fn total_minor(&self) -> i64 {
        self.subtotal_minor()
            .saturating_sub(self.discount_total_minor())
    }

    /// Cart subtotal before discounts
    pub fn subtotal(&self) -> Money<'a, Currency> {
        Money::from_minor(self.subtotal_minor(), self.currency())
    }

    /// Discount taken off the cart as a whole
    pub fn cart_discount(&self) -> Money<'a, Currency> {
        Money::from_minor(self.cart_discount, self.currency())
    }

    /// All discounts
    pub fn discount_total(&self) -> Money<'a, Currency> {
        Money::from_minor(self.discount_total_minor(), self.currency())
    }

    /// What is left to pay
    pub fn total(&self) -> Money<'a, Currency> {
        Money::from_minor(self.total_minor(), self.currency())
    }

    /// Take up to `amount` off a line and mark up to `free_quantity` units as free.
    ///
    /// Both are clamped to what is left on the line. Returns the amount taken off and the
    /// units actually made free; an unknown line takes nothing.
    pub(crate) fn discount_line(
        &mut self,
        idx: usize,
        amount: i64,
        free_quantity: u32,
    ) -> (i64, u32) {
        let amount = amount.clamp(0, self.line_total_minor(idx).max(0));
        let free_quantity = free_quantity.min(self.paid_quantity(idx));

        let (Some(discount), Some(free)) = (
            self.line_discounts.get_mut(idx),
            self.free_quantities.get_mut(idx),
        ) else {
            return (0, 0);
        };

        *discount = discount.saturating_add(amount);
        *free = free.saturating_add(free_quantity);

        (amount, free_quantity)
    }

    /// Take up to `amount` off the cart as a whole.
    ///
    /// Clamped to what is left to pay. Returns the amount taken off.
    pub(crate) fn discount_cart(&mut self, amount: i64) -> i64 {
        let amount = amount.clamp(0, self.total_minor().max(0));

        self.cart_discount = self.cart_discount.saturating_add(amount);

        amount
    }
}
