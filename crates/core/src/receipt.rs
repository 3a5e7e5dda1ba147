//! Receipt

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    applied::{CartDiscount, DiscountTarget},
    discounts::{Discount, DiscountCatalog},
    totals::DiscountedCart,
};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// A single receipt line
#[derive(Debug, Clone)]
pub struct ReceiptLine<'a> {
    /// Line description
    pub description: String,

    /// Quantity bought
    pub quantity: u32,

    /// Units given away free
    pub free_quantity: u32,

    /// Line subtotal before discounts
    pub subtotal: Money<'a, Currency>,

    /// Discount taken off the line
    pub discount: Money<'a, Currency>,

    /// Line total after discounts
    pub total: Money<'a, Currency>,
}

/// Receipt for a discounted cart.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    lines: Vec<ReceiptLine<'a>>,
    applied: Vec<CartDiscount<'a>>,
    subtotal: Money<'a, Currency>,
    cart_discount: Money<'a, Currency>,
    total: Money<'a, Currency>,
    currency: &'static Currency,
}

impl<'a> Receipt<'a> {
    /// Build a receipt from a discounted cart and the discounts applied to it.
    pub fn new(cart: &DiscountedCart<'a>, applied: &[CartDiscount<'a>]) -> Self {
        let lines = cart
            .lines()
            .iter()
            .enumerate()
            .map(|(idx, line)| ReceiptLine {
                description: line
                    .description()
                    .map_or_else(|| format!("Line {}", idx.saturating_add(1)), str::to_string),
                quantity: line.quantity(),
                free_quantity: cart.free_quantity(idx),
                subtotal: Money::from_minor(cart.line_subtotal_minor(idx), cart.currency()),
                discount: Money::from_minor(cart.line_discount_minor(idx), cart.currency()),
                total: Money::from_minor(cart.line_total_minor(idx), cart.currency()),
            })
            .collect();

        Self {
            lines,
            applied: applied.to_vec(),
            subtotal: cart.subtotal(),
            cart_discount: cart.cart_discount(),
            total: cart.total(),
            currency: cart.currency(),
        }
    }

    /// Receipt lines
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Applied discounts
    pub fn applied(&self) -> &[CartDiscount<'a>] {
        &self.applied
    }

    /// Total cost before discounts
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Discount taken off the cart as a whole
    pub fn cart_discount(&self) -> Money<'a, Currency> {
        self.cart_discount
    }

    /// Total amount to pay
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Currency used for all monetary values
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Calculate the savings made by applying discounts.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.subtotal.sub(self.total)
    }

    /// Savings as a fraction of the subtotal. Zero when the subtotal is zero.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings_percent(&self) -> Result<Percentage, MoneyError> {
        let savings = self.savings()?;
        let subtotal = Decimal::from(self.subtotal.to_minor_units());

        if subtotal.is_zero() {
            return Ok(Percentage::from(Decimal::ZERO));
        }

        Ok(Percentage::from(
            Decimal::from(savings.to_minor_units()) / subtotal,
        ))
    }

    /// Handles of the discounts applied to a target, in the order they were applied.
    fn handles_for(&self, target: DiscountTarget, catalog: &DiscountCatalog) -> String {
        let handles: SmallVec<[&str; 4]> = self
            .applied
            .iter()
            .filter(|applied| applied.target == target)
            .map(|applied| {
                catalog
                    .get(applied.discount)
                    .map_or("<unknown>", Discount::handle)
            })
            .collect();

        handles.join(", ")
    }

    /// Write the receipt as a table followed by a summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        catalog: &DiscountCatalog,
    ) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record([
            "", "Item", "Qty", "Subtotal", "Discount", "Total", "Discounts",
        ]);

        for (idx, line) in self.lines.iter().enumerate() {
            let quantity = if line.free_quantity > 0 {
                format!("{} ({} free)", line.quantity, line.free_quantity)
            } else {
                line.quantity.to_string()
            };

            let discount = if line.discount.is_zero() {
                String::new()
            } else {
                format!("-{}", line.discount)
            };

            builder.push_record([
                format!("#{}", idx.saturating_add(1)),
                line.description.clone(),
                quantity,
                line.subtotal.to_string(),
                discount,
                line.total.to_string(),
                self.handles_for(DiscountTarget::Line(idx), catalog),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Columns::new(2..6), Alignment::right());
        table.modify(Rows::first(), Alignment::center());

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;

        self.write_summary(&mut out, catalog)
    }

    fn write_summary(
        &self,
        out: &mut impl io::Write,
        catalog: &DiscountCatalog,
    ) -> Result<(), ReceiptError> {
        let savings = self.savings()?;
        let savings_points = (self.savings_percent()? * Decimal::ONE_HUNDRED).round_dp(2);

        let mut rows: SmallVec<[(&str, String); 4]> = SmallVec::new();

        rows.push(("Subtotal:", self.subtotal.to_string()));

        if !self.cart_discount.is_zero() {
            rows.push((
                "Cart discount:",
                format!(
                    "-{} ({})",
                    self.cart_discount,
                    self.handles_for(DiscountTarget::Cart, catalog)
                ),
            ));
        }

        rows.push(("Total:", self.total.to_string()));
        rows.push(("Savings:", format!("{savings} ({savings_points}%)")));

        let label_width = rows
            .iter()
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or_default();

        for (label, value) in rows {
            writeln!(out, " {label:>label_width$}  {value}").map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}
