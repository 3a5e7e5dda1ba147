//! Cart

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    channels::ChannelKey,
    customers::CustomerGroupKey,
    products::{BrandKey, CollectionKey, ProductKey, VariantKey},
    purchasables::PurchasableRef,
};

/// Errors related to cart construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// A line's currency differs from the cart currency (index, line currency, cart currency).
    #[error("Line {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A line has a quantity of zero.
    #[error("Line {0} has a quantity of zero")]
    ZeroQuantity(usize),

    /// Line total does not fit in minor units.
    #[error("Line {0} total overflows")]
    Overflow(usize),
}

/// A single cart line
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine<'a> {
    product: ProductKey,
    variant: VariantKey,
    brand: Option<BrandKey>,
    collections: SmallVec<[CollectionKey; 4]>,
    unit_price: Money<'a, Currency>,
    quantity: u32,
    description: Option<String>,
}

impl<'a> CartLine<'a> {
    /// Create a new cart line
    pub fn new(
        product: ProductKey,
        variant: VariantKey,
        unit_price: Money<'a, Currency>,
        quantity: u32,
    ) -> Self {
        Self {
            product,
            variant,
            brand: None,
            collections: SmallVec::new(),
            unit_price,
            quantity,
            description: None,
        }
    }

    /// Set the product brand
    #[must_use]
    pub fn with_brand(mut self, brand: BrandKey) -> Self {
        self.brand = Some(brand);
        self
    }

    /// Set the product collections
    #[must_use]
    pub fn with_collections(
        mut self,
        collections: impl IntoIterator<Item = CollectionKey>,
    ) -> Self {
        self.collections = collections.into_iter().collect();
        self
    }

    /// Set a human readable description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Product on this line
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// Variant on this line
    pub fn variant(&self) -> VariantKey {
        self.variant
    }

    /// Product brand
    pub fn brand(&self) -> Option<BrandKey> {
        self.brand
    }

    /// Product collections
    pub fn collections(&self) -> &[CollectionKey] {
        &self.collections
    }

    /// Unit price
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Description, if one was given
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether this line is the referenced purchasable
    pub fn matches(&self, purchasable: &PurchasableRef) -> bool {
        match purchasable {
            PurchasableRef::Product(product) => self.product == *product,
            PurchasableRef::Variant(variant) => self.variant == *variant,
        }
    }

    /// Line subtotal in minor units (unit price times quantity).
    pub fn subtotal_minor(&self) -> Option<i64> {
        self.unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
    }
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    lines: Vec<CartLine<'a>>,
    currency: &'static Currency,
    coupon_code: Option<String>,
    channel: Option<ChannelKey>,
    customer_groups: SmallVec<[CustomerGroupKey; 2]>,
}

impl<'a> Cart<'a> {
    /// Create a new empty cart.
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
            coupon_code: None,
            channel: None,
            customer_groups: SmallVec::new(),
        }
    }

    /// Create a new cart with the given lines.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if a line is in another currency, has no quantity, or its
    /// subtotal overflows.
    pub fn with_lines(
        lines: impl Into<Vec<CartLine<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let lines = lines.into();

        lines.iter().enumerate().try_for_each(|(i, line)| {
            let line_currency = line.unit_price().currency();

            if line_currency != currency {
                return Err(CartError::CurrencyMismatch(
                    i,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            if line.quantity() == 0 {
                return Err(CartError::ZeroQuantity(i));
            }

            line.subtotal_minor().ok_or(CartError::Overflow(i))?;

            Ok(())
        })?;

        Ok(Cart {
            lines,
            ..Cart::new(currency)
        })
    }

    /// Set the coupon code supplied with this cart.
    #[must_use]
    pub fn with_coupon_code(mut self, coupon_code: impl Into<String>) -> Self {
        self.coupon_code = Some(coupon_code.into());
        self
    }

    /// Set the channel this cart is being sold through.
    #[must_use]
    pub fn with_channel(mut self, channel: ChannelKey) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Set the customer groups of the cart's customer.
    #[must_use]
    pub fn with_customer_groups(
        mut self,
        customer_groups: impl IntoIterator<Item = CustomerGroupKey>,
    ) -> Self {
        self.customer_groups = customer_groups.into_iter().collect();
        self
    }

    /// Cart lines
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Get a line by index
    pub fn line(&self, idx: usize) -> Option<&CartLine<'a>> {
        self.lines.get(idx)
    }

    /// Number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Coupon code supplied with the cart
    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }

    /// Channel the cart is sold through
    pub fn channel(&self) -> Option<ChannelKey> {
        self.channel
    }

    /// Customer groups of the cart's customer
    pub fn customer_groups(&self) -> &[CustomerGroupKey] {
        &self.customer_groups
    }

    /// Cart subtotal before discounts.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        let minor = self
            .lines
            .iter()
            .filter_map(CartLine::subtotal_minor)
            .fold(0_i64, i64::saturating_add);

        Money::from_minor(minor, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso};
    use testresult::TestResult;

    use super::*;

    fn line<'a>(minor: i64, currency: &'a Currency, quantity: u32) -> CartLine<'a> {
        CartLine::new(
            ProductKey::default(),
            VariantKey::default(),
            Money::from_minor(minor, currency),
            quantity,
        )
    }

    #[test]
    fn new_with_currency() {
        let cart = Cart::new(iso::GBP);

        assert_eq!(cart.currency(), iso::GBP);
        assert!(cart.is_empty());
        assert!(cart.coupon_code().is_none());
    }

    #[test]
    fn with_lines_currency_mismatch_errors() {
        let lines = [line(100, iso::GBP, 1), line(100, iso::USD, 1)];

        let result = Cart::with_lines(lines, iso::GBP);

        assert_eq!(
            result.err(),
            Some(CartError::CurrencyMismatch(
                1,
                iso::USD.iso_alpha_code,
                iso::GBP.iso_alpha_code
            ))
        );
    }

    #[test]
    fn with_lines_zero_quantity_errors() {
        let result = Cart::with_lines([line(100, iso::GBP, 0)], iso::GBP);

        assert_eq!(result.err(), Some(CartError::ZeroQuantity(0)));
    }

    #[test]
    fn with_lines_overflowing_subtotal_errors() {
        let result = Cart::with_lines([line(i64::MAX, iso::GBP, 2)], iso::GBP);

        assert_eq!(result.err(), Some(CartError::Overflow(0)));
    }

    #[test]
    fn subtotal_multiplies_quantities() -> TestResult {
        let cart = Cart::with_lines([line(100, iso::GBP, 2), line(250, iso::GBP, 1)], iso::GBP)?;

        assert_eq!(cart.subtotal(), Money::from_minor(450, iso::GBP));
        assert_eq!(cart.len(), 2);

        Ok(())
    }

    #[test]
    fn subtotal_with_no_lines() {
        let cart = Cart::new(iso::GBP);

        assert_eq!(cart.subtotal(), Money::from_minor(0, iso::GBP));
    }

    #[test]
    fn line_matches_product_and_variant_references() {
        let line = line(100, iso::GBP, 1);

        assert!(line.matches(&PurchasableRef::Product(ProductKey::default())));
        assert!(line.matches(&PurchasableRef::Variant(VariantKey::default())));
    }

    #[test]
    fn context_setters_are_reflected() {
        let cart = Cart::new(iso::GBP)
            .with_coupon_code("ABCDEF")
            .with_channel(ChannelKey::default())
            .with_customer_groups([CustomerGroupKey::default()]);

        assert_eq!(cart.coupon_code(), Some("ABCDEF"));
        assert_eq!(cart.channel(), Some(ChannelKey::default()));
        assert_eq!(cart.customer_groups(), &[CustomerGroupKey::default()]);
    }
}
