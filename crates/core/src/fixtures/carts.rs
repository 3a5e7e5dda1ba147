//! Cart Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    cart::Cart,
    fixtures::{Fixture, FixtureError, parse_currency},
};

/// Wrapper for carts in YAML
#[derive(Debug, Deserialize)]
pub struct CartsFixture {
    /// Map of cart name -> cart fixture
    pub carts: FxHashMap<String, CartFixture>,
}

/// Cart Fixture
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// ISO currency code
    pub currency: String,

    /// Channel handle
    #[serde(default)]
    pub channel: Option<String>,

    /// Customer group handles
    #[serde(default)]
    pub customer_groups: Vec<String>,

    /// Coupon code
    #[serde(default)]
    pub coupon_code: Option<String>,

    /// Cart lines
    #[serde(default)]
    pub lines: Vec<CartLineFixture>,
}

/// Cart Line Fixture
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// Variant SKU
    pub variant: String,

    /// Quantity
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl CartFixture {
    /// Build a cart, resolving handles against the fixture's catalog
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced entity is unknown or the cart is invalid.
    pub fn into_cart<'a>(
        self,
        name: &str,
        fixture: &Fixture<'a>,
    ) -> Result<Cart<'a>, FixtureError> {
        let currency = parse_currency(&self.currency)?;

        let lines = self
            .lines
            .iter()
            .map(|line| fixture.line(&line.variant, line.quantity))
            .collect::<Result<Vec<_>, _>>()?;

        let mut cart = Cart::with_lines(lines, currency)
            .map_err(|source| FixtureError::Cart(name.to_string(), source))?;

        if let Some(channel) = &self.channel {
            cart = cart.with_channel(fixture.channel(channel)?);
        }

        let customer_groups = self
            .customer_groups
            .iter()
            .map(|group| fixture.customer_group(group))
            .collect::<Result<Vec<_>, _>>()?;

        cart = cart.with_customer_groups(customer_groups);

        if let Some(coupon_code) = self.coupon_code {
            cart = cart.with_coupon_code(coupon_code);
        }

        Ok(cart)
    }
}
