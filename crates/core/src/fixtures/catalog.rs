//! Catalog Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;

use crate::fixtures::FixtureError;

/// Wrapper for the catalog YAML
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CatalogFixture {
    /// Map of channel handle -> channel fixture
    pub channels: FxHashMap<String, NamedFixture>,

    /// Map of customer group handle -> customer group fixture
    pub customer_groups: FxHashMap<String, NamedFixture>,

    /// Map of brand handle -> brand name
    pub brands: FxHashMap<String, String>,

    /// Map of collection handle -> collection name
    pub collections: FxHashMap<String, String>,

    /// Map of product handle -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// A named entity that may be the default of its kind
#[derive(Debug, Deserialize)]
pub struct NamedFixture {
    /// Display name
    pub name: String,

    /// Whether this is the default
    #[serde(default)]
    pub default: bool,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Brand handle
    #[serde(default)]
    pub brand: Option<String>,

    /// Collection handles
    #[serde(default)]
    pub collections: Vec<String>,

    /// Map of SKU -> price (e.g., "25.00 GBP")
    pub variants: FxHashMap<String, String>,
}

/// Parse an ISO currency code
///
/// # Errors
///
/// Returns an error if the currency code is not recognized.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(currency_code), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = parse_currency(currency_code)?;

    let minor_units = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Parse a price string into money
///
/// # Errors
///
/// Returns an error if the price cannot be parsed.
pub(crate) fn parse_money(s: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let (minor_units, currency) = parse_price(s)?;

    Ok(Money::from_minor(minor_units, currency))
}
