//! Discount Types
//!
//! A discount type is the strategy that turns a discount's `data` into an effect on a cart.
//! Types are registered by identifier and resolved when discounts are applied.

use std::{fmt::Debug, sync::Arc};

use serde::de::DeserializeOwned;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{discounts::Discount, pricing::PricingError, totals::DiscountedCart};

pub mod amount_off;
pub mod buy_x_get_y;

pub use amount_off::AmountOff;
pub use buy_x_get_y::BuyXGetY;

/// Errors raised by discount type strategies.
#[derive(Debug, Error)]
pub enum DiscountTypeError {
    /// The discount data could not be read by the strategy.
    #[error("invalid data for discount type {identifier}: {source}")]
    InvalidData {
        /// Strategy identifier
        identifier: String,

        /// Underlying deserialization error
        source: serde_json::Error,
    },

    /// The discount data was readable but makes no sense.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// Minor-unit arithmetic failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// A single change to a cart made by a discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// Take an amount off a line, optionally making some of its units free.
    Line {
        /// Index of the cart line
        line_idx: usize,

        /// Amount taken off, in minor units
        amount: i64,

        /// Units given away for free
        free_quantity: u32,
    },

    /// Take an amount off the cart as a whole.
    Cart {
        /// Amount taken off, in minor units
        amount: i64,
    },
}

/// What a discount does to a cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscountEffect {
    adjustments: SmallVec<[Adjustment; 8]>,
}

impl DiscountEffect {
    /// An effect that changes nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Add a line adjustment
    #[must_use]
    pub fn with_line(mut self, line_idx: usize, amount: i64) -> Self {
        self.push(Adjustment::Line {
            line_idx,
            amount,
            free_quantity: 0,
        });
        self
    }

    /// Add a line adjustment making `free_quantity` units free
    #[must_use]
    pub fn with_free_units(mut self, line_idx: usize, free_quantity: u32, amount: i64) -> Self {
        self.push(Adjustment::Line {
            line_idx,
            amount,
            free_quantity,
        });
        self
    }

    /// Add a cart adjustment
    #[must_use]
    pub fn with_cart(mut self, amount: i64) -> Self {
        self.push(Adjustment::Cart { amount });
        self
    }

    /// Add an adjustment
    pub fn push(&mut self, adjustment: Adjustment) {
        self.adjustments.push(adjustment);
    }

    /// Adjustments in the order they were added
    pub fn adjustments(&self) -> &[Adjustment] {
        &self.adjustments
    }

    /// Whether the effect changes nothing
    pub fn is_empty(&self) -> bool {
        self.adjustments.iter().all(|adjustment| match adjustment {
            Adjustment::Line {
                amount,
                free_quantity,
                ..
            } => *amount == 0 && *free_quantity == 0,
            Adjustment::Cart { amount } => *amount == 0,
        })
    }
}

/// Discount type strategy
pub trait DiscountType: Debug + Send + Sync {
    /// Unique identifier discounts use to select this type
    fn identifier(&self) -> &str;

    /// Human readable name
    fn name(&self) -> &str;

    /// Work out what `discount` does to the cart as discounted so far.
    ///
    /// Implementations must be deterministic for the same discount and cart.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountTypeError`] if the discount data is invalid or arithmetic fails.
    fn apply(
        &self,
        discount: &Discount,
        cart: &DiscountedCart<'_>,
    ) -> Result<DiscountEffect, DiscountTypeError>;
}

/// Wrap a strategy for registration.
pub fn discount_type<T>(strategy: T) -> Arc<dyn DiscountType>
where
    T: DiscountType + 'static,
{
    Arc::new(strategy)
}

/// Deserialize a discount's data for a strategy. Missing data reads as an empty object.
///
/// # Errors
///
/// Returns [`DiscountTypeError::InvalidData`] if the data does not match `T`.
pub fn parse_data<T: DeserializeOwned>(
    identifier: &str,
    discount: &Discount,
) -> Result<T, DiscountTypeError> {
    let data = match discount.data() {
        serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
        data => data.clone(),
    };

    serde_json::from_value(data).map_err(|source| DiscountTypeError::InvalidData {
        identifier: identifier.to_string(),
        source,
    })
}

/// Registered discount types, in registration order.
#[derive(Debug, Clone, Default)]
pub struct DiscountTypes {
    types: Vec<Arc<dyn DiscountType>>,
}

impl DiscountTypes {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type. A type with the same identifier is replaced in place.
    pub fn add(&mut self, strategy: Arc<dyn DiscountType>) {
        let existing = self
            .types
            .iter_mut()
            .find(|registered| registered.identifier() == strategy.identifier());

        match existing {
            Some(registered) => *registered = strategy,
            None => self.types.push(strategy),
        }
    }

    /// Resolve a type by identifier
    pub fn get(&self, identifier: &str) -> Option<&Arc<dyn DiscountType>> {
        self.types
            .iter()
            .find(|registered| registered.identifier() == identifier)
    }

    /// Registered types
    pub fn types(&self) -> &[Arc<dyn DiscountType>] {
        &self.types
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
