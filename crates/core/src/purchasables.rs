//! Purchasable Scoping
//!
//! Discounts can reference purchasable entities to restrict which cart lines they apply to
//! (limitations), which lines trigger them (conditions) and which lines receive them (rewards).

use std::str::FromStr;

use serde::Deserialize;
use smallvec::SmallVec;

use crate::products::{ProductKey, VariantKey};

/// Polymorphic reference to a purchasable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PurchasableRef {
    /// Any variant of a product
    Product(ProductKey),

    /// A single product variant
    Variant(VariantKey),
}

/// The role a purchasable row plays for its discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchasableScope {
    /// Lines that must be in the cart for the discount to trigger
    Condition,

    /// Lines the discount is limited to
    Limitation,

    /// Lines that receive the reward
    Reward,
}

impl PurchasableScope {
    /// String form used in stored records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Condition => "condition",
            Self::Limitation => "limitation",
            Self::Reward => "reward",
        }
    }
}

impl FromStr for PurchasableScope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "condition" => Ok(Self::Condition),
            "limitation" => Ok(Self::Limitation),
            "reward" => Ok(Self::Reward),
            other => Err(UnknownScope(other.to_string())),
        }
    }
}

/// Unrecognised purchasable scope name.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown purchasable scope: {0}")]
pub struct UnknownScope(pub String);

/// A purchasable row attached to a discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountPurchasable {
    /// Role of this row
    pub scope: PurchasableScope,

    /// Referenced purchasable
    pub purchasable: PurchasableRef,
}

impl DiscountPurchasable {
    /// Condition row
    #[must_use]
    pub const fn condition(purchasable: PurchasableRef) -> Self {
        Self {
            scope: PurchasableScope::Condition,
            purchasable,
        }
    }

    /// Limitation row
    #[must_use]
    pub const fn limitation(purchasable: PurchasableRef) -> Self {
        Self {
            scope: PurchasableScope::Limitation,
            purchasable,
        }
    }

    /// Reward row
    #[must_use]
    pub const fn reward(purchasable: PurchasableRef) -> Self {
        Self {
            scope: PurchasableScope::Reward,
            purchasable,
        }
    }

    /// The referenced product, if this row points at a product.
    #[must_use]
    pub const fn product(&self) -> Option<ProductKey> {
        match self.purchasable {
            PurchasableRef::Product(product) => Some(product),
            PurchasableRef::Variant(_) => None,
        }
    }
}

/// Restricts eligible discounts to those relevant to a set of products.
#[derive(Debug, Clone, Default)]
pub struct ProductScope {
    products: SmallVec<[ProductKey; 8]>,
    scope: Option<PurchasableScope>,
}

impl ProductScope {
    /// Scope to `products`, considering purchasable rows of any type.
    pub fn new(products: impl IntoIterator<Item = ProductKey>) -> Self {
        Self {
            products: products.into_iter().collect(),
            scope: None,
        }
    }

    /// Only consider purchasable rows of the given type.
    #[must_use]
    pub const fn with_scope(mut self, scope: PurchasableScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Products in scope
    pub fn products(&self) -> &[ProductKey] {
        &self.products
    }

    /// Row type filter, if any
    pub const fn scope(&self) -> Option<PurchasableScope> {
        self.scope
    }

    /// Whether a discount with the given purchasable rows qualifies for this product set.
    ///
    /// A discount with no rows of the relevant type qualifies unconditionally. Otherwise at
    /// least one of those rows must be a product row referencing a product in the set; variant
    /// rows count as rows but never match.
    pub fn admits(&self, purchasables: &[DiscountPurchasable]) -> bool {
        let mut relevant = purchasables
            .iter()
            .filter(|row| self.scope.is_none_or(|scope| row.scope == scope))
            .peekable();

        if relevant.peek().is_none() {
            return true;
        }

        relevant
            .filter_map(DiscountPurchasable::product)
            .any(|product| self.products.contains(&product))
    }
}
