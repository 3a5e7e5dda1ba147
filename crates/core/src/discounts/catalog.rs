//! Discount Catalog
//!
//! In-memory store of configured discounts. Keeps creation order so that discounts sharing a
//! priority are evaluated in the order they were added.

use jiff::Timestamp;
use slotmap::SlotMap;
use thiserror::Error;
use tracing::debug;

use super::{Discount, DiscountKey};

/// Errors raised when recording discount usage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RedemptionError {
    /// The discount is not in the catalog.
    #[error("Discount not found: {0:?}")]
    NotFound(DiscountKey),

    /// The discount has reached its usage limit.
    #[error("Discount {0} has reached its usage limit")]
    UsageLimitReached(String),
}

/// Discount Catalog
#[derive(Debug, Default, Clone)]
pub struct DiscountCatalog {
    discounts: SlotMap<DiscountKey, Discount>,
    order: Vec<DiscountKey>,
}

impl DiscountCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a discount, assigning its key.
    pub fn insert(&mut self, discount: Discount) -> DiscountKey {
        let key = self
            .discounts
            .insert_with_key(|key| discount.with_key(key));

        self.order.push(key);

        key
    }

    /// Get a discount
    pub fn get(&self, key: DiscountKey) -> Option<&Discount> {
        self.discounts.get(key)
    }

    /// Get a discount mutably
    pub fn get_mut(&mut self, key: DiscountKey) -> Option<&mut Discount> {
        self.discounts.get_mut(key)
    }

    /// Remove a discount
    pub fn remove(&mut self, key: DiscountKey) -> Option<Discount> {
        let removed = self.discounts.remove(key)?;

        self.order.retain(|ordered| *ordered != key);

        Some(removed)
    }

    /// Look up a discount by its handle
    pub fn by_handle(&self, handle: &str) -> Option<&Discount> {
        self.discounts().find(|discount| discount.handle() == handle)
    }

    /// Discounts in creation order
    pub fn discounts(&self) -> impl Iterator<Item = &Discount> {
        self.order.iter().filter_map(|key| self.discounts.get(*key))
    }

    /// Number of stored discounts
    pub fn len(&self) -> usize {
        self.discounts.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.discounts.is_empty()
    }

    /// Whether `code` unlocks a discount that is active and usable at `now`.
    ///
    /// Matching is exact and case-sensitive. Channel and customer group availability is not
    /// considered: a code valid anywhere is valid.
    pub fn validate_coupon(&self, code: &str, now: Timestamp) -> bool {
        if code.trim().is_empty() {
            return false;
        }

        self.discounts().any(|discount| {
            discount.coupon() == Some(code) && discount.is_active(now) && discount.is_usable()
        })
    }

    /// Record one use of a discount.
    ///
    /// Returns the new use count.
    ///
    /// # Errors
    ///
    /// - [`RedemptionError::NotFound`] if the key is unknown.
    /// - [`RedemptionError::UsageLimitReached`] if the discount has no uses left. The count is
    ///   left unchanged.
    pub fn redeem(&mut self, key: DiscountKey) -> Result<u32, RedemptionError> {
        let discount = self
            .discounts
            .get_mut(key)
            .ok_or(RedemptionError::NotFound(key))?;

        if !discount.is_usable() {
            return Err(RedemptionError::UsageLimitReached(
                discount.handle().to_string(),
            ));
        }

        discount.record_use();

        debug!(handle = discount.handle(), uses = discount.uses(), "redeemed discount");

        Ok(discount.uses())
    }

    /// Record one use of each discount, all or nothing.
    ///
    /// Every key is checked before any count is changed. A key listed more than once counts
    /// once per occurrence.
    ///
    /// # Errors
    ///
    /// Returns the first [`RedemptionError`] found; no counts are changed in that case.
    pub fn redeem_all(&mut self, keys: &[DiscountKey]) -> Result<(), RedemptionError> {
        for (idx, key) in keys.iter().enumerate() {
            let discount = self.get(*key).ok_or(RedemptionError::NotFound(*key))?;

            let requested = keys
                .iter()
                .take(idx.saturating_add(1))
                .filter(|other| *other == key)
                .count();

            let within_limit = discount.max_uses().is_none_or(|max_uses| {
                u32::try_from(requested)
                    .ok()
                    .and_then(|requested| discount.uses().checked_add(requested))
                    .is_some_and(|total| total <= max_uses)
            });

            if !within_limit {
                return Err(RedemptionError::UsageLimitReached(
                    discount.handle().to_string(),
                ));
            }
        }

        for key in keys {
            self.redeem(*key)?;
        }

        Ok(())
    }
}
