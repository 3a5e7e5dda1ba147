//! Discounts
//!
//! A discount is a configured rule: when it is active, which channels and customer groups it
//! is available to, which purchasables it is scoped to, and which type strategy computes its
//! effect from its free-form `data`.

use jiff::Timestamp;
use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::{
    availability::{ChannelAvailability, CustomerGroupAvailability},
    customers::CustomerGroupKey,
    products::{BrandKey, CollectionKey},
    purchasables::{DiscountPurchasable, PurchasableScope},
};

pub mod catalog;

pub use catalog::{DiscountCatalog, RedemptionError};

new_key_type! {
    /// Discount Key
    pub struct DiscountKey;
}

/// Discount
#[derive(Debug, Clone)]
pub struct Discount {
    key: DiscountKey,
    name: String,
    handle: String,
    coupon: Option<String>,
    kind: String,
    data: serde_json::Value,
    priority: u32,
    starts_at: Option<Timestamp>,
    ends_at: Option<Timestamp>,
    uses: u32,
    max_uses: Option<u32>,
    stop: bool,
    channels: SmallVec<[ChannelAvailability; 2]>,
    customer_groups: SmallVec<[CustomerGroupAvailability; 2]>,
    purchasables: SmallVec<[DiscountPurchasable; 4]>,
    collections: SmallVec<[CollectionKey; 2]>,
    brands: SmallVec<[BrandKey; 2]>,
}

impl Discount {
    /// Create a discount of the given type.
    ///
    /// The discount has no start date, so it is not active until one is set.
    pub fn new(
        name: impl Into<String>,
        handle: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            key: DiscountKey::default(),
            name: name.into(),
            handle: handle.into(),
            coupon: None,
            kind: kind.into(),
            data: serde_json::Value::Null,
            priority: 1,
            starts_at: None,
            ends_at: None,
            uses: 0,
            max_uses: None,
            stop: false,
            channels: SmallVec::new(),
            customer_groups: SmallVec::new(),
            purchasables: SmallVec::new(),
            collections: SmallVec::new(),
            brands: SmallVec::new(),
        }
    }

    /// Set the key. Used by the catalog when the discount is stored.
    #[must_use]
    pub(crate) fn with_key(mut self, key: DiscountKey) -> Self {
        self.key = key;
        self
    }

    /// Gate the discount behind a coupon code.
    #[must_use]
    pub fn with_coupon(mut self, coupon: impl Into<String>) -> Self {
        self.coupon = Some(coupon.into());
        self
    }

    /// Set the strategy data.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Set the priority. Lower priorities are evaluated first.
    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Set when the discount starts.
    #[must_use]
    pub fn with_starts_at(mut self, starts_at: Timestamp) -> Self {
        self.starts_at = Some(starts_at);
        self
    }

    /// Set when the discount ends.
    #[must_use]
    pub fn with_ends_at(mut self, ends_at: Timestamp) -> Self {
        self.ends_at = Some(ends_at);
        self
    }

    /// Set the number of times the discount has been used.
    #[must_use]
    pub fn with_uses(mut self, uses: u32) -> Self {
        self.uses = uses;
        self
    }

    /// Limit the number of times the discount can be used.
    #[must_use]
    pub fn with_max_uses(mut self, max_uses: u32) -> Self {
        self.max_uses = Some(max_uses);
        self
    }

    /// Stop evaluating further discounts once this one has applied.
    #[must_use]
    pub fn with_stop(mut self, stop: bool) -> Self {
        self.stop = stop;
        self
    }

    /// Attach channel availability.
    #[must_use]
    pub fn with_channel(mut self, availability: ChannelAvailability) -> Self {
        self.channels.push(availability);
        self
    }

    /// Attach customer group availability.
    #[must_use]
    pub fn with_customer_group(mut self, availability: CustomerGroupAvailability) -> Self {
        self.customer_groups.push(availability);
        self
    }

    /// Attach a purchasable row.
    #[must_use]
    pub fn with_purchasable(mut self, purchasable: DiscountPurchasable) -> Self {
        self.purchasables.push(purchasable);
        self
    }

    /// Restrict the discount to products in a collection.
    #[must_use]
    pub fn with_collection(mut self, collection: CollectionKey) -> Self {
        self.collections.push(collection);
        self
    }

    /// Restrict the discount to products of a brand.
    #[must_use]
    pub fn with_brand(mut self, brand: BrandKey) -> Self {
        self.brands.push(brand);
        self
    }

    /// Discount key
    pub fn key(&self) -> DiscountKey {
        self.key
    }

    /// Discount name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unique handle
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Coupon code gating this discount, if any
    pub fn coupon(&self) -> Option<&str> {
        self.coupon.as_deref()
    }

    /// Identifier of the type strategy computing the effect
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Strategy data
    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }

    /// Evaluation priority
    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Start of the active window
    pub fn starts_at(&self) -> Option<Timestamp> {
        self.starts_at
    }

    /// End of the active window
    pub fn ends_at(&self) -> Option<Timestamp> {
        self.ends_at
    }

    /// Times used
    pub fn uses(&self) -> u32 {
        self.uses
    }

    /// Usage limit
    pub fn max_uses(&self) -> Option<u32> {
        self.max_uses
    }

    /// Whether evaluation stops after this discount
    pub fn stop(&self) -> bool {
        self.stop
    }

    /// Channel availability
    pub fn channels(&self) -> &[ChannelAvailability] {
        &self.channels
    }

    /// Customer group availability
    pub fn customer_groups(&self) -> &[CustomerGroupAvailability] {
        &self.customer_groups
    }

    /// Purchasable rows of every type
    pub fn purchasables(&self) -> &[DiscountPurchasable] {
        &self.purchasables
    }

    /// Collections the discount is restricted to
    pub fn collections(&self) -> &[CollectionKey] {
        &self.collections
    }

    /// Brands the discount is restricted to
    pub fn brands(&self) -> &[BrandKey] {
        &self.brands
    }

    /// Purchasable rows of a single type.
    pub fn purchasables_of(
        &self,
        scope: PurchasableScope,
    ) -> impl Iterator<Item = &DiscountPurchasable> {
        self.purchasables
            .iter()
            .filter(move |purchasable| purchasable.scope == scope)
    }

    /// Condition rows
    pub fn purchasable_conditions(&self) -> impl Iterator<Item = &DiscountPurchasable> {
        self.purchasables_of(PurchasableScope::Condition)
    }

    /// Limitation rows
    pub fn purchasable_limitations(&self) -> impl Iterator<Item = &DiscountPurchasable> {
        self.purchasables_of(PurchasableScope::Limitation)
    }

    /// Reward rows
    pub fn purchasable_rewards(&self) -> impl Iterator<Item = &DiscountPurchasable> {
        self.purchasables_of(PurchasableScope::Reward)
    }

    /// Whether the discount is active at `now`.
    ///
    /// A discount without a start date is never active.
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.starts_at.is_some_and(|starts_at| starts_at <= now)
            && self.ends_at.is_none_or(|ends_at| ends_at > now)
    }

    /// Whether the discount has uses left.
    pub fn is_usable(&self) -> bool {
        self.max_uses.is_none_or(|max_uses| self.uses < max_uses)
    }

    /// Whether the discount should be listed to a customer group at `now`.
    ///
    /// Discounts without customer group associations are listed to everyone.
    pub fn is_visible_to(&self, customer_group: CustomerGroupKey, now: Timestamp) -> bool {
        self.customer_groups.is_empty()
            || self.customer_groups.iter().any(|availability| {
                availability.customer_group == customer_group && availability.is_visible(now)
            })
    }

    pub(crate) fn record_use(&mut self) {
        self.uses = self.uses.saturating_add(1);
    }
}
