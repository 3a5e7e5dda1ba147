//! Discount Fixtures

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    availability::{ChannelAvailability, CustomerGroupAvailability, Window},
    discounts::Discount,
    fixtures::{Fixture, FixtureError},
    purchasables::{DiscountPurchasable, PurchasableRef, PurchasableScope},
};

/// Wrapper for discounts in YAML
#[derive(Debug, Deserialize)]
pub struct DiscountsFixture {
    /// Discounts, in creation order
    pub discounts: Vec<DiscountFixture>,
}

/// Discount Fixture
#[derive(Debug, Deserialize)]
pub struct DiscountFixture {
    /// Unique handle
    pub handle: String,

    /// Display name, defaults to the handle
    #[serde(default)]
    pub name: Option<String>,

    /// Discount type identifier
    #[serde(rename = "type")]
    pub kind: String,

    /// Evaluation priority
    #[serde(default = "default_priority")]
    pub priority: u32,

    /// Start of the active window
    #[serde(default)]
    pub starts_at: Option<Timestamp>,

    /// End of the active window
    #[serde(default)]
    pub ends_at: Option<Timestamp>,

    /// Coupon code
    #[serde(default)]
    pub coupon: Option<String>,

    /// Times used
    #[serde(default)]
    pub uses: u32,

    /// Usage limit
    #[serde(default)]
    pub max_uses: Option<u32>,

    /// Stop evaluating further discounts after this one
    #[serde(default)]
    pub stop: bool,

    /// Map of channel handle -> availability
    #[serde(default)]
    pub channels: FxHashMap<String, AvailabilityFixture>,

    /// Map of customer group handle -> availability
    #[serde(default)]
    pub customer_groups: FxHashMap<String, AvailabilityFixture>,

    /// Purchasable rows
    #[serde(default)]
    pub purchasables: Vec<PurchasableFixture>,

    /// Collection handles
    #[serde(default)]
    pub collections: Vec<String>,

    /// Brand handles
    #[serde(default)]
    pub brands: Vec<String>,

    /// Strategy data
    #[serde(default)]
    pub data: serde_json::Value,
}

fn default_priority() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// Channel or customer group availability
#[derive(Debug, Deserialize)]
pub struct AvailabilityFixture {
    /// Whether the discount can be applied
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether the discount is listed (customer groups only)
    #[serde(default = "default_true")]
    pub visible: bool,

    /// Start of the availability window
    #[serde(default)]
    pub starts_at: Option<Timestamp>,

    /// End of the availability window
    #[serde(default)]
    pub ends_at: Option<Timestamp>,
}

impl AvailabilityFixture {
    fn window(&self) -> Window {
        Window {
            starts_at: self.starts_at,
            ends_at: self.ends_at,
        }
    }
}

/// Purchasable row referencing a product handle or a variant SKU
#[derive(Debug, Deserialize)]
pub struct PurchasableFixture {
    /// Row type
    pub scope: PurchasableScope,

    /// Product handle
    #[serde(default)]
    pub product: Option<String>,

    /// Variant SKU
    #[serde(default)]
    pub variant: Option<String>,
}

impl DiscountFixture {
    /// Build a discount, resolving handles against the fixture's catalog
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced entity is unknown or a purchasable row is ambiguous.
    pub fn into_discount(self, fixture: &Fixture<'_>) -> Result<Discount, FixtureError> {
        let name = self.name.unwrap_or_else(|| self.handle.clone());

        let mut discount = Discount::new(name, self.handle.clone(), self.kind)
            .with_priority(self.priority)
            .with_uses(self.uses)
            .with_stop(self.stop)
            .with_data(self.data);

        if let Some(starts_at) = self.starts_at {
            discount = discount.with_starts_at(starts_at);
        }

        if let Some(ends_at) = self.ends_at {
            discount = discount.with_ends_at(ends_at);
        }

        if let Some(coupon) = self.coupon {
            discount = discount.with_coupon(coupon);
        }

        if let Some(max_uses) = self.max_uses {
            discount = discount.with_max_uses(max_uses);
        }

        for (handle, availability) in &self.channels {
            discount = discount.with_channel(ChannelAvailability {
                channel: fixture.channel(handle)?,
                enabled: availability.enabled,
                window: availability.window(),
            });
        }

        for (handle, availability) in &self.customer_groups {
            discount = discount.with_customer_group(CustomerGroupAvailability {
                customer_group: fixture.customer_group(handle)?,
                enabled: availability.enabled,
                visible: availability.visible,
                window: availability.window(),
            });
        }

        for row in &self.purchasables {
            let purchasable = match (&row.product, &row.variant) {
                (Some(product), None) => PurchasableRef::Product(fixture.product(product)?),
                (None, Some(variant)) => PurchasableRef::Variant(fixture.variant(variant)?),
                _ => return Err(FixtureError::InvalidPurchasable(self.handle)),
            };

            discount = discount.with_purchasable(DiscountPurchasable {
                scope: row.scope,
                purchasable,
            });
        }

        for collection in &self.collections {
            discount = discount.with_collection(fixture.collection(collection)?);
        }

        for brand in &self.brands {
            discount = discount.with_brand(fixture.brand(brand)?);
        }

        Ok(discount)
    }
}
