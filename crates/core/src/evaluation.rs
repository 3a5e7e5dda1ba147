//! Evaluation
//!
//! The per-request context for deciding which discounts apply. It holds the point in time,
//! the channels and customer groups to restrict to, an optional product scope and the
//! discounts applied so far. Build a new one for every cart evaluation.

use jiff::Timestamp;
use smallvec::SmallVec;
use tracing::trace;

use crate::{
    applied::CartDiscount,
    cart::Cart,
    channels::ChannelKey,
    customers::CustomerGroupKey,
    discounts::{Discount, DiscountCatalog},
    purchasables::ProductScope,
};

/// One or more keys of a single entity kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection<K>(SmallVec<[K; 4]>);

impl<K> Selection<K> {
    /// Selected keys
    pub fn keys(&self) -> &[K] {
        &self.0
    }
}

macro_rules! selection_from {
    ($($key:ty),+ $(,)?) => {
        $(
            impl From<$key> for Selection<$key> {
                fn from(key: $key) -> Self {
                    Self(smallvec::smallvec![key])
                }
            }

            impl From<Vec<$key>> for Selection<$key> {
                fn from(keys: Vec<$key>) -> Self {
                    Self(keys.into_iter().collect())
                }
            }

            impl<const N: usize> From<[$key; N]> for Selection<$key> {
                fn from(keys: [$key; N]) -> Self {
                    Self(keys.into_iter().collect())
                }
            }

            impl From<&[$key]> for Selection<$key> {
                fn from(keys: &[$key]) -> Self {
                    Self(keys.iter().copied().collect())
                }
            }
        )+
    };
}

selection_from!(ChannelKey, CustomerGroupKey);

/// Evaluation context
#[derive(Debug, Clone)]
pub struct Evaluation<'a> {
    now: Timestamp,
    channels: SmallVec<[ChannelKey; 2]>,
    customer_groups: SmallVec<[CustomerGroupKey; 2]>,
    products: Option<ProductScope>,
    applied: Vec<CartDiscount<'a>>,
}

impl<'a> Evaluation<'a> {
    /// Evaluate at `now`, unrestricted by channel or customer group.
    pub fn new(now: Timestamp) -> Self {
        Self {
            now,
            channels: SmallVec::new(),
            customer_groups: SmallVec::new(),
            products: None,
            applied: Vec::new(),
        }
    }

    /// Evaluate at `now`, restricted to the cart's channel and customer groups.
    pub fn for_cart(cart: &Cart<'_>, now: Timestamp) -> Self {
        let mut evaluation = Self::new(now);

        if let Some(channel) = cart.channel() {
            evaluation.channel(channel);
        }

        evaluation.customer_group(cart.customer_groups());

        evaluation
    }

    /// Point in time discounts are evaluated at
    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Restrict to one or more channels. Adds to any channels already registered.
    pub fn channel(&mut self, channels: impl Into<Selection<ChannelKey>>) -> &mut Self {
        self.channels.extend_from_slice(channels.into().keys());
        self
    }

    /// Restrict to one or more customer groups. Adds to any groups already registered.
    pub fn customer_group(
        &mut self,
        customer_groups: impl Into<Selection<CustomerGroupKey>>,
    ) -> &mut Self {
        self.customer_groups
            .extend_from_slice(customer_groups.into().keys());
        self
    }

    /// Only consider discounts relevant to a set of products.
    pub fn products(&mut self, scope: ProductScope) -> &mut Self {
        self.products = Some(scope);
        self
    }

    /// Registered channels, in registration order
    pub fn get_channels(&self) -> &[ChannelKey] {
        &self.channels
    }

    /// Registered customer groups, in registration order
    pub fn get_customer_groups(&self) -> &[CustomerGroupKey] {
        &self.customer_groups
    }

    /// Product scope, if one is set
    pub fn get_products(&self) -> Option<&ProductScope> {
        self.products.as_ref()
    }

    /// Discounts eligible in this context, ordered by priority.
    ///
    /// Discounts sharing a priority keep catalog order. When a cart is given, coupon-gated
    /// discounts only pass if the cart carries the exact coupon code.
    pub fn get_discounts<'c>(
        &self,
        catalog: &'c DiscountCatalog,
        cart: Option<&Cart<'_>>,
    ) -> Vec<&'c Discount> {
        let mut discounts: Vec<&Discount> = catalog
            .discounts()
            .filter(|discount| discount.is_active(self.now) && discount.is_usable())
            .filter(|discount| self.is_channel_available(discount))
            .filter(|discount| self.is_customer_group_available(discount))
            .filter(|discount| cart.is_none_or(|cart| Self::is_unlocked(discount, cart)))
            .filter(|discount| {
                self.products
                    .as_ref()
                    .is_none_or(|scope| scope.admits(discount.purchasables()))
            })
            .collect();

        discounts.sort_by_key(|discount| discount.priority());

        trace!(eligible = discounts.len(), "eligible discounts");

        discounts
    }

    fn is_channel_available(&self, discount: &Discount) -> bool {
        self.channels.is_empty()
            || discount.channels().is_empty()
            || discount.channels().iter().any(|availability| {
                self.channels.contains(&availability.channel) && availability.is_available(self.now)
            })
    }

    fn is_customer_group_available(&self, discount: &Discount) -> bool {
        self.customer_groups.is_empty()
            || discount.customer_groups().is_empty()
            || discount.customer_groups().iter().any(|availability| {
                self.customer_groups.contains(&availability.customer_group)
                    && availability.is_available(self.now)
            })
    }

    fn is_unlocked(discount: &Discount, cart: &Cart<'_>) -> bool {
        match (discount.coupon(), cart.coupon_code()) {
            (None, _) => true,
            (Some(coupon), Some(code)) => coupon == code,
            (Some(_), None) => false,
        }
    }

    /// Record an applied discount
    pub fn add_applied(&mut self, applied: CartDiscount<'a>) -> &mut Self {
        self.applied.push(applied);
        self
    }

    /// Discounts applied so far, in the order they were recorded
    pub fn get_applied(&self) -> &[CartDiscount<'a>] {
        &self.applied
    }

    /// Take the applied discounts
    pub fn into_applied(self) -> Vec<CartDiscount<'a>> {
        self.applied
    }
}
