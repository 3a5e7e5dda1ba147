//! Discount query and evaluation models.

use jiff::Timestamp;
use rebate::{
    applied::CartDiscount,
    cart::Cart,
    channels::ChannelKey,
    customers::CustomerGroupKey,
    discounts::DiscountKey,
    evaluation::Evaluation,
    receipt::Receipt,
    totals::DiscountedCart,
};
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

/// Context a cart is evaluated in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountQuery {
    /// Point in time to evaluate at
    pub now: Timestamp,

    /// Channels to restrict to; empty means any channel
    pub channels: SmallVec<[ChannelKey; 2]>,

    /// Customer groups to restrict to; empty means any group
    pub customer_groups: SmallVec<[CustomerGroupKey; 2]>,
}

impl DiscountQuery {
    /// Unrestricted query at `now`.
    #[must_use]
    pub fn at(now: Timestamp) -> Self {
        Self {
            now,
            channels: SmallVec::new(),
            customer_groups: SmallVec::new(),
        }
    }

    /// Query restricted to the cart's channel and customer groups.
    #[must_use]
    pub fn for_cart(cart: &Cart<'_>, now: Timestamp) -> Self {
        Self {
            now,
            channels: cart.channel().into_iter().collect(),
            customer_groups: cart.customer_groups().iter().copied().collect(),
        }
    }

    #[must_use]
    pub fn with_channel(mut self, channel: ChannelKey) -> Self {
        self.channels.push(channel);
        self
    }

    #[must_use]
    pub fn with_customer_group(mut self, customer_group: CustomerGroupKey) -> Self {
        self.customer_groups.push(customer_group);
        self
    }

    pub(crate) fn evaluation<'a>(&self) -> Evaluation<'a> {
        let mut evaluation = Evaluation::new(self.now);

        evaluation
            .channel(self.channels.as_slice())
            .customer_group(self.customer_groups.as_slice());

        evaluation
    }
}

/// A cart after discounts were applied, with the records of what was taken off.
#[derive(Debug, Clone)]
pub struct CartEvaluation {
    pub cart: DiscountedCart<'static>,
    pub applied: Vec<CartDiscount<'static>>,
}

impl CartEvaluation {
    /// Applied discount keys, each once, in the order they were first applied.
    pub fn discount_keys(&self) -> Vec<DiscountKey> {
        let mut keys: Vec<DiscountKey> = Vec::new();

        for applied in &self.applied {
            if !keys.contains(&applied.discount) {
                keys.push(applied.discount);
            }
        }

        keys
    }

    pub fn total(&self) -> Money<'static, Currency> {
        self.cart.total()
    }

    pub fn receipt(&self) -> Receipt<'static> {
        Receipt::new(&self.cart, &self.applied)
    }
}

#[cfg(test)]
mod tests {
    use rebate::{applied::DiscountTarget, cart::CartLine, products::{ProductKey, VariantKey}};
    use rusty_money::iso::GBP;
    use slotmap::SlotMap;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn discount_keys_are_unique_and_ordered() -> TestResult {
        let mut keys = SlotMap::<DiscountKey, ()>::with_key();
        let first = keys.insert(());
        let second = keys.insert(());

        let cart = Cart::with_lines(
            [CartLine::new(
                ProductKey::default(),
                VariantKey::default(),
                Money::from_minor(1_000, GBP),
                1,
            )],
            GBP,
        )?;

        let evaluation = CartEvaluation {
            cart: DiscountedCart::new(&cart),
            applied: vec![
                CartDiscount::new(DiscountTarget::Line(0), second, Money::from_minor(100, GBP)),
                CartDiscount::new(DiscountTarget::Line(1), second, Money::from_minor(100, GBP)),
                CartDiscount::new(DiscountTarget::Cart, first, Money::from_minor(50, GBP)),
            ],
        };

        assert_eq!(evaluation.discount_keys(), [second, first]);

        Ok(())
    }

    #[test]
    fn query_for_cart_copies_channel_and_groups() {
        let mut channels = SlotMap::<ChannelKey, ()>::with_key();
        let mut groups = SlotMap::<CustomerGroupKey, ()>::with_key();
        let web = channels.insert(());
        let retail = groups.insert(());

        let cart = Cart::new(GBP)
            .with_channel(web)
            .with_customer_groups([retail]);

        let query = DiscountQuery::for_cart(&cart, Timestamp::UNIX_EPOCH);

        assert_eq!(query.channels.as_slice(), [web]);
        assert_eq!(query.customer_groups.as_slice(), [retail]);

        let evaluation = query.evaluation();

        assert_eq!(evaluation.get_channels(), [web]);
        assert_eq!(evaluation.get_customer_groups(), [retail]);
    }
}
