//! Prelude
//!
//! Common types for evaluating and applying discounts.

pub use crate::{
    applied::{CartDiscount, DiscountTarget},
    availability::{ChannelAvailability, CustomerGroupAvailability, Window},
    cart::{Cart, CartError, CartLine},
    channels::{Channel, ChannelKey},
    customers::{CustomerGroup, CustomerGroupKey},
    discounts::{Discount, DiscountCatalog, DiscountKey, RedemptionError},
    engine::{DiscountEngine, EngineError},
    evaluation::{Evaluation, Selection},
    products::{BrandKey, CollectionKey, ProductKey, VariantKey},
    purchasables::{DiscountPurchasable, ProductScope, PurchasableRef, PurchasableScope},
    receipt::Receipt,
    totals::DiscountedCart,
    types::{
        Adjustment, AmountOff, BuyXGetY, DiscountEffect, DiscountType, DiscountTypeError,
        discount_type,
    },
};
