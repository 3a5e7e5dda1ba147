//! Products

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;
use smallvec::SmallVec;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

new_key_type! {
    /// Product Variant Key
    pub struct VariantKey;
}

new_key_type! {
    /// Brand Key
    pub struct BrandKey;
}

new_key_type! {
    /// Collection Key
    pub struct CollectionKey;
}

/// Product
#[derive(Debug, Clone)]
pub struct Product {
    /// Product name
    pub name: String,

    /// Product brand
    pub brand: Option<BrandKey>,

    /// Collections the product belongs to
    pub collections: SmallVec<[CollectionKey; 4]>,
}

/// Purchasable variant of a product
#[derive(Debug, Clone)]
pub struct Variant<'a> {
    /// Parent product
    pub product: ProductKey,

    /// Stock keeping unit
    pub sku: String,

    /// Unit price
    pub price: Money<'a, Currency>,
}
