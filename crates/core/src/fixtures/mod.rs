//! Fixtures
//!
//! YAML fixture sets for tests, demos and the CLI. A set named `default` is made of
//! `catalog/default.yml`, `discounts/default.yml` and `carts/default.yml` under the base path.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError, CartLine},
    channels::{Channel, ChannelKey},
    customers::{CustomerGroup, CustomerGroupKey},
    discounts::{Discount, DiscountCatalog, DiscountKey},
    fixtures::{carts::CartsFixture, catalog::CatalogFixture, discounts::DiscountsFixture},
    products::{BrandKey, CollectionKey, Product, ProductKey, Variant, VariantKey},
};

pub mod carts;
pub mod catalog;
pub mod discounts;

pub use catalog::{parse_currency, parse_price};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Channel not found
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    /// Customer group not found
    #[error("Customer group not found: {0}")]
    CustomerGroupNotFound(String),

    /// Brand not found
    #[error("Brand not found: {0}")]
    BrandNotFound(String),

    /// Collection not found
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Variant not found
    #[error("Variant not found: {0}")]
    VariantNotFound(String),

    /// Discount not found
    #[error("Discount not found: {0}")]
    DiscountNotFound(String),

    /// Cart not found
    #[error("Cart not found: {0}")]
    CartNotFound(String),

    /// A purchasable row must reference exactly one product or variant
    #[error("Purchasable on discount {0} must reference exactly one product or variant")]
    InvalidPurchasable(String),

    /// Cart creation error
    #[error("Failed to create cart {0}: {1}")]
    Cart(String, #[source] CartError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    channels: SlotMap<ChannelKey, Channel>,
    customer_groups: SlotMap<CustomerGroupKey, CustomerGroup>,
    brands: SlotMap<BrandKey, String>,
    collections: SlotMap<CollectionKey, String>,
    products: SlotMap<ProductKey, Product>,
    variants: SlotMap<VariantKey, Variant<'a>>,

    /// Handle -> `SlotMap` key mappings for lookups
    channel_keys: FxHashMap<String, ChannelKey>,
    customer_group_keys: FxHashMap<String, CustomerGroupKey>,
    brand_keys: FxHashMap<String, BrandKey>,
    collection_keys: FxHashMap<String, CollectionKey>,
    product_keys: FxHashMap<String, ProductKey>,
    variant_keys: FxHashMap<String, VariantKey>,

    catalog: DiscountCatalog,
    carts: FxHashMap<String, Cart<'a>>,
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            channels: SlotMap::with_key(),
            customer_groups: SlotMap::with_key(),
            brands: SlotMap::with_key(),
            collections: SlotMap::with_key(),
            products: SlotMap::with_key(),
            variants: SlotMap::with_key(),
            channel_keys: FxHashMap::default(),
            customer_group_keys: FxHashMap::default(),
            brand_keys: FxHashMap::default(),
            collection_keys: FxHashMap::default(),
            product_keys: FxHashMap::default(),
            variant_keys: FxHashMap::default(),
            catalog: DiscountCatalog::new(),
            carts: FxHashMap::default(),
        }
    }

    /// Load a complete fixture set (catalog, discounts and carts with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::new().load_set(name)
    }

    /// Load a complete fixture set from this fixture's base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn load_set(mut self, name: &str) -> Result<Self, FixtureError> {
        self.load_catalog(name)?
            .load_discounts(name)?
            .load_carts(name)?;

        Ok(self)
    }

    fn read(&self, kind: &str, name: &str) -> Result<String, FixtureError> {
        let file_path = self.base_path.join(kind).join(format!("{name}.yml"));

        Ok(fs::read_to_string(file_path)?)
    }

    /// Load channels, customer groups, brands, collections and products
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a price is invalid, or a product
    /// references an unknown brand or collection.
    pub fn load_catalog(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CatalogFixture = serde_norway::from_str(&self.read("catalog", name)?)?;

        for (handle, channel) in fixture.channels {
            let key = self.channels.insert(Channel {
                name: channel.name,
                handle: handle.clone(),
                default: channel.default,
            });

            self.channel_keys.insert(handle, key);
        }

        for (handle, group) in fixture.customer_groups {
            let key = self.customer_groups.insert(CustomerGroup {
                name: group.name,
                handle: handle.clone(),
                default: group.default,
            });

            self.customer_group_keys.insert(handle, key);
        }

        for (handle, name) in fixture.brands {
            let key = self.brands.insert(name);

            self.brand_keys.insert(handle, key);
        }

        for (handle, name) in fixture.collections {
            let key = self.collections.insert(name);

            self.collection_keys.insert(handle, key);
        }

        for (handle, product_fixture) in fixture.products {
            let brand = product_fixture
                .brand
                .as_deref()
                .map(|brand| self.brand(brand))
                .transpose()?;

            let collections = product_fixture
                .collections
                .iter()
                .map(|collection| self.collection(collection))
                .collect::<Result<SmallVec<[CollectionKey; 4]>, _>>()?;

            let product_key = self.products.insert(Product {
                name: product_fixture.name,
                brand,
                collections,
            });

            for (sku, price) in product_fixture.variants {
                let price = catalog::parse_money(&price)?;
                let variant_key = self.variants.insert(Variant {
                    product: product_key,
                    sku: sku.clone(),
                    price,
                });

                self.variant_keys.insert(sku, variant_key);
            }

            self.product_keys.insert(handle, product_key);
        }

        Ok(self)
    }

    /// Load discounts into the catalog, in file order
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a discount references an
    /// unknown channel, customer group, product, variant, brand or collection.
    pub fn load_discounts(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: DiscountsFixture = serde_norway::from_str(&self.read("discounts", name)?)?;

        for discount_fixture in fixture.discounts {
            let discount = discount_fixture.into_discount(self)?;

            self.catalog.insert(discount);
        }

        Ok(self)
    }

    /// Load named carts
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a cart references an unknown
    /// variant, channel or customer group, or a cart is invalid.
    pub fn load_carts(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CartsFixture = serde_norway::from_str(&self.read("carts", name)?)?;

        for (cart_name, cart_fixture) in fixture.carts {
            let cart = cart_fixture.into_cart(&cart_name, self)?;

            self.carts.insert(cart_name, cart);
        }

        Ok(self)
    }

    /// Build a cart line for a variant
    ///
    /// # Errors
    ///
    /// Returns an error if the variant is not found.
    pub fn line(&self, sku: &str, quantity: u32) -> Result<CartLine<'a>, FixtureError> {
        let variant_key = self.variant(sku)?;
        let variant = self
            .variants
            .get(variant_key)
            .ok_or_else(|| FixtureError::VariantNotFound(sku.to_string()))?;
        let product = self
            .products
            .get(variant.product)
            .ok_or_else(|| FixtureError::VariantNotFound(sku.to_string()))?;

        let mut line = CartLine::new(variant.product, variant_key, variant.price, quantity)
            .with_collections(product.collections.iter().copied())
            .with_description(format!("{} ({})", product.name, variant.sku));

        if let Some(brand) = product.brand {
            line = line.with_brand(brand);
        }

        Ok(line)
    }

    /// Get a channel key by handle
    ///
    /// # Errors
    ///
    /// Returns an error if the channel is not found.
    pub fn channel(&self, handle: &str) -> Result<ChannelKey, FixtureError> {
        self.channel_keys
            .get(handle)
            .copied()
            .ok_or_else(|| FixtureError::ChannelNotFound(handle.to_string()))
    }

    /// Get a customer group key by handle
    ///
    /// # Errors
    ///
    /// Returns an error if the customer group is not found.
    pub fn customer_group(&self, handle: &str) -> Result<CustomerGroupKey, FixtureError> {
        self.customer_group_keys
            .get(handle)
            .copied()
            .ok_or_else(|| FixtureError::CustomerGroupNotFound(handle.to_string()))
    }

    /// Get a brand key by handle
    ///
    /// # Errors
    ///
    /// Returns an error if the brand is not found.
    pub fn brand(&self, handle: &str) -> Result<BrandKey, FixtureError> {
        self.brand_keys
            .get(handle)
            .copied()
            .ok_or_else(|| FixtureError::BrandNotFound(handle.to_string()))
    }

    /// Get a collection key by handle
    ///
    /// # Errors
    ///
    /// Returns an error if the collection is not found.
    pub fn collection(&self, handle: &str) -> Result<CollectionKey, FixtureError> {
        self.collection_keys
            .get(handle)
            .copied()
            .ok_or_else(|| FixtureError::CollectionNotFound(handle.to_string()))
    }

    /// Get a product key by handle
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, handle: &str) -> Result<ProductKey, FixtureError> {
        self.product_keys
            .get(handle)
            .copied()
            .ok_or_else(|| FixtureError::ProductNotFound(handle.to_string()))
    }

    /// Get a variant key by SKU
    ///
    /// # Errors
    ///
    /// Returns an error if the variant is not found.
    pub fn variant(&self, sku: &str) -> Result<VariantKey, FixtureError> {
        self.variant_keys
            .get(sku)
            .copied()
            .ok_or_else(|| FixtureError::VariantNotFound(sku.to_string()))
    }

    /// Get a discount key by handle
    ///
    /// # Errors
    ///
    /// Returns an error if the discount is not found.
    pub fn discount(&self, handle: &str) -> Result<DiscountKey, FixtureError> {
        self.catalog
            .by_handle(handle)
            .map(Discount::key)
            .ok_or_else(|| FixtureError::DiscountNotFound(handle.to_string()))
    }

    /// Get a cart by name
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is not found.
    pub fn cart(&self, name: &str) -> Result<&Cart<'a>, FixtureError> {
        self.carts
            .get(name)
            .ok_or_else(|| FixtureError::CartNotFound(name.to_string()))
    }

    /// Channels in the fixture
    pub fn channels(&self) -> &SlotMap<ChannelKey, Channel> {
        &self.channels
    }

    /// Customer groups in the fixture
    pub fn customer_groups(&self) -> &SlotMap<CustomerGroupKey, CustomerGroup> {
        &self.customer_groups
    }

    /// Products in the fixture
    pub fn products(&self) -> &SlotMap<ProductKey, Product> {
        &self.products
    }

    /// Discount catalog
    pub fn catalog(&self) -> &DiscountCatalog {
        &self.catalog
    }

    /// Discount catalog, mutably
    pub fn catalog_mut(&mut self) -> &mut DiscountCatalog {
        &mut self.catalog
    }

    /// Take the discount catalog
    pub fn into_catalog(self) -> DiscountCatalog {
        self.catalog
    }
}
