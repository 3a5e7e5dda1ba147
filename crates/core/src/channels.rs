//! Channels

use slotmap::new_key_type;

new_key_type! {
    /// Channel Key
    pub struct ChannelKey;
}

/// A sales context (storefront, point of sale, marketplace) discounts can be scoped to.
#[derive(Debug, Clone)]
pub struct Channel {
    /// Channel name
    pub name: String,

    /// Unique channel handle
    pub handle: String,

    /// Whether this is the default channel
    pub default: bool,
}
