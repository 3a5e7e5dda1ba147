//! Customer Groups

use slotmap::new_key_type;

new_key_type! {
    /// Customer Group Key
    pub struct CustomerGroupKey;
}

/// A segment of customers discounts can be scoped to.
#[derive(Debug, Clone)]
pub struct CustomerGroup {
    /// Group name
    pub name: String,

    /// Unique group handle
    pub handle: String,

    /// Whether this is the default group
    pub default: bool,
}
