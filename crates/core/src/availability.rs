//! Channel and Customer Group Availability
//!
//! Per-association availability for a discount. Each association carries its own window,
//! independent of the discount's active window.

use jiff::Timestamp;

use crate::{channels::ChannelKey, customers::CustomerGroupKey};

/// Half-open availability window `[starts_at, ends_at)`. A missing bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    /// Start of the window (inclusive)
    pub starts_at: Option<Timestamp>,

    /// End of the window (exclusive)
    pub ends_at: Option<Timestamp>,
}

impl Window {
    /// A window with no bounds.
    #[must_use]
    pub const fn open() -> Self {
        Self {
            starts_at: None,
            ends_at: None,
        }
    }

    /// A window starting at `starts_at` with no end.
    #[must_use]
    pub const fn starting(starts_at: Timestamp) -> Self {
        Self {
            starts_at: Some(starts_at),
            ends_at: None,
        }
    }

    /// A window between two instants.
    #[must_use]
    pub const fn between(starts_at: Timestamp, ends_at: Timestamp) -> Self {
        Self {
            starts_at: Some(starts_at),
            ends_at: Some(ends_at),
        }
    }

    /// Whether `now` falls inside the window.
    pub fn contains(&self, now: Timestamp) -> bool {
        self.starts_at.is_none_or(|starts_at| starts_at <= now)
            && self.ends_at.is_none_or(|ends_at| now < ends_at)
    }
}

/// Discount availability in a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelAvailability {
    /// Channel the discount is attached to
    pub channel: ChannelKey,

    /// Whether the discount is enabled in this channel
    pub enabled: bool,

    /// When the discount is available in this channel
    pub window: Window,
}

impl ChannelAvailability {
    /// Enabled in `channel` with the given window.
    #[must_use]
    pub const fn enabled(channel: ChannelKey, window: Window) -> Self {
        Self {
            channel,
            enabled: true,
            window,
        }
    }

    /// Attached to `channel` but disabled.
    #[must_use]
    pub const fn disabled(channel: ChannelKey, window: Window) -> Self {
        Self {
            channel,
            enabled: false,
            window,
        }
    }

    /// Whether the discount can be applied in this channel at `now`.
    pub fn is_available(&self, now: Timestamp) -> bool {
        self.enabled && self.window.contains(now)
    }
}

/// Discount availability for a single customer group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerGroupAvailability {
    /// Customer group the discount is attached to
    pub customer_group: CustomerGroupKey,

    /// Whether the discount can be applied for this group
    pub enabled: bool,

    /// Whether the discount is listed to this group. Has no effect on applicability.
    pub visible: bool,

    /// When the discount is available for this group
    pub window: Window,
}

impl CustomerGroupAvailability {
    /// Enabled and visible for `customer_group` with the given window.
    #[must_use]
    pub const fn enabled(customer_group: CustomerGroupKey, window: Window) -> Self {
        Self {
            customer_group,
            enabled: true,
            visible: true,
            window,
        }
    }

    /// Attached to `customer_group` but neither enabled nor visible.
    #[must_use]
    pub const fn disabled(customer_group: CustomerGroupKey, window: Window) -> Self {
        Self {
            customer_group,
            enabled: false,
            visible: false,
            window,
        }
    }

    /// Set visibility.
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Whether the discount can be applied for this group at `now`.
    pub fn is_available(&self, now: Timestamp) -> bool {
        self.enabled && self.window.contains(now)
    }

    /// Whether the discount should be listed to this group at `now`.
    pub fn is_visible(&self, now: Timestamp) -> bool {
        self.visible && self.window.contains(now)
    }
}
