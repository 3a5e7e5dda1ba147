//! Rebate
//!
//! Rebate is a discount eligibility and application engine. Given a cart and a catalogue of
//! configured discounts it decides which discounts apply, in which order, and lets each
//! discount's type strategy work out what it takes off the cart.

pub mod applied;
pub mod availability;
pub mod cart;
pub mod channels;
pub mod customers;
pub mod discounts;
pub mod engine;
pub mod evaluation;
pub mod fixtures;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod purchasables;
pub mod receipt;
pub mod totals;
pub mod types;
