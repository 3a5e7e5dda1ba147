//! Rebate Domain Concerns

pub mod checkout;
pub mod discounts;
