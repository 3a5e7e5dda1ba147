//! Rebate application layer: discount services, checkout, configuration and logging.

pub mod config;
pub mod domain;
pub mod observability;
