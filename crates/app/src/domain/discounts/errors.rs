//! Discounts service errors.

use rebate::{discounts::RedemptionError, engine::EngineError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscountsServiceError {
    #[error("discount not found")]
    NotFound,

    #[error("discount {0} has reached its usage limit")]
    UsageLimitReached(String),

    #[error("failed to apply discounts")]
    Engine(#[from] EngineError),
}

impl From<RedemptionError> for DiscountsServiceError {
    fn from(error: RedemptionError) -> Self {
        match error {
            RedemptionError::NotFound(_) => Self::NotFound,
            RedemptionError::UsageLimitReached(handle) => Self::UsageLimitReached(handle),
        }
    }
}
