//! Checkout
//!
//! Evaluates a cart and redeems the discounts it used. When another checkout takes the last
//! use of a discount between evaluation and redemption, the cart is evaluated again without
//! it and redemption is retried once.

use rebate::cart::Cart;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::domain::discounts::{
    DiscountsService, DiscountsServiceError,
    models::{CartEvaluation, DiscountQuery},
};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("coupon {0} is not valid")]
    InvalidCoupon(String),

    #[error(transparent)]
    Discounts(#[from] DiscountsServiceError),
}

/// Evaluate `cart` and redeem the discounts applied to it.
///
/// # Errors
///
/// - [`CheckoutError::InvalidCoupon`] if the cart carries a coupon that unlocks nothing.
/// - [`CheckoutError::Discounts`] if evaluation fails, or redemption fails again after the
///   cart was re-evaluated.
#[instrument(name = "checkout", skip_all, fields(lines = cart.len()))]
pub async fn checkout<S>(
    discounts: &S,
    query: &DiscountQuery,
    cart: &Cart<'static>,
) -> Result<CartEvaluation, CheckoutError>
where
    S: DiscountsService + ?Sized,
{
    if let Some(code) = cart.coupon_code()
        && !discounts.validate_coupon(code, query.now).await?
    {
        return Err(CheckoutError::InvalidCoupon(code.to_string()));
    }

    let evaluation = discounts.evaluate(query, cart).await?;

    match discounts.redeem(evaluation.discount_keys()).await {
        Ok(()) => {
            info!(total = %evaluation.total(), "checkout complete");

            Ok(evaluation)
        }
        Err(DiscountsServiceError::UsageLimitReached(handle)) => {
            warn!(%handle, "usage limit reached, re-evaluating cart");

            let evaluation = discounts.evaluate(query, cart).await?;

            discounts.redeem(evaluation.discount_keys()).await?;

            info!(total = %evaluation.total(), "checkout complete after retry");

            Ok(evaluation)
        }
        Err(error) => Err(error.into()),
    }
}
