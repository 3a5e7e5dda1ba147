//! Discounts service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rebate::{
    cart::Cart,
    discounts::{Discount, DiscountCatalog, DiscountKey},
    engine::DiscountEngine,
};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::domain::discounts::{
    errors::DiscountsServiceError,
    models::{CartEvaluation, DiscountQuery},
};

/// Discounts held in memory, shared between concurrent callers.
///
/// Reads take the catalog's read lock. Redemption takes the write lock, so usage limits are
/// checked and incremented together.
#[derive(Debug, Clone)]
pub struct InMemoryDiscountsService {
    catalog: Arc<RwLock<DiscountCatalog>>,
    engine: DiscountEngine,
}

impl InMemoryDiscountsService {
    #[must_use]
    pub fn new(catalog: DiscountCatalog) -> Self {
        Self::with_engine(catalog, DiscountEngine::new())
    }

    #[must_use]
    pub fn with_engine(catalog: DiscountCatalog, engine: DiscountEngine) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            engine,
        }
    }

    /// Shared handle to the underlying catalog
    #[must_use]
    pub fn catalog(&self) -> Arc<RwLock<DiscountCatalog>> {
        Arc::clone(&self.catalog)
    }
}

#[async_trait]
impl DiscountsService for InMemoryDiscountsService {
    async fn get_discounts(
        &self,
        query: &DiscountQuery,
        cart: &Cart<'static>,
    ) -> Result<Vec<Discount>, DiscountsServiceError> {
        let catalog = self.catalog.read().await;

        let discounts = query
            .evaluation()
            .get_discounts(&catalog, Some(cart))
            .into_iter()
            .cloned()
            .collect();

        Ok(discounts)
    }

    async fn validate_coupon(
        &self,
        code: &str,
        point_in_time: Timestamp,
    ) -> Result<bool, DiscountsServiceError> {
        let catalog = self.catalog.read().await;

        Ok(catalog.validate_coupon(code, point_in_time))
    }

    #[instrument(name = "discounts.evaluate", skip_all, fields(lines = cart.len()))]
    async fn evaluate(
        &self,
        query: &DiscountQuery,
        cart: &Cart<'static>,
    ) -> Result<CartEvaluation, DiscountsServiceError> {
        let catalog = self.catalog.read().await;
        let mut evaluation = query.evaluation();

        let discounted = self.engine.apply(&mut evaluation, &catalog, cart)?;

        Ok(CartEvaluation {
            cart: discounted,
            applied: evaluation.into_applied(),
        })
    }

    #[instrument(name = "discounts.redeem", skip_all, fields(discounts = keys.len()))]
    async fn redeem(&self, keys: Vec<DiscountKey>) -> Result<(), DiscountsServiceError> {
        let mut catalog = self.catalog.write().await;

        catalog.redeem_all(&keys)?;

        debug!("redeemed discounts");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait DiscountsService: Send + Sync {
    /// Discounts eligible for a cart, ordered by priority.
    ///
    /// # Errors
    ///
    /// Implementations backed by storage may fail to read discounts.
    async fn get_discounts(
        &self,
        query: &DiscountQuery,
        cart: &Cart<'static>,
    ) -> Result<Vec<Discount>, DiscountsServiceError>;

    /// Whether a coupon code unlocks an active, usable discount.
    ///
    /// # Errors
    ///
    /// Implementations backed by storage may fail to read discounts.
    async fn validate_coupon(
        &self,
        code: &str,
        point_in_time: Timestamp,
    ) -> Result<bool, DiscountsServiceError>;

    /// Applies the eligible discounts to a cart without redeeming them.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountsServiceError::Engine`] if a discount type is missing or fails.
    async fn evaluate(
        &self,
        query: &DiscountQuery,
        cart: &Cart<'static>,
    ) -> Result<CartEvaluation, DiscountsServiceError>;

    /// Records one use of each discount. Either every discount is redeemed or none are.
    ///
    /// # Errors
    ///
    /// - [`DiscountsServiceError::NotFound`] if a discount does not exist.
    /// - [`DiscountsServiceError::UsageLimitReached`] if a discount has no uses left.
    async fn redeem(&self, keys: Vec<DiscountKey>) -> Result<(), DiscountsServiceError>;
}
