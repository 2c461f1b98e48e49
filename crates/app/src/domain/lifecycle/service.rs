//! Lifecycle service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;

use crate::{
    database::Db,
    domain::lifecycle::{
        batch::{BatchAction, BatchProcessor, BatchReport},
        errors::LifecycleError,
    },
};

#[derive(Debug, Clone)]
pub struct PgLifecycleService {
    processor: BatchProcessor,
}

impl PgLifecycleService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self::with_processor(BatchProcessor::new(db))
    }

    #[must_use]
    pub fn with_processor(processor: BatchProcessor) -> Self {
        Self { processor }
    }
}

#[async_trait]
impl LifecycleService for PgLifecycleService {
    async fn run_mark_abandoned(
        &self,
        point_in_time: Timestamp,
    ) -> Result<BatchReport, LifecycleError> {
        self.processor
            .run(BatchAction::MarkAbandoned, point_in_time)
            .await
    }

    async fn run_delete_abandoned(
        &self,
        point_in_time: Timestamp,
    ) -> Result<BatchReport, LifecycleError> {
        self.processor
            .run(BatchAction::DeleteAbandoned, point_in_time)
            .await
    }
}

#[automock]
#[async_trait]
pub trait LifecycleService: Send + Sync {
    /// Mark every cart that is abandonable at `point_in_time` as abandoned.
    async fn run_mark_abandoned(
        &self,
        point_in_time: Timestamp,
    ) -> Result<BatchReport, LifecycleError>;

    /// Delete every cart, with its items, that is deletable at `point_in_time`.
    async fn run_delete_abandoned(
        &self,
        point_in_time: Timestamp,
    ) -> Result<BatchReport, LifecycleError>;
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        domain::carts::CartsService,
        test::{TestContext, helpers},
    };

    use super::*;

    #[tokio::test]
    async fn abandoned_cart_is_deleted_a_week_later() -> TestResult {
        let ctx = TestContext::new().await;
        let now = helpers::now();

        let stale = helpers::seed_cart(&ctx, false, now - SignedDuration::from_hours(4)).await?;
        let fresh = helpers::seed_cart(&ctx, false, now - SignedDuration::from_hours(1)).await?;

        let marked = ctx.lifecycle.run_mark_abandoned(now).await?;

        assert_eq!(marked.affected, 1);
        assert!(ctx.carts.get_cart(stale).await?.abandoned);
        assert!(!ctx.carts.get_cart(fresh).await?.abandoned);

        let unchanged = ctx.lifecycle.run_delete_abandoned(now).await?;

        assert_eq!(unchanged.affected, 0);

        let a_week_later = now + SignedDuration::from_hours(7 * 24);

        let deleted = ctx.lifecycle.run_delete_abandoned(a_week_later).await?;

        assert_eq!(deleted.affected, 1);
        assert_eq!(helpers::count_carts(&ctx, None).await?, 1);
        assert!(ctx.carts.get_cart(fresh).await.is_ok());

        Ok(())
    }

    #[tokio::test]
    async fn reactivated_cart_escapes_deletion() -> TestResult {
        let ctx = TestContext::new().await;
        let now = helpers::now();

        let product = helpers::create_product(&ctx, Decimal::ONE).await?;
        let cart = helpers::create_cart(&ctx).await?;

        let eight_days_ago = now - SignedDuration::from_hours(8 * 24);

        helpers::set_cart_state(&ctx, cart.uuid, true, eight_days_ago).await?;

        ctx.carts.set_item_quantity(cart.uuid, product.uuid, 1).await?;

        let report = ctx.lifecycle.run_delete_abandoned(helpers::now()).await?;

        assert_eq!(report.affected, 0);
        assert!(!ctx.carts.get_cart(cart.uuid).await?.abandoned);

        Ok(())
    }

    #[tokio::test]
    async fn reference_time_too_early_is_rejected() {
        let ctx = TestContext::new().await;

        let result = ctx.lifecycle.run_delete_abandoned(Timestamp::MIN).await;

        assert!(
            matches!(result, Err(LifecycleError::InvalidReferenceTime { .. })),
            "expected InvalidReferenceTime, got {result:?}"
        );
    }
}
