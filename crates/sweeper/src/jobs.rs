//! Lifecycle job dispatch.

use jiff::Timestamp;

use cartkeeper_app::domain::lifecycle::{
    LifecycleError, LifecycleService,
    batch::{BatchAction, BatchReport},
};

/// Run one lifecycle job against every cart in scope at `at`.
pub(crate) async fn run(
    lifecycle: &dyn LifecycleService,
    action: BatchAction,
    at: Timestamp,
) -> Result<BatchReport, LifecycleError> {
    match action {
        BatchAction::MarkAbandoned => lifecycle.run_mark_abandoned(at).await,
        BatchAction::DeleteAbandoned => lifecycle.run_delete_abandoned(at).await,
    }
}
