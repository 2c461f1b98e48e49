//! Interval scheduler for the lifecycle jobs.

use std::{future::Future, sync::Arc, time::Duration};

use jiff::Timestamp;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::{error, info};

use cartkeeper_app::domain::lifecycle::{LifecycleService, batch::BatchAction};

use crate::{config::lifecycle::ScheduleConfig, jobs, shutdown::ShutdownSignalError};

/// Run both lifecycle jobs on their intervals until `shutdown` resolves.
///
/// The first tick of each job fires immediately. A job in progress finishes before the
/// shutdown is observed.
pub(crate) async fn run<F>(
    lifecycle: Arc<dyn LifecycleService>,
    schedule: &ScheduleConfig,
    shutdown: F,
) -> Result<(), ShutdownSignalError>
where
    F: Future<Output = Result<(), ShutdownSignalError>>,
{
    let mut mark = job_interval(schedule.mark_abandoned_interval());
    let mut delete = job_interval(schedule.delete_abandoned_interval());

    tokio::pin!(shutdown);

    info!(
        mark_abandoned_interval_secs = schedule.mark_abandoned_interval_secs,
        delete_abandoned_interval_secs = schedule.delete_abandoned_interval_secs,
        "scheduler started"
    );

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result?;
                info!("scheduler stopped");

                return Ok(());
            }
            _ = mark.tick() => tick(lifecycle.as_ref(), BatchAction::MarkAbandoned).await,
            _ = delete.tick() => tick(lifecycle.as_ref(), BatchAction::DeleteAbandoned).await,
        }
    }
}

fn job_interval(period: Duration) -> Interval {
    let mut interval = interval(period);

    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    interval
}

async fn tick(lifecycle: &dyn LifecycleService, action: BatchAction) {
    // Failures are retried from scratch on the next tick.
    if let Err(error) = jobs::run(lifecycle, action, Timestamp::now()).await {
        error!(%action, %error, "scheduled run failed");
    }
}
