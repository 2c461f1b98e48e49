//! Batch progress observers.

use std::fmt::Debug;

use tracing::{error, info};

use crate::domain::lifecycle::batch::{BatchAction, BatchReport};

/// Receives progress events from a [`BatchProcessor`](super::batch::BatchProcessor) run.
///
/// Chunk indexes are 1-based.
pub trait BatchObserver: Debug + Send + Sync {
    fn on_run_started(&self, action: BatchAction);

    /// Called once a chunk's carts are locked, before they are changed.
    fn on_chunk_started(&self, action: BatchAction, chunk: usize, size: usize);

    fn on_chunk_failed(&self, action: BatchAction, chunk: usize, error: &sqlx::Error);

    fn on_run_finished(&self, report: &BatchReport);
}

/// Observer that ignores all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {
    fn on_run_started(&self, _action: BatchAction) {}

    fn on_chunk_started(&self, _action: BatchAction, _chunk: usize, _size: usize) {}

    fn on_chunk_failed(&self, _action: BatchAction, _chunk: usize, _error: &sqlx::Error) {}

    fn on_run_finished(&self, _report: &BatchReport) {}
}

/// Observer that writes one progress line per event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl BatchObserver for TracingObserver {
    fn on_run_started(&self, action: BatchAction) {
        info!(%action, "starting to {}", action.verb());
    }

    fn on_chunk_started(&self, action: BatchAction, chunk: usize, size: usize) {
        info!(%action, chunk, size, "processing batch #{chunk} ({size} carts)");
    }

    fn on_chunk_failed(&self, action: BatchAction, chunk: usize, error: &sqlx::Error) {
        error!(%action, chunk, %error, "batch #{chunk} failed");
    }

    fn on_run_finished(&self, report: &BatchReport) {
        info!(
            action = %report.action,
            chunks = report.chunks.len(),
            affected = report.affected,
            "finished {}",
            report.action.verb()
        );
    }
}
