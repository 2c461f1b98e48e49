//! Batch processing of lifecycle transitions.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    sync::Arc,
};

use jiff::Timestamp;
use tracing::debug;

use crate::{
    database::Db,
    domain::{
        carts::models::CartUuid,
        lifecycle::{
            errors::LifecycleError,
            observer::{BatchObserver, TracingObserver},
            repository::PgLifecycleRepository,
            scopes::LifecycleScope,
        },
    },
};

/// Default number of carts per chunk.
pub const BATCH_SIZE: usize = 1000;

/// A bulk lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchAction {
    /// Flag abandonable carts as abandoned.
    MarkAbandoned,

    /// Delete deletable carts together with their items.
    DeleteAbandoned,
}

impl BatchAction {
    /// The carts this action applies to.
    #[must_use]
    pub const fn scope(self) -> LifecycleScope {
        match self {
            Self::MarkAbandoned => LifecycleScope::ABANDONABLE,
            Self::DeleteAbandoned => LifecycleScope::DELETABLE,
        }
    }

    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::MarkAbandoned => "mark carts as abandoned",
            Self::DeleteAbandoned => "delete abandoned carts",
        }
    }
}

impl Display for BatchAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::MarkAbandoned => "mark abandoned",
            Self::DeleteAbandoned => "delete abandoned",
        })
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub action: BatchAction,

    /// Size of each committed chunk, in processing order.
    pub chunks: Vec<usize>,

    /// Total carts transitioned.
    pub affected: usize,
}

impl BatchReport {
    fn new(action: BatchAction) -> Self {
        Self {
            action,
            chunks: Vec::new(),
            affected: 0,
        }
    }
}

/// Applies a [`BatchAction`] to every cart in its scope, in chunks.
///
/// Carts are visited in UUID order with a keyset cursor, and each chunk commits in its own
/// transaction. A failing chunk is rolled back and ends the run; earlier chunks stay
/// committed and the next run picks up whatever is still in scope.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    db: Db,
    repository: PgLifecycleRepository,
    batch_size: usize,
    observer: Arc<dyn BatchObserver>,
}

impl BatchProcessor {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgLifecycleRepository::new(),
            batch_size: BATCH_SIZE,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Use chunks of `batch_size` carts. Zero is treated as one.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn BatchObserver>) -> Self {
        self.observer = observer;
        self
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Run `action` over every cart in scope at `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidReferenceTime`] when no cutoff can be derived from
    /// `reference`, or [`LifecycleError::Chunk`] when a chunk fails.
    pub async fn run(
        &self,
        action: BatchAction,
        reference: Timestamp,
    ) -> Result<BatchReport, LifecycleError> {
        let cutoff = action.scope().cutoff(reference)?;

        self.observer.on_run_started(action);

        let mut report = BatchReport::new(action);
        let mut cursor = None;

        loop {
            let chunk = report.chunks.len() + 1;

            let processed = match self.process_chunk(action, chunk, cutoff, cursor).await {
                Ok(processed) => processed,
                Err(source) => {
                    self.observer.on_chunk_failed(action, chunk, &source);

                    return Err(LifecycleError::Chunk {
                        action,
                        chunk,
                        completed: report.chunks.len(),
                        source,
                    });
                }
            };

            let Some(last) = processed.last().copied() else {
                break;
            };

            report.chunks.push(processed.len());
            report.affected += processed.len();

            if processed.len() < self.batch_size {
                break;
            }

            cursor = Some(last);
        }

        self.observer.on_run_finished(&report);

        Ok(report)
    }

    /// Lock the next chunk after `cursor`, apply `action` to it and commit.
    ///
    /// Returns the chunk's carts in UUID order, or nothing once the scope is exhausted.
    async fn process_chunk(
        &self,
        action: BatchAction,
        chunk: usize,
        cutoff: Timestamp,
        cursor: Option<CartUuid>,
    ) -> Result<Vec<CartUuid>, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let carts = self
            .repository
            .lock_chunk(&mut tx, action.scope(), cutoff, cursor, self.batch_size)
            .await?;

        if carts.is_empty() {
            tx.commit().await?;

            return Ok(carts);
        }

        self.observer.on_chunk_started(action, chunk, carts.len());

        let rows_affected = match action {
            BatchAction::MarkAbandoned => self.repository.mark_abandoned(&mut tx, &carts).await?,
            BatchAction::DeleteAbandoned => self.repository.delete_carts(&mut tx, &carts).await?,
        };

        tx.commit().await?;

        debug!(%action, chunk, ?cursor, rows_affected, "committed chunk");

        Ok(carts)
    }
}
