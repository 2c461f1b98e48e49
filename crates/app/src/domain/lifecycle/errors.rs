//! Lifecycle Errors

use jiff::Timestamp;
use thiserror::Error;

use crate::domain::lifecycle::batch::BatchAction;

#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The reference time is too close to the minimum timestamp to derive a cutoff.
    #[error("invalid reference time {reference}")]
    InvalidReferenceTime {
        reference: Timestamp,
        #[source]
        source: jiff::Error,
    },

    /// A chunk failed and was rolled back. Chunks before it remain committed.
    #[error("{action} chunk #{chunk} failed after {completed} completed chunk(s)")]
    Chunk {
        action: BatchAction,
        chunk: usize,
        completed: usize,
        #[source]
        source: sqlx::Error,
    },

    /// Failed before any chunk was started.
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}
