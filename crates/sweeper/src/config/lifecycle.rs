//! Lifecycle Config

use std::time::Duration;

use clap::Args;
use jiff::{SignedDuration, Timestamp};

use cartkeeper_app::domain::lifecycle::{
    batch::BATCH_SIZE,
    scopes::{ABANDON_AFTER, DELETE_AFTER},
};

use super::ConfigError;

/// Batch processing settings.
#[derive(Debug, Args)]
pub struct LifecycleConfig {
    /// Carts per chunk transaction
    #[arg(long, env = "LIFECYCLE_BATCH_SIZE", default_value_t = BATCH_SIZE)]
    pub batch_size: usize,
}

impl LifecycleConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Zero("batch size"));
        }

        Ok(())
    }
}

/// Job scheduling settings for `run`.
#[derive(Debug, Clone, Args)]
pub struct ScheduleConfig {
    /// Seconds between mark-abandoned runs
    #[arg(long, env = "MARK_ABANDONED_INTERVAL_SECS", default_value_t = 3_600)]
    pub mark_abandoned_interval_secs: u64,

    /// Seconds between delete-abandoned runs
    #[arg(long, env = "DELETE_ABANDONED_INTERVAL_SECS", default_value_t = 86_400)]
    pub delete_abandoned_interval_secs: u64,
}

impl ScheduleConfig {
    #[must_use]
    pub fn mark_abandoned_interval(&self) -> Duration {
        Duration::from_secs(self.mark_abandoned_interval_secs)
    }

    #[must_use]
    pub fn delete_abandoned_interval(&self) -> Duration {
        Duration::from_secs(self.delete_abandoned_interval_secs)
    }

    /// Each job must run more often than its idle window, or carts overstay it.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        validate_interval(
            "mark-abandoned interval",
            self.mark_abandoned_interval_secs,
            ABANDON_AFTER,
        )?;

        validate_interval(
            "delete-abandoned interval",
            self.delete_abandoned_interval_secs,
            DELETE_AFTER,
        )
    }
}

fn validate_interval(
    name: &'static str,
    secs: u64,
    window: SignedDuration,
) -> Result<(), ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Zero(name));
    }

    let within_window = i64::try_from(secs).is_ok_and(|secs| secs < window.as_secs());

    if !within_window {
        return Err(ConfigError::IntervalTooLong { name, secs, window });
    }

    Ok(())
}

/// Arguments for a one-shot lifecycle run.
#[derive(Debug, Clone, Args)]
pub struct OneShotArgs {
    /// Reference time as an RFC 3339 timestamp; defaults to now
    #[arg(long)]
    pub at: Option<Timestamp>,
}
