//! Sweeper configuration module

use clap::{Parser, Subcommand};
use jiff::SignedDuration;
use thiserror::Error;

use crate::config::{
    db::DatabaseConfig,
    lifecycle::{LifecycleConfig, OneShotArgs, ScheduleConfig},
    observability::LoggingConfig,
};

pub(crate) mod db;
pub(crate) mod lifecycle;
pub(crate) mod observability;

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{name} of {secs}s must be shorter than the {window:#} idle window")]
    IntervalTooLong {
        name: &'static str,
        secs: u64,
        window: SignedDuration,
    },
}

/// Cart lifecycle sweeper configuration
#[derive(Debug, Parser)]
#[command(
    name = "cartkeeper-sweeper",
    about = "Marks idle carts as abandoned and deletes stale abandoned carts",
    long_about = None
)]
pub struct SweeperConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Cart database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Batch processing settings.
    #[command(flatten)]
    pub lifecycle: LifecycleConfig,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run both lifecycle jobs on their intervals until interrupted
    Run(ScheduleConfig),

    /// Mark every abandonable cart as abandoned, once
    MarkAbandoned(OneShotArgs),

    /// Delete every deletable cart and its items, once
    DeleteAbandoned(OneShotArgs),
}

impl SweeperConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed or is out of range
    pub(crate) fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        let config = Self::try_parse()?;

        config.validate()?;

        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        self.lifecycle.validate()?;

        match &self.command {
            Command::Run(schedule) => schedule.validate(),
            Command::MarkAbandoned(_) | Command::DeleteAbandoned(_) => Ok(()),
        }
    }
}
