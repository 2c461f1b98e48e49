//! Cart lifecycle sweeper

use std::process;

use jiff::Timestamp;
use tracing::{error, info};

use cartkeeper_app::{context::AppContext, domain::lifecycle::batch::BatchAction};

use crate::config::{Command, ConfigError, SweeperConfig};

mod config;
mod jobs;
mod observability;
mod scheduler;
mod shutdown;

/// Cart lifecycle sweeper entry point
#[tokio::main]
pub async fn main() {
    // Load configuration from .env and CLI arguments
    let config = match SweeperConfig::load() {
        Ok(config) => config,
        Err(ConfigError::Cli(cli_error)) => cli_error.exit(),
        Err(config_error) => {
            #[expect(
                clippy::print_stderr,
                reason = "logging not initialized yet, must use eprintln for config errors"
            )]
            {
                eprintln!("Configuration error: {config_error}");
            }

            process::exit(2);
        }
    };

    if let Err(init_error) = observability::init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("{init_error}");
        }

        process::exit(1);
    }

    let app = match AppContext::from_database_url(
        &config.database.database_url,
        config.lifecycle.batch_size,
    )
    .await
    {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");

            process::exit(1);
        }
    };

    let (action, args) = match config.command {
        Command::Run(schedule) => {
            if let Err(signal_error) =
                scheduler::run(app.lifecycle, &schedule, shutdown::signal()).await
            {
                error!("failed to listen for shutdown signals: {signal_error}");

                process::exit(1);
            }

            return;
        }
        Command::MarkAbandoned(args) => (BatchAction::MarkAbandoned, args),
        Command::DeleteAbandoned(args) => (BatchAction::DeleteAbandoned, args),
    };

    let at = args.at.unwrap_or_else(Timestamp::now);

    match jobs::run(app.lifecycle.as_ref(), action, at).await {
        Ok(report) => info!(
            %action,
            affected = report.affected,
            chunks = report.chunks.len(),
            "one-shot run complete"
        ),
        Err(run_error) => {
            error!(%action, "run failed: {run_error}");

            process::exit(1);
        }
    }
}
