//! Al-Khair CLI - sync and browse school data from the terminal
//!
//! Pulls remote changes into the local database and answers the common
//! read-side questions (attendance, fees, homework) offline.

mod cli;
mod commands;
mod error;
#[cfg(test)]
mod tests;

use alkhair_core::remote::RemoteBackend;
use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::common::{load_config, open_school_data};
use crate::commands::completions::run_completions;
use crate::commands::run_and_close;
use crate::commands::watch::{resolve_interval, run_watch};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("alkhair=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Completions { shell, output } = &cli.command {
        return run_completions(*shell, output.as_deref());
    }

    let config = load_config(cli.db_path)?;
    let data = open_school_data(&config).await?;

    let interval = match cli.command {
        Commands::Watch { interval } => interval,
        command => return run_and_close(data, command).await,
    };

    let interval = if data.backend().is_configured() {
        resolve_interval(interval, config.sync_interval)
    } else {
        Err(CliError::RemoteNotConfigured)
    };
    match interval {
        Ok(interval) => run_watch(data, interval).await,
        Err(error) => {
            data.close().await;
            Err(error)
        }
    }
}
