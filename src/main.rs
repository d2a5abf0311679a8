//! # dev-memory
//!
//! Binary entry point: loads settings, installs logging and dispatches to
//! `serve`, `migrate` or `seed-invariants`.

#![deny(unsafe_code)]

mod cli;
mod startup;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use dev_memory_settings::Settings;
use dev_memory_telemetry::{init_telemetry, TelemetryConfig};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    let settings = match Settings::load(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("dev-memory: failed to load settings: {e}");
            return ExitCode::FAILURE;
        }
    };

    let telemetry = TelemetryConfig {
        log_level: settings.logging.level.clone(),
        format: settings.logging.format,
    };
    if let Err(e) = init_telemetry(&telemetry) {
        eprintln!("dev-memory: failed to initialise logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(args.subcommand(), &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = format!("{e:#}"), "dev-memory exited with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, settings: &Settings) -> Result<()> {
    match command {
        Command::Serve { skip_migrations } => {
            info!(addr = %settings.bind_addr(), "starting dev-memory");
            startup::serve(settings, skip_migrations)
                .await
                .context("failed to start server")?;
        }
        Command::Migrate => {
            let db = startup::open_database(settings)?;
            let applied = startup::migrate(&db, settings)?;
            info!(applied, "migrations complete");
        }
        Command::SeedInvariants { file } => {
            let invariants = startup::read_seed_file(&file)?;
            let db = startup::open_database(settings)?;
            let seeded = startup::seed_invariants(&db, &invariants)
                .with_context(|| format!("seeding from {}", file.display()))?;
            info!(seeded, "invariants seeded");
        }
    }
    Ok(())
}
