use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Persistence service for development tasks, agent interactions and invariants.
#[derive(Debug, Parser)]
#[command(name = "dev-memory", version)]
pub struct Cli {
    /// JSON settings file (falls back to `DEV_MEMORY_CONFIG`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Clone, Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Do not replay migrations before binding.
        #[arg(long)]
        skip_migrations: bool,
    },
    /// Replay migrations and exit.
    Migrate,
    /// Upsert invariants from a JSON array file.
    SeedInvariants {
        file: PathBuf,
    },
}

impl Cli {
    /// The requested subcommand, `serve` when none was given.
    pub fn subcommand(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve {
            skip_migrations: false,
        })
    }
}
