//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Procura procurement console.
#[derive(Debug, Parser)]
#[command(name = "procura", version, about)]
pub struct Cli {
    /// Configuration file; `procura.toml` in the working directory when
    /// omitted.
    #[arg(long, short, env = "PROCURA_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Start an interactive session (the default).
    Shell,
    /// Print the effective configuration as JSON and exit.
    ShowConfig,
}

impl Cli {
    /// The command to run, defaulting to the shell.
    #[must_use]
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Shell)
    }
}
