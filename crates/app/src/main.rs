//! Procura console - Main Entry Point
//!
//! Loads configuration, installs logging and runs the interactive shell.

use std::sync::Arc;

use clap::Parser;
use procura::{Cli, Command, Console, Shell, StderrNotifier, TerminalRedirect};
use procura_infrastructure::{AppConfig, FileSessionStorage};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_str())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command() {
        Command::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Command::Shell => {
            tracing::info!("Starting Procura console v{}", env!("CARGO_PKG_VERSION"));
            let storage = Arc::new(FileSessionStorage::new(config.session_dir()));
            let interval = config.background_interval();
            let console = Console::build(
                config,
                Arc::new(TerminalRedirect::new()),
                Arc::new(StderrNotifier),
                storage,
            )?;
            let background = console.session.spawn_background_refresh(interval);
            let result = Shell::new(console).run().await;
            background.abort();
            result?;
        }
    }

    Ok(())
}
