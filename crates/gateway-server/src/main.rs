mod cli;
mod commands;
mod config;
mod server;

use clap::Parser;
use human_panic::setup_panic;

use crate::cli::{Cli, run_cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_panic!();
    shared::env::configure_env()?;

    // Parsed before logging so the configured verbosity applies from the start
    let cli = Cli::parse();
    shared::logging::configure_logging(&cli.log_level)?;

    run_cli(cli).await
}
