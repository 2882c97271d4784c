mod args;
mod commands;
mod logging;

use clap::Parser;

use args::Cli;
use ragline_core::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    let settings = config.settings()?;
    logging::init(&settings.logging, cli.command.debug());
    tracing::debug!(target: "cli", env = config.env_name(), "starting");

    commands::run(cli.command, &settings).await
}
