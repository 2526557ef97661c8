mod cli;
mod commands;
mod output;

use anyhow::{Result, anyhow};
use clap::Parser;

use cli::{Cli, Commands};
use octopush_cli::config::loader::load_config;
use octopush_cli::observability::init_tracing_with_level;
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let cfg = load_config(cli.config.as_deref()).map_err(|e| anyhow!(e))?;
    init_tracing_with_level(&cfg.logging.level);

    match &cli.command {
        Commands::Replay(args) => commands::replay::replay(&cfg, args).await?,
        Commands::Config => commands::show_config(&cfg, cli.config.as_deref())?,
    }

    Ok(())
}
