use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "octopush")]
#[command(about = "Push notifications for FHIR ServiceRequest writes")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./octopush.toml when present)
    #[arg(short, long, global = true, env = "OCTOPUSH_CONFIG")]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a recorded write event through the push pipeline
    Replay(ReplayArgs),
    /// Print the effective configuration
    Config,
}

/// Operation assumed when the event file holds a bare resource.
#[derive(Clone, Copy, ValueEnum, Default)]
pub enum Operation {
    #[default]
    Create,
    Update,
    Delete,
}

#[derive(clap::Args)]
pub struct ReplayArgs {
    /// JSON file with the resources to serve (Bundle, array or single resource)
    #[arg(short, long)]
    pub resources: PathBuf,
    /// JSON file with the write event, or the written resource itself
    #[arg(short, long)]
    pub event: PathBuf,
    /// Operation for a bare resource event file
    #[arg(long, default_value = "create")]
    pub operation: Operation,
    /// Build and print the payload without contacting the gateway
    #[arg(long)]
    pub dry_run: bool,
}
