//! Metalyzr CLI - tournament and metagame data from the Metalyzr API
//!
//! This is the main entry point for the metalyzr command-line interface.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let api_url = cli.api_url.as_deref();
    match cli.command {
        Commands::Health(args) => commands::health::run(args, api_url).await,
        Commands::Stats(args) => commands::stats::run(args, api_url).await,
        Commands::Get(args) => commands::get::run(args, api_url).await,
        Commands::Tournaments(args) => commands::tournaments::run(args, api_url).await,
        Commands::Archetypes(args) => commands::archetypes::run(args, api_url).await,
        Commands::Watch(args) => commands::watch::run(args, api_url).await,
        Commands::Config(args) => commands::config::run(args, api_url),
    }
}

/// Initialize tracing with appropriate verbosity
///
/// `RUST_LOG` wins over the flags when set.
fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
