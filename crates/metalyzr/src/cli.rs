//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand};

/// Metalyzr - tournament and metagame data from the command line
#[derive(Parser, Debug)]
#[command(name = "metalyzr")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// API base URL (overrides config file and METALYZR_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check backend health
    Health(HealthArgs),

    /// Show aggregate tournament, archetype and deck counts
    Stats(StatsArgs),

    /// Fetch any API path and print the JSON response
    Get(GetArgs),

    /// List tournaments
    Tournaments(TournamentsArgs),

    /// List archetypes
    Archetypes(ArchetypesArgs),

    /// Poll the dashboard endpoints and print every change
    Watch(WatchArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug)]
pub struct HealthArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// API path, e.g. /api/tournaments/7
    pub path: String,

    /// Query parameter as KEY=VALUE (repeatable)
    #[arg(long = "query", value_parser = parse_key_val)]
    pub query: Vec<(String, String)>,

    /// Maximum number of attempts
    #[arg(long)]
    pub retries: Option<u32>,

    /// Per-attempt timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

#[derive(Args, Debug)]
pub struct TournamentsArgs {
    /// Filter by format
    #[arg(short, long)]
    pub format: Option<String>,

    /// Maximum number of tournaments
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Number of tournaments to skip
    #[arg(long)]
    pub offset: Option<u32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ArchetypesArgs {
    /// Filter by format
    #[arg(short, long)]
    pub format: Option<String>,

    /// Filter by category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Refresh interval in seconds (defaults to the configured interval)
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Stop after this many store updates
    #[arg(long)]
    pub cycles: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved configuration
    Show(ConfigShowArgs),
}

#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    Ok((key.to_string(), value.to_string()))
}
