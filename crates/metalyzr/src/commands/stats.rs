//! Stats command
//!
//! Fetches the aggregate counters through the same wiring as the dashboard,
//! so the persisted store is refreshed as a side effect.

use anyhow::{Context, Result};
use metalyzr_client::{Dashboard, SharedStore};
use std::sync::Arc;

use super::{executor, load_config, request_failed};
use crate::cli::StatsArgs;
use crate::output;

pub async fn run(args: StatsArgs, api_url: Option<&str>) -> Result<()> {
    let config = load_config(api_url)?;
    let store = Arc::new(
        SharedStore::from_config(&config.persistence).context("Failed to open dashboard state")?,
    );
    let dashboard = Dashboard::new(executor(&config)?, Arc::clone(&store), None);

    let spinner = output::spinner("Fetching stats...");
    let result = dashboard.stats().refetch().await;
    spinner.finish_and_clear();

    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            if let Some(at) = store.last_update() {
                output::info(&format!("Last successful update: {}", at.to_rfc3339()));
            }
            return Err(request_failed(e));
        }
    };

    if args.json {
        return output::json(&stats);
    }

    output::header("Metalyzr stats");
    output::kv("Tournaments", &stats.tournaments.to_string());
    output::kv("Archetypes", &stats.archetypes.to_string());
    output::kv("Decks", &stats.decks.to_string());
    Ok(())
}
