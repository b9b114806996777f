//! Watch command
//!
//! Activates the dashboard resources and prints the shared store every time
//! it changes, until Ctrl-C or the requested number of updates.

use anyhow::{bail, Context, Result};
use metalyzr_client::{Dashboard, SharedState, SharedStore};
use std::sync::Arc;
use std::time::Duration;

use super::{executor, load_config};
use crate::cli::WatchArgs;
use crate::output;

pub async fn run(args: WatchArgs, api_url: Option<&str>) -> Result<()> {
    let config = load_config(api_url)?;
    let interval = match args.interval {
        Some(0) => bail!("--interval must be at least 1 second"),
        Some(secs) => Some(Duration::from_secs(secs)),
        None => config.dashboard.refresh_interval(),
    };

    let store = Arc::new(
        SharedStore::from_config(&config.persistence).context("Failed to open dashboard state")?,
    );
    let dashboard = Dashboard::new(executor(&config)?, Arc::clone(&store), interval);
    let mut updates = store.subscribe();

    match interval {
        Some(every) => output::info(&format!(
            "Watching {} every {}s (Ctrl-C to stop)",
            config.api.base_url,
            every.as_secs()
        )),
        None => output::info(&format!("Fetching {} once", config.api.base_url)),
    }

    let mut last_error = None;
    print_snapshot(&updates.borrow_and_update(), &mut last_error);
    dashboard.activate();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut seen = 0usize;
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                print_snapshot(&snapshot, &mut last_error);

                seen += 1;
                if args.cycles.is_some_and(|cycles| seen >= cycles) {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                output::info("Stopping");
                break;
            }
        }
    }

    dashboard.deactivate();
    Ok(())
}

fn print_snapshot(state: &SharedState, last_error: &mut Option<String>) {
    let stats = state.stats();
    let updated = state
        .last_update()
        .map(|at| at.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    println!(
        "[{}] {} | tournaments {} | archetypes {} | decks {} | updated {}",
        chrono::Local::now().format("%H:%M:%S"),
        output::connectivity(state.connectivity()),
        stats.tournaments,
        stats.archetypes,
        stats.decks,
        updated
    );

    let newest = state.recent_errors().last().map(str::to_string);
    if let Some(message) = &newest {
        if Some(message) != last_error.as_ref() {
            output::error(message);
        }
    }
    *last_error = newest;
}
