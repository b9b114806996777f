//! Health command

use anyhow::Result;

use super::{api, load_config, request_failed};
use crate::cli::HealthArgs;
use crate::output;

pub async fn run(args: HealthArgs, api_url: Option<&str>) -> Result<()> {
    let config = load_config(api_url)?;
    let api = api(&config)?;

    let spinner = output::spinner(&format!("Checking {}...", config.api.base_url));
    let result = api.health().await;
    spinner.finish_and_clear();
    let health = result.map_err(request_failed)?;

    if args.json {
        return output::json(&health);
    }

    if health.is_healthy() {
        output::success(&format!("Backend is {}", health.status));
    } else {
        output::warning(&format!("Backend reports '{}'", health.status));
    }
    if let Some(timestamp) = &health.timestamp {
        output::kv("Timestamp", timestamp);
    }
    Ok(())
}
