//! Raw GET command

use anyhow::Result;
use metalyzr_client::RequestDescriptor;
use serde_json::Value;
use std::time::Duration;

use super::{executor, load_config, request_failed};
use crate::cli::GetArgs;
use crate::output;

pub async fn run(args: GetArgs, api_url: Option<&str>) -> Result<()> {
    let config = load_config(api_url)?;
    let executor = executor(&config)?;

    let mut request = RequestDescriptor::get(args.path);
    for (key, value) in args.query {
        request = request.query(key, value);
    }
    if let Some(retries) = args.retries {
        request = request.max_attempts(retries);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        request = request.timeout(Duration::from_millis(timeout_ms));
    }

    let spinner = output::spinner(&request.label());
    let result = executor.execute::<Value>(&request).await;
    spinner.finish_and_clear();

    output::json(&result.map_err(request_failed)?)
}
