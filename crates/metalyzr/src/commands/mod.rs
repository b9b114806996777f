//! Command implementations

pub mod archetypes;
pub mod config;
pub mod get;
pub mod health;
pub mod stats;
pub mod tournaments;
pub mod watch;

use anyhow::{Context, Result};
use metalyzr_client::{ClassifiedError, MetalyzrApi, RequestExecutor};
use metalyzr_core::{ClientConfig, HierarchicalConfigLoader};
use std::sync::Arc;
use tracing::debug;

/// Resolve the configuration: embedded defaults, user file, env, then `--api-url`
pub fn load_config(api_url: Option<&str>) -> Result<ClientConfig> {
    let loader = HierarchicalConfigLoader::new().context("Failed to locate config directory")?;
    let mut config = loader.load().context("Failed to load configuration")?;
    if let Some(url) = api_url {
        config.api.base_url = url.to_string();
    }
    debug!("Using API at {}", config.api.base_url);
    Ok(config)
}

pub fn executor(config: &ClientConfig) -> Result<Arc<RequestExecutor>> {
    let executor = RequestExecutor::from_config(config).context("Failed to create request executor")?;
    Ok(Arc::new(executor))
}

pub fn api(config: &ClientConfig) -> Result<MetalyzrApi> {
    Ok(MetalyzrApi::new(executor(config)?))
}

/// Attach the error kind and status to a classified error for display
pub fn request_failed(err: ClassifiedError) -> anyhow::Error {
    match err.status_code() {
        Some(status) => anyhow::anyhow!("{} ({}, status {})", err.message(), err.kind(), status),
        None => anyhow::anyhow!("{} ({})", err.message(), err.kind()),
    }
}
