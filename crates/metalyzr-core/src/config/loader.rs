//! Hierarchical configuration loader with precedence
//!
//! Loads the client configuration from multiple sources, low to high:
//! 1. Embedded defaults (built into the binary)
//! 2. User config (~/.metalyzr/config.yaml)
//! 3. Environment variables (METALYZR_* prefix)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::types::ClientConfig;
use crate::utils::default_state_dir;
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde_yaml_ng::Value;
use std::env;
use std::fs;
use std::str::FromStr;
use tracing::debug;

/// Name of the user configuration file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.yaml";

const EMBEDDED_DEFAULTS: &str = "client-defaults.yaml";

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Directory holding the user configuration file
    config_dir: Utf8PathBuf,
}

impl HierarchicalConfigLoader {
    /// Create a loader rooted at the standard config directory (~/.metalyzr)
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_dir: default_state_dir()?,
        })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Load the client configuration with hierarchical precedence
    pub fn load(&self) -> Result<ClientConfig> {
        let mut merged = Self::load_embedded_defaults()?;

        let user_path = self.config_dir.join(CONFIG_FILE_NAME);
        if user_path.exists() {
            debug!("Loading user configuration from {}", user_path);
            let overlay = Self::load_yaml_file(&user_path)?;
            merge_yaml(&mut merged, overlay);
        }

        let config: ClientConfig = serde_yaml_ng::from_value(merged)
            .map_err(|e| Error::invalid_config(format!("Failed to resolve configuration: {}", e)))?;

        self.apply_env_overrides(config)
    }

    fn load_embedded_defaults() -> Result<Value> {
        let embedded_file = EmbeddedConfigs::get(EMBEDDED_DEFAULTS).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", EMBEDDED_DEFAULTS))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!(
                "Invalid UTF-8 in embedded config: {}",
                EMBEDDED_DEFAULTS
            ))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                EMBEDDED_DEFAULTS, e
            ))
        })
    }

    fn load_yaml_file(path: &Utf8Path) -> Result<Value> {
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))
    }

    /// Apply METALYZR_* environment variable overrides
    fn apply_env_overrides(&self, mut config: ClientConfig) -> Result<ClientConfig> {
        if let Ok(val) = env::var("METALYZR_API_URL") {
            if !val.trim().is_empty() {
                config.api.base_url = val;
            }
        }

        if let Some(val) = parse_env("METALYZR_TIMEOUT_MS")? {
            config.api.timeout_ms = val;
        }

        if let Some(val) = parse_env("METALYZR_RETRY_MAX_ATTEMPTS")? {
            config.retry.max_attempts = val;
        }

        if let Some(val) = parse_env("METALYZR_RETRY_BASE_DELAY_MS")? {
            config.retry.initial_delay_ms = val;
        }

        if let Some(val) = parse_env("METALYZR_REFRESH_INTERVAL_SECS")? {
            config.dashboard.refresh_interval_secs = val;
        }

        if let Some(val) = parse_env("METALYZR_PERSIST")? {
            config.persistence.enabled = val;
        }

        Ok(config)
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(val) => val
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::invalid_config(format!("{} has an invalid value: {:?}", name, val))),
        Err(_) => Ok(None),
    }
}

/// Recursively overlay `overlay` onto `base`; mappings merge, everything else replaces
fn merge_yaml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_yaml(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
