//! Durable storage for the shared dashboard state
//!
//! Only the stats and the last-update timestamp survive a restart. They are
//! stored as `{"state": {...}, "version": 0}` under a namespaced key.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use metalyzr_core::types::{PersistenceConfig, Stats};
use metalyzr_core::utils::default_state_dir;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

/// Current on-disk format version
pub const STATE_VERSION: u32 = 0;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid persisted state: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported persisted state version {0}")]
    UnsupportedVersion(u32),
}

impl StoreError {
    fn io(path: &Utf8Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_string(),
            source,
        }
    }
}

/// The persisted subset of the shared state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize)]
struct PersistedRecord {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

pub fn encode(state: &PersistedState) -> Result<String, StoreError> {
    let record = PersistedRecord {
        state: state.clone(),
        version: STATE_VERSION,
    };
    Ok(serde_json::to_string(&record)?)
}

pub fn decode(raw: &str) -> Result<PersistedState, StoreError> {
    let record: PersistedRecord = serde_json::from_str(raw)?;
    if record.version > STATE_VERSION {
        return Err(StoreError::UnsupportedVersion(record.version));
    }
    Ok(record.state)
}

/// Storage backend for [`PersistedState`]
pub trait StatePersistence: Send + Sync {
    /// Previously saved state, `None` when nothing was saved yet
    fn load(&self) -> Result<Option<PersistedState>, StoreError>;

    fn save(&self, state: &PersistedState) -> Result<(), StoreError>;
}

/// JSON file at `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FilePersistence {
    path: Utf8PathBuf,
}

impl FilePersistence {
    pub fn new(dir: impl AsRef<Utf8Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", key)),
        }
    }

    /// Backend for a persistence config; `dir` defaults to `~/.metalyzr`
    pub fn from_config(config: &PersistenceConfig) -> metalyzr_core::Result<Self> {
        let dir = match &config.dir {
            Some(dir) => Utf8PathBuf::from(dir),
            None => default_state_dir()?,
        };
        Ok(Self::new(dir, &config.key))
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl StatePersistence for FilePersistence {
    fn load(&self) -> Result<Option<PersistedState>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => decode(&raw).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }

    fn save(&self, state: &PersistedState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        // Write-then-rename so a crash never leaves a truncated file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, encode(state)?).map_err(|e| StoreError::io(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))
    }
}

/// In-process backend, mostly for tests
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    slot: Mutex<Option<String>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    /// Raw stored record
    pub fn contents(&self) -> Option<String> {
        match self.slot.lock() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl StatePersistence for MemoryPersistence {
    fn load(&self) -> Result<Option<PersistedState>, StoreError> {
        self.contents().map(|raw| decode(&raw)).transpose()
    }

    fn save(&self, state: &PersistedState) -> Result<(), StoreError> {
        let raw = encode(state)?;
        let mut slot = match self.slot.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = Some(raw);
        Ok(())
    }
}
