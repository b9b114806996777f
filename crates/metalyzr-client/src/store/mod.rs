//! Shared dashboard store
//!
//! A single observable record of aggregate stats, backend connectivity, the
//! last refresh time and a bounded log of recent errors. Setters are atomic
//! with respect to each other and never fail; persistence problems are logged.

mod persistence;

pub use persistence::{
    FilePersistence, MemoryPersistence, PersistedState, StatePersistence, StoreError,
    STATE_VERSION,
};

use chrono::{DateTime, Utc};
use metalyzr_core::types::{PersistenceConfig, Stats};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Number of errors kept in the recent-error log
pub const MAX_RECENT_ERRORS: usize = 10;

/// Backend reachability as last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    Online,
    Offline,
    Degraded,
    #[default]
    Checking,
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Connectivity::Online => "online",
            Connectivity::Offline => "offline",
            Connectivity::Degraded => "degraded",
            Connectivity::Checking => "checking",
        };
        f.write_str(name)
    }
}

/// Partial stats update; absent counters keep their current value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsUpdate {
    pub tournaments: Option<u64>,
    pub archetypes: Option<u64>,
    pub decks: Option<u64>,
}

impl StatsUpdate {
    fn apply(&self, stats: &mut Stats) {
        if let Some(tournaments) = self.tournaments {
            stats.tournaments = tournaments;
        }
        if let Some(archetypes) = self.archetypes {
            stats.archetypes = archetypes;
        }
        if let Some(decks) = self.decks {
            stats.decks = decks;
        }
    }
}

impl From<Stats> for StatsUpdate {
    fn from(stats: Stats) -> Self {
        Self {
            tournaments: Some(stats.tournaments),
            archetypes: Some(stats.archetypes),
            decks: Some(stats.decks),
        }
    }
}

/// Snapshot of the shared store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SharedState {
    stats: Stats,
    connectivity: Connectivity,
    last_update: Option<DateTime<Utc>>,
    recent_errors: VecDeque<String>,
}

impl SharedState {
    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    /// Recent errors, oldest first
    pub fn recent_errors(&self) -> impl Iterator<Item = &str> {
        self.recent_errors.iter().map(String::as_str)
    }

    pub fn error_count(&self) -> usize {
        self.recent_errors.len()
    }

    fn persisted(&self) -> PersistedState {
        PersistedState {
            stats: self.stats,
            last_update: self.last_update,
        }
    }

    fn push_error(&mut self, message: String) {
        self.recent_errors.push_back(message);
        while self.recent_errors.len() > MAX_RECENT_ERRORS {
            self.recent_errors.pop_front();
        }
    }
}

pub struct SharedStore {
    state: watch::Sender<SharedState>,
    persistence: Option<Arc<dyn StatePersistence>>,
}

impl Default for SharedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedStore {
    /// In-memory store with default state
    pub fn new() -> Self {
        let (state, _) = watch::channel(SharedState::default());
        Self {
            state,
            persistence: None,
        }
    }

    /// Store rehydrated from `persistence` and saved back to it on every change
    ///
    /// Unreadable persisted state is logged and replaced by defaults.
    pub fn with_persistence(persistence: Arc<dyn StatePersistence>) -> Self {
        let mut initial = SharedState::default();
        match persistence.load() {
            Ok(Some(saved)) => {
                debug!("Rehydrated dashboard state");
                initial.stats = saved.stats;
                initial.last_update = saved.last_update;
            }
            Ok(None) => {}
            Err(e) => warn!("Ignoring persisted dashboard state: {}", e),
        }

        let (state, _) = watch::channel(initial);
        Self {
            state,
            persistence: Some(persistence),
        }
    }

    /// File-backed store when persistence is enabled, in-memory otherwise
    pub fn from_config(config: &PersistenceConfig) -> metalyzr_core::Result<Self> {
        if !config.enabled {
            return Ok(Self::new());
        }
        let backend = FilePersistence::from_config(config)?;
        debug!("Persisting dashboard state to {}", backend.path());
        Ok(Self::with_persistence(Arc::new(backend)))
    }

    pub fn snapshot(&self) -> SharedState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SharedState> {
        self.state.subscribe()
    }

    pub fn stats(&self) -> Stats {
        self.state.borrow().stats
    }

    pub fn connectivity(&self) -> Connectivity {
        self.state.borrow().connectivity
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.state.borrow().last_update
    }

    pub fn recent_errors(&self) -> Vec<String> {
        self.state.borrow().recent_errors.iter().cloned().collect()
    }

    /// Merge the given counters into the current stats
    pub fn set_stats(&self, update: impl Into<StatsUpdate>) {
        let update = update.into();
        self.mutate(|state| update.apply(&mut state.stats));
    }

    pub fn set_status(&self, connectivity: Connectivity) {
        self.mutate(|state| state.connectivity = connectivity);
    }

    /// Append to the error log, evicting the oldest entry beyond the cap
    pub fn add_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.mutate(|state| state.push_error(message));
    }

    pub fn clear_errors(&self) {
        self.mutate(|state| state.recent_errors.clear());
    }

    /// Stamp the current time as the last successful refresh
    pub fn update_last_update(&self) {
        self.set_last_update(Utc::now());
    }

    pub fn set_last_update(&self, at: DateTime<Utc>) {
        self.mutate(|state| state.last_update = Some(at));
    }

    // Persisting inside the watch lock keeps saves in mutation order
    fn mutate(&self, apply: impl FnOnce(&mut SharedState)) {
        self.state.send_modify(|state| {
            apply(state);
            if let Some(persistence) = &self.persistence {
                if let Err(e) = persistence.save(&state.persisted()) {
                    warn!("Failed to persist dashboard state: {}", e);
                }
            }
        });
    }
}
