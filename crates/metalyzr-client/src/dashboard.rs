//! Admin dashboard wiring
//!
//! Four polled resources whose callbacks feed the shared store: stats update
//! the counters and the last-update stamp, health drives connectivity, and
//! failures are written to the recent-error log.

use crate::api::{endpoints, ArchetypeQuery, TournamentQuery};
use crate::error::ClassifiedError;
use crate::executor::RequestExecutor;
use crate::resource::{Resource, ResourceOptions};
use crate::store::{Connectivity, SharedStore};
use metalyzr_core::types::{Archetype, HealthStatus, Stats, Tournament};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Outcome of [`Dashboard::refresh_all`]
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub failures: Vec<(&'static str, ClassifiedError)>,
}

impl RefreshReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    fn record<T>(&mut self, name: &'static str, result: Result<T, ClassifiedError>) {
        if let Err(e) = result {
            self.failures.push((name, e));
        }
    }
}

pub struct Dashboard {
    store: Arc<SharedStore>,
    stats: Resource<Stats>,
    health: Resource<HealthStatus>,
    tournaments: Resource<Vec<Tournament>>,
    archetypes: Resource<Vec<Archetype>>,
}

impl Dashboard {
    /// Build the dashboard resources; nothing is fetched until `activate`
    pub fn new(
        executor: Arc<RequestExecutor>,
        store: Arc<SharedStore>,
        refresh_interval: Option<Duration>,
    ) -> Self {
        let stats = {
            let on_success = Arc::clone(&store);
            let on_error = Arc::clone(&store);
            Resource::new(
                Arc::clone(&executor),
                endpoints::stats(),
                ResourceOptions::new()
                    .refresh_interval(refresh_interval)
                    .on_success(move |stats: &Stats| {
                        on_success.set_stats(*stats);
                        on_success.update_last_update();
                    })
                    .on_error(move |e| {
                        on_error.set_status(Connectivity::Offline);
                        on_error.add_error(format!("Stats error: {}", e.message()));
                    }),
            )
        };

        let health = {
            let on_success = Arc::clone(&store);
            let on_error = Arc::clone(&store);
            Resource::new(
                Arc::clone(&executor),
                endpoints::health(),
                ResourceOptions::new()
                    .refresh_interval(refresh_interval)
                    .on_success(move |health: &HealthStatus| {
                        let connectivity = if health.is_healthy() {
                            Connectivity::Online
                        } else {
                            Connectivity::Degraded
                        };
                        on_success.set_status(connectivity);
                    })
                    .on_error(move |_| on_error.set_status(Connectivity::Offline)),
            )
        };

        let tournaments = Resource::new(
            Arc::clone(&executor),
            endpoints::tournaments(&TournamentQuery::default()),
            ResourceOptions::new().refresh_interval(refresh_interval),
        );

        let archetypes = Resource::new(
            executor,
            endpoints::archetypes(&ArchetypeQuery::default()),
            ResourceOptions::new().refresh_interval(refresh_interval),
        );

        Self {
            store,
            stats,
            health,
            tournaments,
            archetypes,
        }
    }

    /// Fetch everything once and start polling
    ///
    /// Must be called from within a Tokio runtime.
    pub fn activate(&self) {
        info!("Activating dashboard resources");
        self.stats.activate();
        self.health.activate();
        self.tournaments.activate();
        self.archetypes.activate();
    }

    pub fn deactivate(&self) {
        self.stats.deactivate();
        self.health.deactivate();
        self.tournaments.deactivate();
        self.archetypes.deactivate();
    }

    /// Refetch all four resources concurrently
    pub async fn refresh_all(&self) -> RefreshReport {
        let (stats, health, tournaments, archetypes) = futures::join!(
            self.stats.refetch(),
            self.health.refetch(),
            self.tournaments.refetch(),
            self.archetypes.refetch(),
        );

        let mut report = RefreshReport::default();
        report.record("stats", stats);
        report.record("health", health);
        report.record("tournaments", tournaments);
        report.record("archetypes", archetypes);
        report
    }

    pub fn store(&self) -> &Arc<SharedStore> {
        &self.store
    }

    pub fn stats(&self) -> &Resource<Stats> {
        &self.stats
    }

    pub fn health(&self) -> &Resource<HealthStatus> {
        &self.health
    }

    pub fn tournaments(&self) -> &Resource<Vec<Tournament>> {
        &self.tournaments
    }

    pub fn archetypes(&self) -> &Resource<Vec<Archetype>> {
        &self.archetypes
    }
}
