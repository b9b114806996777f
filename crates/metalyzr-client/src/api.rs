//! Typed Metalyzr API
//!
//! `endpoints` builds the request descriptors; `MetalyzrApi` runs them through
//! a shared `RequestExecutor` and deserializes the payloads.

use crate::error::ClassifiedError;
use crate::executor::RequestExecutor;
use crate::request::RequestDescriptor;
use metalyzr_core::types::{
    AnalysisResponse, Archetype, ArchetypeDetails, Deck, HealthStatus, MatchupMatrixData,
    MetagameShareData, NewArchetype, NewTournament, Stats, Tournament, TournamentDetails,
    TournamentMetagame, WinrateConfidenceData,
};
use serde::Deserialize;
use std::sync::Arc;

/// Filters for the tournament list
#[derive(Debug, Clone, Default)]
pub struct TournamentQuery {
    pub format: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Filters for a tournament's decks
#[derive(Debug, Clone, Default)]
pub struct DeckQuery {
    pub archetype: Option<String>,
    pub limit: Option<u32>,
}

/// Filters for the archetype list
#[derive(Debug, Clone, Default)]
pub struct ArchetypeQuery {
    pub format: Option<String>,
    pub category: Option<String>,
}

/// Acknowledgement returned by write endpoints
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Request descriptors for every endpoint the client consumes
pub mod endpoints {
    use super::{ArchetypeQuery, DeckQuery, TournamentQuery};
    use crate::error::ClassifiedError;
    use crate::request::RequestDescriptor;
    use metalyzr_core::types::{NewArchetype, NewTournament};

    pub fn health() -> RequestDescriptor {
        RequestDescriptor::get("/health")
    }

    pub fn stats() -> RequestDescriptor {
        RequestDescriptor::get("/api/stats")
    }

    pub fn tournaments(query: &TournamentQuery) -> RequestDescriptor {
        RequestDescriptor::get("/api/tournaments")
            .query_opt("format", query.format.as_deref())
            .query_opt("limit", query.limit)
            .query_opt("offset", query.offset)
    }

    pub fn tournament(id: u64) -> RequestDescriptor {
        RequestDescriptor::get(format!("/api/tournaments/{}", id))
    }

    pub fn tournament_metagame(id: u64) -> RequestDescriptor {
        RequestDescriptor::get(format!("/api/tournaments/{}/metagame", id))
    }

    pub fn tournament_decks(id: u64, query: &DeckQuery) -> RequestDescriptor {
        RequestDescriptor::get(format!("/api/tournaments/{}/decks", id))
            .query_opt("archetype", query.archetype.as_deref())
            .query_opt("limit", query.limit)
    }

    pub fn create_tournament(tournament: &NewTournament) -> Result<RequestDescriptor, ClassifiedError> {
        RequestDescriptor::post("/api/tournaments")
            .json(tournament)
            .map_err(|e| ClassifiedError::parse(format!("Invalid tournament payload: {}", e)))
    }

    pub fn archetypes(query: &ArchetypeQuery) -> RequestDescriptor {
        RequestDescriptor::get("/api/archetypes")
            .query_opt("format", query.format.as_deref())
            .query_opt("category", query.category.as_deref())
    }

    pub fn archetype(id: u64) -> RequestDescriptor {
        RequestDescriptor::get(format!("/api/archetypes/{}", id))
    }

    pub fn archetype_decks(id: u64) -> RequestDescriptor {
        RequestDescriptor::get(format!("/api/archetypes/{}/decks", id))
    }

    pub fn archetype_formats() -> RequestDescriptor {
        RequestDescriptor::get("/api/archetypes/formats")
    }

    pub fn archetype_categories() -> RequestDescriptor {
        RequestDescriptor::get("/api/archetypes/categories")
    }

    pub fn create_archetype(archetype: &NewArchetype) -> Result<RequestDescriptor, ClassifiedError> {
        RequestDescriptor::post("/api/archetypes")
            .json(archetype)
            .map_err(|e| ClassifiedError::parse(format!("Invalid archetype payload: {}", e)))
    }

    pub fn metagame_update() -> RequestDescriptor {
        RequestDescriptor::post("/api/metagame/update")
    }

    pub fn metagame_share(format: &str, days: u32) -> RequestDescriptor {
        analysis("metagame_share", format, days)
    }

    pub fn winrate_confidence(format: &str, days: u32) -> RequestDescriptor {
        analysis("winrate_confidence", format, days)
    }

    pub fn matchup_matrix(format: &str, days: u32) -> RequestDescriptor {
        analysis("matchup_matrix", format, days)
    }

    fn analysis(kind: &str, format: &str, days: u32) -> RequestDescriptor {
        RequestDescriptor::get(format!("/api/metagame/analysis/{}/{}", kind, format))
            .query("days", days)
    }
}

/// Typed client over a shared executor
#[derive(Clone)]
pub struct MetalyzrApi {
    executor: Arc<RequestExecutor>,
}

impl MetalyzrApi {
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &Arc<RequestExecutor> {
        &self.executor
    }

    pub async fn health(&self) -> Result<HealthStatus, ClassifiedError> {
        self.executor.execute_data(&endpoints::health()).await
    }

    pub async fn stats(&self) -> Result<Stats, ClassifiedError> {
        self.executor.execute_data(&endpoints::stats()).await
    }

    pub async fn tournaments(&self, query: &TournamentQuery) -> Result<Vec<Tournament>, ClassifiedError> {
        self.executor.execute_data(&endpoints::tournaments(query)).await
    }

    pub async fn tournament(&self, id: u64) -> Result<TournamentDetails, ClassifiedError> {
        self.executor.execute_data(&endpoints::tournament(id)).await
    }

    pub async fn tournament_metagame(&self, id: u64) -> Result<TournamentMetagame, ClassifiedError> {
        self.executor.execute_data(&endpoints::tournament_metagame(id)).await
    }

    pub async fn tournament_decks(&self, id: u64, query: &DeckQuery) -> Result<Vec<Deck>, ClassifiedError> {
        self.executor.execute_data(&endpoints::tournament_decks(id, query)).await
    }

    pub async fn create_tournament(&self, tournament: &NewTournament) -> Result<Tournament, ClassifiedError> {
        self.executor.execute_data(&endpoints::create_tournament(tournament)?).await
    }

    pub async fn archetypes(&self, query: &ArchetypeQuery) -> Result<Vec<Archetype>, ClassifiedError> {
        self.executor.execute_data(&endpoints::archetypes(query)).await
    }

    pub async fn archetype(&self, id: u64) -> Result<ArchetypeDetails, ClassifiedError> {
        self.executor.execute_data(&endpoints::archetype(id)).await
    }

    pub async fn archetype_decks(&self, id: u64) -> Result<Vec<Deck>, ClassifiedError> {
        self.executor.execute_data(&endpoints::archetype_decks(id)).await
    }

    pub async fn archetype_formats(&self) -> Result<Vec<String>, ClassifiedError> {
        self.executor.execute_data(&endpoints::archetype_formats()).await
    }

    pub async fn archetype_categories(&self) -> Result<Vec<String>, ClassifiedError> {
        self.executor.execute_data(&endpoints::archetype_categories()).await
    }

    pub async fn create_archetype(&self, archetype: &NewArchetype) -> Result<Archetype, ClassifiedError> {
        self.executor.execute_data(&endpoints::create_archetype(archetype)?).await
    }

    pub async fn trigger_metagame_update(&self) -> Result<MessageResponse, ClassifiedError> {
        self.executor.execute(&endpoints::metagame_update()).await
    }

    // Analysis responses carry their own `data` field, so no envelope unwrapping

    pub async fn metagame_share(
        &self,
        format: &str,
        days: u32,
    ) -> Result<AnalysisResponse<Vec<MetagameShareData>>, ClassifiedError> {
        self.executor.execute(&endpoints::metagame_share(format, days)).await
    }

    pub async fn winrate_confidence(
        &self,
        format: &str,
        days: u32,
    ) -> Result<AnalysisResponse<Vec<WinrateConfidenceData>>, ClassifiedError> {
        self.executor.execute(&endpoints::winrate_confidence(format, days)).await
    }

    pub async fn matchup_matrix(
        &self,
        format: &str,
        days: u32,
    ) -> Result<AnalysisResponse<MatchupMatrixData>, ClassifiedError> {
        self.executor.execute(&endpoints::matchup_matrix(format, days)).await
    }
}
