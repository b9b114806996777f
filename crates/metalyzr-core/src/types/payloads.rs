//! Payloads exchanged with the Metalyzr API
//!
//! Optional fields mirror what the service may omit; unknown fields are
//! ignored so the client tolerates additive server changes.

use serde::{Deserialize, Serialize};

/// Aggregate counters shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub tournaments: u64,
    pub archetypes: u64,
    pub decks: u64,
}

/// Response of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl HealthStatus {
    /// The service reports itself fully healthy
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Tournament summary as returned by the listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: u64,
    pub name: String,
    pub format: String,
    pub date: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub total_players: Option<u32>,
    #[serde(default)]
    pub rounds: Option<u32>,
    #[serde(default)]
    pub is_complete: bool,
}

/// Full tournament record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentDetails {
    #[serde(flatten)]
    pub summary: Tournament,
    #[serde(default)]
    pub organizer: Option<String>,
    #[serde(default)]
    pub tournament_type: Option<String>,
    #[serde(default)]
    pub source_site: Option<String>,
    #[serde(default)]
    pub decks_count: u64,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Archetype breakdown of a single tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentMetagame {
    pub tournament_id: u64,
    pub tournament_name: String,
    pub total_decks: u64,
    #[serde(default)]
    pub metagame: Vec<MetagameEntry>,
}

/// One archetype's share within a tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetagameEntry {
    pub archetype: String,
    #[serde(default)]
    pub category: Option<String>,
    pub deck_count: u64,
    pub meta_share: f64,
    #[serde(default)]
    pub avg_wins: f64,
    #[serde(default)]
    pub best_position: Option<u32>,
}

/// A registered deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: u64,
    pub player_name: String,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub draws: u32,
    #[serde(default)]
    pub archetype: Option<String>,
    #[serde(default)]
    pub color_identity: Option<String>,
    #[serde(default)]
    pub total_cards: Option<u32>,
}

/// Archetype summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    pub id: u64,
    pub name: String,
    pub format: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color_identity: Option<String>,
    #[serde(default)]
    pub key_cards: Option<serde_json::Value>,
    #[serde(default)]
    pub deck_count: Option<u64>,
}

/// Full archetype record with aggregate deck statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeDetails {
    #[serde(flatten)]
    pub summary: Archetype,
    #[serde(default)]
    pub variations: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub statistics: Option<ArchetypeStatistics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeStatistics {
    pub total_decks: u64,
    pub avg_wins: f64,
    pub avg_losses: f64,
    #[serde(default)]
    pub best_position: Option<u32>,
}

/// Body of `POST /api/tournaments`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTournament {
    pub name: String,
    pub format: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_players: Option<u32>,
}

/// Body of `POST /api/archetypes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewArchetype {
    pub name: String,
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Wrapper returned by the metagame analysis endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse<T> {
    pub format: String,
    pub start_date: String,
    pub end_date: String,
    pub analysis_type: String,
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetagameShareData {
    pub archetype: String,
    pub count: u64,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinrateConfidenceData {
    pub archetype: String,
    pub winrate: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupMatrixData {
    pub archetypes: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
}
