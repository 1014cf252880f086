use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Divisions
// ---------------------------------------------------------------------------

/// Competition tier. Each division has its own player table and maps to a
/// fixed upstream competition id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Division {
    Primera,
    Segunda,
    Tercera,
}

impl Division {
    /// Fixed partition priority order: availability updates and player-id
    /// collection walk the divisions in this sequence.
    pub const ALL: [Division; 3] = [Division::Primera, Division::Segunda, Division::Tercera];

    /// Name of this division's player table.
    pub fn player_table(self) -> &'static str {
        match self {
            Division::Primera => "players_primera",
            Division::Segunda => "players_segunda",
            Division::Tercera => "players_tercera",
        }
    }

    /// Upstream provider competition id for this division's fixtures/odds.
    pub fn competition_id(self) -> u32 {
        match self {
            Division::Primera => 140,
            Division::Segunda => 141,
            Division::Tercera => 435,
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "primera" => Some(Division::Primera),
            "segunda" => Some(Division::Segunda),
            "tercera" => Some(Division::Tercera),
            _ => None,
        }
    }
}

impl std::fmt::Display for Division {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Division::Primera => "primera",
            Division::Segunda => "segunda",
            Division::Tercera => "tercera",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Player availability
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AvailabilityStatus {
    Available,
    Injured,
    Suspended,
}

impl std::fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AvailabilityStatus::Available => "AVAILABLE",
            AvailabilityStatus::Injured => "INJURED",
            AvailabilityStatus::Suspended => "SUSPENDED",
        };
        write!(f, "{s}")
    }
}

/// One authoritative status per player per division partition. Recomputed
/// whole on every sync; no history is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerAvailability {
    pub player_id: i64,
    pub status: AvailabilityStatus,
    pub reason: Option<String>,
    pub season: u16,
}

impl PlayerAvailability {
    pub fn available(player_id: i64, season: u16) -> Self {
        Self {
            player_id,
            status: AvailabilityStatus::Available,
            reason: None,
            season,
        }
    }
}

/// Per-matchday card totals for one player/season. Read-only input, owned by
/// the match-recording subsystem; consumed only for suspension evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRecord {
    pub player_id: i64,
    pub season: u16,
    pub matchday: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
}

// ---------------------------------------------------------------------------
// Betting markets
// ---------------------------------------------------------------------------

/// A provider fixture, reduced to what bet generation needs.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub id: i64,
    pub home_team: String,
    pub away_team: String,
    pub home_crest: String,
    pub away_crest: String,
}

/// Transient per-fixture candidate produced by the market selector.
/// `bet_type` and `label` are already translated for display; `bet_type`
/// doubles as the market-family key when the generator picks one family.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketCandidate {
    pub bet_type: String,
    pub label: String,
    pub odd: f64,
}

/// A staged bet-option row for the (league, jornada) snapshot.
#[derive(Debug, Clone)]
pub struct BetOptionRow {
    pub id: String,
    pub league_id: i64,
    pub jornada: u32,
    pub match_id: i64,
    pub home_team: String,
    pub away_team: String,
    pub home_crest: String,
    pub away_crest: String,
    pub bet_type: String,
    pub bet_label: String,
    pub odd: f64,
}

#[derive(Debug, Clone)]
pub struct League {
    pub id: i64,
    pub name: String,
    pub division: Division,
    pub active: bool,
}

// ---------------------------------------------------------------------------
// Orchestrator summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub processed: u64,
    pub available: u64,
    pub injured: u64,
    pub suspended: u64,
    pub not_found: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationSummary {
    pub success: bool,
    pub matches_processed: u64,
    pub options_count: u64,
}
