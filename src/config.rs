use crate::error::{AppError, Result};

pub const PROVIDER_API_URL: &str = "https://v3.football.api-sports.io";

/// Ordered env-var candidates for the provider API key. First set wins.
pub const API_KEY_ENV_CANDIDATES: &[&str] =
    &["API_FOOTBALL_KEY", "APISPORTS_KEY", "FOOTBALL_DATA_KEY"];

/// Documented legacy fallback key used when no env candidate is set.
pub const DEFAULT_API_KEY: &str = "8c1f6a0e4d2b49c3a7e5f19b6d0c3a84";

/// Playable odds window. Markets with any option outside this range are
/// dropped whole: a single bad leg disqualifies the market for the fixture.
pub const MIN_PLAYABLE_ODD: f64 = 1.40;
pub const MAX_PLAYABLE_ODD: f64 = 3.00;

/// Yellow-card accumulation rule: sum over this many most recent matchdays.
pub const CARD_WINDOW_MATCHDAYS: usize = 5;
/// Accumulated yellows at or above this trigger a suspension.
pub const CARD_SUSPENSION_THRESHOLD: u32 = 5;

/// Delay between per-player provider lookups during availability sync (ms).
pub const PLAYER_SYNC_DELAY_MS: u64 = 400;

/// Delay between per-fixture odds lookups during bet generation (ms).
pub const FIXTURE_DELAY_MS: u64 = 1000;

/// Emit a sync progress log line every this many players.
pub const SYNC_PROGRESS_EVERY: u64 = 25;

#[derive(Debug, Clone)]
pub struct Config {
    pub provider_api_url: String,
    pub provider_api_key: String,
    pub log_level: String,
    pub db_path: String,
    pub api_port: u16,
    /// Current season year, e.g. 2025 (SEASON)
    pub season: u16,
    /// Per-player sync delay in ms (PLAYER_SYNC_DELAY_MS), zero in tests
    pub player_sync_delay_ms: u64,
    /// Per-fixture odds delay in ms (FIXTURE_DELAY_MS)
    pub fixture_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            provider_api_url: std::env::var("PROVIDER_API_URL")
                .unwrap_or_else(|_| PROVIDER_API_URL.to_string()),
            provider_api_key: resolve_api_key(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "engine.db".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| {
                    AppError::Config("API_PORT must be a valid port number".to_string())
                })?,
            season: std::env::var("SEASON")
                .unwrap_or_else(|_| "2025".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("SEASON must be a year".to_string()))?,
            player_sync_delay_ms: std::env::var("PLAYER_SYNC_DELAY_MS")
                .unwrap_or_default()
                .parse::<u64>()
                .unwrap_or(PLAYER_SYNC_DELAY_MS),
            fixture_delay_ms: std::env::var("FIXTURE_DELAY_MS")
                .unwrap_or_default()
                .parse::<u64>()
                .unwrap_or(FIXTURE_DELAY_MS),
        })
    }
}

/// Resolve the provider API key from the ordered env candidates, falling back
/// to the hardcoded default key if none is set.
pub fn resolve_api_key() -> String {
    for name in API_KEY_ENV_CANDIDATES {
        if let Ok(v) = std::env::var(name) {
            if !v.trim().is_empty() {
                return v;
            }
        }
    }
    DEFAULT_API_KEY.to_string()
}
