pub mod client;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::types::{CardRecord, Fixture};

pub use client::ApiFootballClient;

/// What the availability resolver needs from a player-by-season lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSeasonRecord {
    pub player_id: i64,
    pub season: u16,
    pub injured: bool,
}

/// One market ("bet") offered by a bookmaker for a fixture.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderBet {
    pub name: String,
    pub values: Vec<ProviderOdd>,
}

/// A single selectable option inside a market.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderOdd {
    pub value: String,
    pub odd: String,
}

#[cfg(test)]
impl ProviderBet {
    /// Test helper: build a bet from (value, odd) string pairs.
    pub fn new(name: &str, values: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            values: values
                .iter()
                .map(|(value, odd)| ProviderOdd {
                    value: value.to_string(),
                    odd: odd.to_string(),
                })
                .collect(),
        }
    }
}

/// Read-only football-data provider. Injected so resolver and selector logic
/// run against scripted fixtures in tests without network access.
#[async_trait]
pub trait FootballProvider: Send + Sync {
    /// Player lookup for one season. `Ok(None)` means the provider reported
    /// zero results; that is a normal fallback trigger, not an error.
    async fn player_season(&self, player_id: i64, season: u16)
        -> Result<Option<PlayerSeasonRecord>>;

    /// Fixtures for a competition round. Zero results come back as an empty
    /// vec, never an error.
    async fn fixtures(&self, competition_id: u32, season: u16, round: &str)
        -> Result<Vec<Fixture>>;

    /// First bookmaker's full bet list for a fixture. Empty when the
    /// provider has no bookmaker coverage.
    async fn odds(&self, fixture_id: i64) -> Result<Vec<ProviderBet>>;
}

#[async_trait]
impl<T: FootballProvider + ?Sized> FootballProvider for std::sync::Arc<T> {
    async fn player_season(
        &self,
        player_id: i64,
        season: u16,
    ) -> Result<Option<PlayerSeasonRecord>> {
        (**self).player_season(player_id, season).await
    }

    async fn fixtures(&self, competition_id: u32, season: u16, round: &str)
        -> Result<Vec<Fixture>> {
        (**self).fixtures(competition_id, season, round).await
    }

    async fn odds(&self, fixture_id: i64) -> Result<Vec<ProviderBet>> {
        (**self).odds(fixture_id).await
    }
}

/// Locally stored card history, injected behind a trait so the resolver can
/// be tested without a database.
#[async_trait]
pub trait CardSource: Send + Sync {
    /// Card records for a player/season, ordered most recent matchday first.
    async fn cards(&self, player_id: i64, season: u16) -> Result<Vec<CardRecord>>;
}
