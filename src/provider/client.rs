use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::provider::{FootballProvider, PlayerSeasonRecord, ProviderBet};
use crate::types::Fixture;

/// REST client for the API-Football v3 endpoints the engine consumes:
/// `/players`, `/fixtures`, `/odds`. All responses share a
/// `{"response": [...]}` envelope; an empty array is a normal outcome.
pub struct ApiFootballClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ApiFootballClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.provider_api_url.clone(),
            api_key: cfg.provider_api_key.clone(),
        })
    }

    async fn get_response(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<serde_json::Value>> {
        let url = format!("{}{path}", self.base_url);
        let resp: serde_json::Value = self
            .client
            .get(&url)
            .query(query)
            .header("x-apisports-key", &self.api_key)
            .send()
            .await?
            .json()
            .await?;

        match resp.get("response").and_then(|r| r.as_array()) {
            Some(items) => Ok(items.clone()),
            None => Err(AppError::Provider(format!(
                "response envelope missing or not an array: {path}"
            ))),
        }
    }
}

#[async_trait]
impl FootballProvider for ApiFootballClient {
    async fn player_season(
        &self,
        player_id: i64,
        season: u16,
    ) -> Result<Option<PlayerSeasonRecord>> {
        let query = [
            ("id", player_id.to_string()),
            ("season", season.to_string()),
        ];
        let items = self.get_response("/players", &query).await?;

        let Some(item) = items.first() else {
            debug!(player_id, season, "provider returned no player data");
            return Ok(None);
        };

        let injured = item
            .get("player")
            .and_then(|p| p.get("injured"))
            .and_then(|i| i.as_bool())
            .unwrap_or(false);

        Ok(Some(PlayerSeasonRecord { player_id, season, injured }))
    }

    async fn fixtures(
        &self,
        competition_id: u32,
        season: u16,
        round: &str,
    ) -> Result<Vec<Fixture>> {
        let query = [
            ("league", competition_id.to_string()),
            ("season", season.to_string()),
            ("round", round.to_string()),
        ];
        let items = self.get_response("/fixtures", &query).await?;

        let mut fixtures = Vec::with_capacity(items.len());
        for item in &items {
            if let Some(fixture) = parse_fixture(item) {
                fixtures.push(fixture);
            } else {
                debug!("skipping structurally unusable fixture entry");
            }
        }
        Ok(fixtures)
    }

    async fn odds(&self, fixture_id: i64) -> Result<Vec<ProviderBet>> {
        let query = [("fixture", fixture_id.to_string())];
        let items = self.get_response("/odds", &query).await?;

        // First bookmaker's full bet list; no coverage is an empty vec.
        let bets = items
            .first()
            .and_then(|entry| entry.get("bookmakers"))
            .and_then(|b| b.as_array())
            .and_then(|b| b.first())
            .and_then(|bookmaker| bookmaker.get("bets"))
            .cloned();

        match bets {
            Some(raw) => Ok(serde_json::from_value(raw)?),
            None => Ok(Vec::new()),
        }
    }
}

fn parse_fixture(v: &serde_json::Value) -> Option<Fixture> {
    let id = v.get("fixture")?.get("id")?.as_i64()?;
    let teams = v.get("teams")?;
    let home = teams.get("home")?;
    let away = teams.get("away")?;

    Some(Fixture {
        id,
        home_team: home.get("name")?.as_str()?.to_string(),
        away_team: away.get("name")?.as_str()?.to_string(),
        home_crest: home
            .get("logo")
            .and_then(|l| l.as_str())
            .unwrap_or_default()
            .to_string(),
        away_crest: away
            .get("logo")
            .and_then(|l| l.as_str())
            .unwrap_or_default()
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fixture_parses_teams_and_crests() {
        let v = json!({
            "fixture": { "id": 9981 },
            "teams": {
                "home": { "name": "Sevilla", "logo": "https://cdn/x/536.png" },
                "away": { "name": "Valencia", "logo": "https://cdn/x/532.png" }
            }
        });
        let f = parse_fixture(&v).expect("parseable fixture");
        assert_eq!(f.id, 9981);
        assert_eq!(f.home_team, "Sevilla");
        assert_eq!(f.away_team, "Valencia");
        assert_eq!(f.away_crest, "https://cdn/x/532.png");
    }

    #[test]
    fn fixture_without_teams_is_skipped() {
        let v = json!({ "fixture": { "id": 1 } });
        assert!(parse_fixture(&v).is_none());
    }

    #[test]
    fn missing_crest_defaults_to_empty() {
        let v = json!({
            "fixture": { "id": 2 },
            "teams": {
                "home": { "name": "A" },
                "away": { "name": "B" }
            }
        });
        let f = parse_fixture(&v).expect("parseable fixture");
        assert_eq!(f.home_crest, "");
    }
}
