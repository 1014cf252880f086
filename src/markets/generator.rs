use std::collections::HashMap;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::store::{BetOptionStore, LeagueStore};
use crate::error::Result;
use crate::markets::selector::OddsSelector;
use crate::provider::FootballProvider;
use crate::types::{BetOptionRow, Division, Fixture, GenerationSummary, MarketCandidate};

/// A fixture together with its filtered candidate pool.
pub struct FixturePool {
    pub fixture: Fixture,
    pub candidates: Vec<MarketCandidate>,
}

/// Drives fixture fetch + market selection per league and replaces the
/// persisted (league, jornada) snapshot. Sequential, with a fixed delay
/// between fixture odds lookups.
pub struct BetGenerator<P> {
    selector: OddsSelector<P>,
    leagues: LeagueStore,
    bets: BetOptionStore,
    season: u16,
    fixture_delay: Duration,
    rng: StdRng,
}

impl<P: FootballProvider> BetGenerator<P> {
    pub fn new(
        provider: P,
        leagues: LeagueStore,
        bets: BetOptionStore,
        season: u16,
        fixture_delay: Duration,
    ) -> Self {
        Self::with_rng(
            provider,
            leagues,
            bets,
            season,
            fixture_delay,
            StdRng::from_entropy(),
        )
    }

    /// Seeded constructor so selection outcomes are reproducible in tests.
    pub fn with_rng(
        provider: P,
        leagues: LeagueStore,
        bets: BetOptionStore,
        season: u16,
        fixture_delay: Duration,
        rng: StdRng,
    ) -> Self {
        Self {
            selector: OddsSelector::new(provider),
            leagues,
            bets,
            season,
            fixture_delay,
            rng,
        }
    }

    /// Generate and persist bet options for one league/jornada. Missing
    /// fixtures (or a provider failure fetching them) produce a
    /// success=false summary; only persistence errors propagate.
    pub async fn generate_for_league(
        &mut self,
        league_id: i64,
        jornada: u32,
    ) -> Result<GenerationSummary> {
        let Some(league) = self.leagues.find(league_id).await? else {
            return Err(crate::error::AppError::UnknownLeague(league_id));
        };

        let pools = match self.fetch_division_pools(league.division, jornada).await {
            Ok(pools) => pools,
            Err(e) => {
                warn!(league_id, jornada, "fixture fetch failed: {e}");
                return Ok(GenerationSummary::default());
            }
        };

        if pools.is_empty() {
            info!(league_id, jornada, "no fixtures for round, nothing generated");
            return Ok(GenerationSummary::default());
        }

        self.stage_and_persist(league_id, jornada, &pools).await
    }

    /// Generate for every active league, fetching each division's fixture
    /// pools once and reusing them across that division's leagues. The
    /// per-fixture family pick still happens independently per league, so
    /// leagues sharing a division can end up with different markets.
    pub async fn generate_for_all_leagues(
        &mut self,
        jornada: u32,
    ) -> Result<Vec<(i64, GenerationSummary)>> {
        let leagues = self.leagues.active().await?;
        let mut by_division: HashMap<Division, Vec<i64>> = HashMap::new();
        for league in leagues {
            by_division.entry(league.division).or_default().push(league.id);
        }

        let mut results = Vec::new();
        for division in Division::ALL {
            let Some(league_ids) = by_division.remove(&division) else {
                continue;
            };

            let pools = match self.fetch_division_pools(division, jornada).await {
                Ok(pools) => pools,
                Err(e) => {
                    warn!(%division, jornada, "fixture fetch failed: {e}");
                    for league_id in league_ids {
                        results.push((league_id, GenerationSummary::default()));
                    }
                    continue;
                }
            };

            for league_id in league_ids {
                if pools.is_empty() {
                    results.push((league_id, GenerationSummary::default()));
                    continue;
                }
                let summary = self.stage_and_persist(league_id, jornada, &pools).await?;
                results.push((league_id, summary));
            }
        }

        Ok(results)
    }

    /// Fetch the round's fixtures for a division and build each fixture's
    /// candidate pool, sleeping between fixtures for provider rate limits.
    async fn fetch_division_pools(
        &mut self,
        division: Division,
        jornada: u32,
    ) -> Result<Vec<FixturePool>> {
        let fixtures = self
            .selector
            .fetch_fixtures(division.competition_id(), self.season, jornada)
            .await?;

        let mut pools = Vec::with_capacity(fixtures.len());
        for (i, fixture) in fixtures.into_iter().enumerate() {
            if i > 0 && !self.fixture_delay.is_zero() {
                tokio::time::sleep(self.fixture_delay).await;
            }
            let candidates = self
                .selector
                .markets_for_fixture(fixture.id, &mut self.rng)
                .await;
            pools.push(FixturePool { fixture, candidates });
        }
        Ok(pools)
    }

    /// Pick one market family per fixture and replace the partition.
    async fn stage_and_persist(
        &mut self,
        league_id: i64,
        jornada: u32,
        pools: &[FixturePool],
    ) -> Result<GenerationSummary> {
        let mut rows = Vec::new();
        let mut matches_processed = 0u64;

        for pool in pools {
            let Some(family) = pick_family(&pool.candidates, &mut self.rng) else {
                continue;
            };
            matches_processed += 1;
            for candidate in family {
                rows.push(BetOptionRow {
                    id: Uuid::new_v4().to_string(),
                    league_id,
                    jornada,
                    match_id: pool.fixture.id,
                    home_team: pool.fixture.home_team.clone(),
                    away_team: pool.fixture.away_team.clone(),
                    home_crest: pool.fixture.home_crest.clone(),
                    away_crest: pool.fixture.away_crest.clone(),
                    bet_type: candidate.bet_type.clone(),
                    bet_label: candidate.label.clone(),
                    odd: candidate.odd,
                });
            }
        }

        let options_count = rows.len() as u64;
        self.bets.replace_snapshot(league_id, jornada, &rows).await?;

        info!(
            league_id,
            jornada,
            matches = matches_processed,
            options = options_count,
            "bet options generated"
        );

        Ok(GenerationSummary {
            success: true,
            matches_processed,
            options_count,
        })
    }
}

/// Group a fixture's candidates by market family and pick exactly one
/// family uniformly at random. None when the pool is empty.
pub fn pick_family<'a, R: Rng>(
    candidates: &'a [MarketCandidate],
    rng: &mut R,
) -> Option<Vec<&'a MarketCandidate>> {
    let mut families: Vec<(&str, Vec<&MarketCandidate>)> = Vec::new();
    for candidate in candidates {
        match families.iter_mut().find(|(key, _)| *key == candidate.bet_type) {
            Some((_, members)) => members.push(candidate),
            None => families.push((candidate.bet_type.as_str(), vec![candidate])),
        }
    }

    if families.is_empty() {
        return None;
    }
    let (_, family) = families.swap_remove(rng.gen_range(0..families.len()));
    Some(family)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;

    use crate::config::{MAX_PLAYABLE_ODD, MIN_PLAYABLE_ODD};
    use crate::db::store::test_pool;
    use crate::provider::{PlayerSeasonRecord, ProviderBet};

    fn candidate(bet_type: &str, label: &str, odd: f64) -> MarketCandidate {
        MarketCandidate {
            bet_type: bet_type.to_string(),
            label: label.to_string(),
            odd,
        }
    }

    #[test]
    fn pick_family_keeps_one_family_whole() {
        let pool = vec![
            candidate("Ganador del partido", "Local", 1.50),
            candidate("Ganador del partido", "Empate", 2.80),
            candidate("Ganador del partido", "Visitante", 2.20),
            candidate("Goles", "Más de 2.5", 1.80),
            candidate("Goles", "Menos de 2.5", 2.00),
        ];
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let family = pick_family(&pool, &mut rng).expect("non-empty pool");
            let types: HashSet<&str> =
                family.iter().map(|c| c.bet_type.as_str()).collect();
            assert_eq!(types.len(), 1, "mixed families in one pick");
            match types.iter().next().unwrap() {
                &"Ganador del partido" => assert_eq!(family.len(), 3),
                &"Goles" => assert_eq!(family.len(), 2),
                other => panic!("unexpected family {other}"),
            }
        }
    }

    #[test]
    fn pick_family_on_empty_pool_is_none() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(pick_family(&[], &mut rng).is_none());
    }

    // -----------------------------------------------------------------------
    // End-to-end generation against a scripted provider + in-memory store
    // -----------------------------------------------------------------------

    struct ScriptedOdds {
        fixtures: Vec<Fixture>,
        bets: Vec<ProviderBet>,
    }

    #[async_trait]
    impl FootballProvider for ScriptedOdds {
        async fn player_season(
            &self,
            _: i64,
            _: u16,
        ) -> crate::error::Result<Option<PlayerSeasonRecord>> {
            unimplemented!("not used by generator tests")
        }

        async fn fixtures(
            &self,
            _: u32,
            _: u16,
            _: &str,
        ) -> crate::error::Result<Vec<Fixture>> {
            Ok(self.fixtures.clone())
        }

        async fn odds(&self, _: i64) -> crate::error::Result<Vec<ProviderBet>> {
            Ok(self.bets.clone())
        }
    }

    fn fixture(id: i64) -> Fixture {
        Fixture {
            id,
            home_team: format!("Home{id}"),
            away_team: format!("Away{id}"),
            home_crest: String::new(),
            away_crest: String::new(),
        }
    }

    fn playable_bets() -> Vec<ProviderBet> {
        vec![
            ProviderBet::new(
                "Match Winner",
                &[("Home", "1.50"), ("Draw", "2.80"), ("Away", "2.20")],
            ),
            ProviderBet::new(
                "Goals Over/Under",
                &[("Over 2.5", "1.80"), ("Under 2.5", "2.00")],
            ),
        ]
    }

    async fn seed_league(pool: &sqlx::SqlitePool, id: i64, division: &str) {
        sqlx::query("INSERT INTO leagues (id, name, division, active) VALUES (?, ?, ?, 1)")
            .bind(id)
            .bind(format!("Liga {id}"))
            .bind(division)
            .execute(pool)
            .await
            .unwrap();
    }

    fn generator(
        pool: &sqlx::SqlitePool,
        provider: ScriptedOdds,
        seed: u64,
    ) -> BetGenerator<ScriptedOdds> {
        BetGenerator::with_rng(
            provider,
            LeagueStore::new(pool.clone()),
            BetOptionStore::new(pool.clone()),
            2025,
            Duration::ZERO,
            StdRng::seed_from_u64(seed),
        )
    }

    #[tokio::test]
    async fn generates_one_family_per_fixture() {
        let pool = test_pool().await;
        seed_league(&pool, 1, "primera").await;

        let provider = ScriptedOdds {
            fixtures: vec![fixture(100), fixture(101)],
            bets: playable_bets(),
        };
        let mut generator = generator(&pool, provider, 7);

        let summary = generator.generate_for_league(1, 4).await.unwrap();
        assert!(summary.success);
        assert_eq!(summary.matches_processed, 2);

        // Every fixture's persisted rows belong to exactly one market family.
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT match_id, bet_type FROM bet_options WHERE league_id = 1 AND jornada = 4")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(rows.len() as u64, summary.options_count);
        for match_id in [100i64, 101] {
            let types: HashSet<&String> = rows
                .iter()
                .filter(|(id, _)| *id == match_id)
                .map(|(_, t)| t)
                .collect();
            assert_eq!(types.len(), 1, "fixture {match_id} mixed families");
        }
    }

    #[tokio::test]
    async fn regeneration_replaces_every_row_id() {
        let pool = test_pool().await;
        seed_league(&pool, 1, "primera").await;
        let store = BetOptionStore::new(pool.clone());

        let fixtures = vec![fixture(100)];
        let mut first_gen = generator(
            &pool,
            ScriptedOdds { fixtures: fixtures.clone(), bets: playable_bets() },
            1,
        );
        first_gen.generate_for_league(1, 4).await.unwrap();
        let first_ids: HashSet<String> =
            store.snapshot_ids(1, 4).await.unwrap().into_iter().collect();

        let mut second_gen = generator(
            &pool,
            ScriptedOdds { fixtures, bets: playable_bets() },
            2,
        );
        second_gen.generate_for_league(1, 4).await.unwrap();
        let second_ids: HashSet<String> =
            store.snapshot_ids(1, 4).await.unwrap().into_iter().collect();

        assert!(!first_ids.is_empty() && !second_ids.is_empty());
        assert!(first_ids.is_disjoint(&second_ids), "row ids survived regeneration");
    }

    struct BrokenFixtures;

    #[async_trait]
    impl FootballProvider for BrokenFixtures {
        async fn player_season(
            &self,
            _: i64,
            _: u16,
        ) -> crate::error::Result<Option<PlayerSeasonRecord>> {
            unimplemented!("not used by generator tests")
        }

        async fn fixtures(
            &self,
            _: u32,
            _: u16,
            _: &str,
        ) -> crate::error::Result<Vec<Fixture>> {
            Err(crate::error::AppError::Provider("fixtures endpoint down".to_string()))
        }

        async fn odds(&self, _: i64) -> crate::error::Result<Vec<ProviderBet>> {
            unimplemented!("not used by generator tests")
        }
    }

    #[tokio::test]
    async fn fixture_fetch_failure_yields_unsuccessful_summary() {
        let pool = test_pool().await;
        seed_league(&pool, 1, "primera").await;

        let mut generator = BetGenerator::with_rng(
            BrokenFixtures,
            LeagueStore::new(pool.clone()),
            BetOptionStore::new(pool.clone()),
            2025,
            Duration::ZERO,
            StdRng::seed_from_u64(19),
        );

        let summary = generator.generate_for_league(1, 4).await.unwrap();
        assert_eq!(summary, GenerationSummary::default());
        assert!(!summary.success);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bet_options")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0, "no rows staged on a failed fetch");
    }

    #[tokio::test]
    async fn empty_fixture_list_yields_unsuccessful_summary() {
        let pool = test_pool().await;
        seed_league(&pool, 1, "segunda").await;

        let provider = ScriptedOdds { fixtures: vec![], bets: vec![] };
        let mut generator = generator(&pool, provider, 3);

        let summary = generator.generate_for_league(1, 4).await.unwrap();
        assert_eq!(summary, GenerationSummary::default());
        assert!(!summary.success);
    }

    #[tokio::test]
    async fn zero_bookmaker_fixture_persists_only_synthetic_rows() {
        let pool = test_pool().await;
        seed_league(&pool, 1, "primera").await;

        let provider = ScriptedOdds { fixtures: vec![fixture(100)], bets: vec![] };
        let mut generator = generator(&pool, provider, 11);

        generator.generate_for_league(1, 4).await.unwrap();
        let rows: Vec<(String, String, f64)> =
            sqlx::query_as("SELECT bet_type, bet_label, odd FROM bet_options")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(rows.len(), 2, "one synthetic family of two options");
        let bet_type = rows[0].0.as_str();
        assert!(bet_type == "Córners" || bet_type == "Tarjetas");
    }

    #[tokio::test]
    async fn persisted_non_synthetic_odds_stay_in_range() {
        let pool = test_pool().await;
        seed_league(&pool, 1, "primera").await;

        let provider = ScriptedOdds {
            fixtures: vec![fixture(100), fixture(101), fixture(102)],
            bets: playable_bets(),
        };
        let mut generator = generator(&pool, provider, 13);
        generator.generate_for_league(1, 4).await.unwrap();

        let rows: Vec<(String, f64)> =
            sqlx::query_as("SELECT bet_type, odd FROM bet_options")
                .fetch_all(&pool)
                .await
                .unwrap();
        for (bet_type, odd) in rows {
            if bet_type == "Córners" || bet_type == "Tarjetas" {
                continue;
            }
            assert!(
                (MIN_PLAYABLE_ODD..=MAX_PLAYABLE_ODD).contains(&odd),
                "persisted odd {odd} out of range for {bet_type}"
            );
        }
    }

    #[tokio::test]
    async fn all_leagues_in_a_division_share_fetched_fixtures() {
        let pool = test_pool().await;
        seed_league(&pool, 1, "primera").await;
        seed_league(&pool, 2, "primera").await;

        let provider = ScriptedOdds {
            fixtures: vec![fixture(100)],
            bets: playable_bets(),
        };
        let mut generator = generator(&pool, provider, 17);

        let results = generator.generate_for_all_leagues(4).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, s)| s.success));

        // Both leagues got a snapshot for the same fixture.
        for league_id in [1i64, 2] {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM bet_options WHERE league_id = ? AND jornada = 4",
            )
            .bind(league_id)
            .fetch_one(&pool)
            .await
            .unwrap();
            assert!(count > 0, "league {league_id} got no rows");
        }
    }

    #[tokio::test]
    async fn unknown_league_is_an_error() {
        let pool = test_pool().await;
        let provider = ScriptedOdds { fixtures: vec![], bets: vec![] };
        let mut generator = generator(&pool, provider, 5);

        let err = generator.generate_for_league(99, 4).await.unwrap_err();
        assert!(matches!(err, crate::error::AppError::UnknownLeague(99)));
    }
}
