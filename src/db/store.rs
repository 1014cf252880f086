use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::db::models::{CardRow, LeagueRow};
use crate::error::Result;
use crate::provider::CardSource;
use crate::types::{BetOptionRow, CardRecord, Division, League, PlayerAvailability};

// ---------------------------------------------------------------------------
// PlayerRepository: one implementation, three division tables
// ---------------------------------------------------------------------------

/// Find-and-update access to one division's player table. The sync
/// orchestrator holds one repository per division and tries them in fixed
/// priority order; a non-matching id is a clean miss, not an error.
#[derive(Clone)]
pub struct PlayerRepository {
    pool: sqlx::SqlitePool,
    division: Division,
}

impl PlayerRepository {
    pub fn new(pool: sqlx::SqlitePool, division: Division) -> Self {
        Self { pool, division }
    }

    pub fn division(&self) -> Division {
        self.division
    }

    /// All player ids in this division's table.
    pub async fn player_ids(&self) -> Result<Vec<i64>> {
        let sql = format!("SELECT id FROM {} ORDER BY id", self.division.player_table());
        let ids: Vec<i64> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
        Ok(ids)
    }

    /// Overwrite availability for a player if it belongs to this division.
    /// Returns false when the id does not match any row here.
    pub async fn update_availability(&self, availability: &PlayerAvailability) -> Result<bool> {
        let sql = format!(
            "UPDATE {} SET status = ?, status_reason = ?, updated_at = ? WHERE id = ?",
            self.division.player_table()
        );
        let result = sqlx::query(&sql)
            .bind(availability.status.to_string())
            .bind(availability.reason.as_deref())
            .bind(now_secs())
            .bind(availability.player_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// The three division repositories in fixed partition priority order.
pub fn division_repositories(pool: &sqlx::SqlitePool) -> Vec<PlayerRepository> {
    Division::ALL
        .iter()
        .map(|&division| PlayerRepository::new(pool.clone(), division))
        .collect()
}

// ---------------------------------------------------------------------------
// CardStore
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct CardStore {
    pool: sqlx::SqlitePool,
}

impl CardStore {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CardSource for CardStore {
    /// Card records ordered most recent matchday first; the suspension
    /// engine relies on this ordering.
    async fn cards(&self, player_id: i64, season: u16) -> Result<Vec<CardRecord>> {
        let rows: Vec<CardRow> = sqlx::query_as(
            "SELECT player_id, season, matchday, yellow_cards, red_cards \
             FROM player_cards WHERE player_id = ? AND season = ? \
             ORDER BY matchday DESC",
        )
        .bind(player_id)
        .bind(season as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CardRecord {
                player_id: r.player_id,
                season: r.season as u16,
                matchday: r.matchday as u32,
                yellow_cards: r.yellow_cards as u32,
                red_cards: r.red_cards as u32,
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// LeagueStore
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct LeagueStore {
    pool: sqlx::SqlitePool,
}

impl LeagueStore {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, league_id: i64) -> Result<Option<League>> {
        let row: Option<LeagueRow> =
            sqlx::query_as("SELECT id, name, division, active FROM leagues WHERE id = ?")
                .bind(league_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.and_then(league_from_row))
    }

    pub async fn active(&self) -> Result<Vec<League>> {
        let rows: Vec<LeagueRow> =
            sqlx::query_as("SELECT id, name, division, active FROM leagues WHERE active = 1")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().filter_map(league_from_row).collect())
    }
}

fn league_from_row(row: LeagueRow) -> Option<League> {
    let division = Division::from_str_loose(&row.division)?;
    Some(League {
        id: row.id,
        name: row.name,
        division,
        active: row.active != 0,
    })
}

// ---------------------------------------------------------------------------
// BetOptionStore
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct BetOptionStore {
    pool: sqlx::SqlitePool,
}

impl BetOptionStore {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    /// Replace the whole (league_id, jornada) partition: delete everything,
    /// then bulk-insert the staged rows. One transaction, so a failed insert
    /// leaves the previous snapshot intact.
    pub async fn replace_snapshot(
        &self,
        league_id: i64,
        jornada: u32,
        rows: &[BetOptionRow],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM bet_options WHERE league_id = ? AND jornada = ?")
            .bind(league_id)
            .bind(jornada as i64)
            .execute(&mut *tx)
            .await?;

        let created_at = now_secs();
        for row in rows {
            sqlx::query(
                "INSERT INTO bet_options (id, league_id, jornada, match_id, home_team, \
                 away_team, home_crest, away_crest, bet_type, bet_label, odd, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&row.id)
            .bind(row.league_id)
            .bind(row.jornada as i64)
            .bind(row.match_id)
            .bind(&row.home_team)
            .bind(&row.away_team)
            .bind(&row.home_crest)
            .bind(&row.away_crest)
            .bind(&row.bet_type)
            .bind(&row.bet_label)
            .bind(row.odd)
            .bind(created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Row ids currently persisted for a partition.
    pub async fn snapshot_ids(&self, league_id: i64, jornada: u32) -> Result<Vec<String>> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT id FROM bet_options WHERE league_id = ? AND jornada = ?")
                .bind(league_id)
                .bind(jornada as i64)
                .fetch_all(&self.pool)
                .await?;
        Ok(ids)
    }
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    // A single connection keeps every query on the same in-memory database.
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AvailabilityStatus;

    async fn seed_player(pool: &sqlx::SqlitePool, table: &str, id: i64, name: &str) {
        let sql = format!("INSERT INTO {table} (id, name) VALUES (?, ?)");
        sqlx::query(&sql)
            .bind(id)
            .bind(name)
            .execute(pool)
            .await
            .expect("seed player");
    }

    fn availability(player_id: i64) -> PlayerAvailability {
        PlayerAvailability {
            player_id,
            status: AvailabilityStatus::Suspended,
            reason: Some("accumulated cards".to_string()),
            season: 2025,
        }
    }

    #[tokio::test]
    async fn update_matches_only_the_owning_division() {
        let pool = test_pool().await;
        seed_player(&pool, "players_segunda", 42, "Ruiz").await;

        let repos = division_repositories(&pool);
        assert!(!repos[0].update_availability(&availability(42)).await.unwrap());
        assert!(repos[1].update_availability(&availability(42)).await.unwrap());
        assert!(!repos[2].update_availability(&availability(42)).await.unwrap());

        let (status, reason): (String, Option<String>) = sqlx::query_as(
            "SELECT status, status_reason FROM players_segunda WHERE id = 42",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(status, "SUSPENDED");
        assert_eq!(reason.as_deref(), Some("accumulated cards"));
    }

    #[tokio::test]
    async fn cards_come_back_most_recent_first() {
        let pool = test_pool().await;
        for (matchday, yellow, red) in [(3, 1, 0), (7, 0, 1), (5, 2, 0)] {
            sqlx::query(
                "INSERT INTO player_cards (player_id, season, matchday, yellow_cards, red_cards) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(9)
            .bind(2025)
            .bind(matchday)
            .bind(yellow)
            .bind(red)
            .execute(&pool)
            .await
            .unwrap();
        }

        let store = CardStore::new(pool);
        let cards = store.cards(9, 2025).await.unwrap();
        let matchdays: Vec<u32> = cards.iter().map(|c| c.matchday).collect();
        assert_eq!(matchdays, vec![7, 5, 3]);
    }

    #[tokio::test]
    async fn replace_snapshot_never_keeps_old_ids() {
        let pool = test_pool().await;
        let store = BetOptionStore::new(pool);

        let row = |id: &str| BetOptionRow {
            id: id.to_string(),
            league_id: 1,
            jornada: 4,
            match_id: 100,
            home_team: "Sevilla".to_string(),
            away_team: "Valencia".to_string(),
            home_crest: String::new(),
            away_crest: String::new(),
            bet_type: "Ganador del partido".to_string(),
            bet_label: "Local".to_string(),
            odd: 1.50,
        };

        store.replace_snapshot(1, 4, &[row("a"), row("b")]).await.unwrap();
        store.replace_snapshot(1, 4, &[row("c")]).await.unwrap();

        let ids = store.snapshot_ids(1, 4).await.unwrap();
        assert_eq!(ids, vec!["c".to_string()]);
    }

    #[tokio::test]
    async fn replace_snapshot_leaves_other_partitions_alone() {
        let pool = test_pool().await;
        let store = BetOptionStore::new(pool);

        let row = |id: &str, league_id: i64, jornada: u32| BetOptionRow {
            id: id.to_string(),
            league_id,
            jornada,
            match_id: 100,
            home_team: "A".to_string(),
            away_team: "B".to_string(),
            home_crest: String::new(),
            away_crest: String::new(),
            bet_type: "Goles".to_string(),
            bet_label: "Más de 2.5".to_string(),
            odd: 1.80,
        };

        store.replace_snapshot(1, 4, &[row("a", 1, 4)]).await.unwrap();
        store.replace_snapshot(2, 4, &[row("b", 2, 4)]).await.unwrap();
        store.replace_snapshot(1, 4, &[row("c", 1, 4)]).await.unwrap();

        assert_eq!(store.snapshot_ids(2, 4).await.unwrap(), vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn league_store_parses_division() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO leagues (id, name, division, active) VALUES (1, 'Liga A', 'primera', 1), (2, 'Liga B', 'segunda', 0)")
            .execute(&pool)
            .await
            .unwrap();

        let store = LeagueStore::new(pool);
        let league = store.find(1).await.unwrap().expect("league 1");
        assert_eq!(league.division, Division::Primera);

        let active = store.active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, 1);
    }
}
