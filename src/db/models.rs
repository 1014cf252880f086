//! Database row types matching the schema in migrations/0001_init.sql.
//! Used by sqlx for typed queries.

#[derive(Debug, sqlx::FromRow)]
pub struct CardRow {
    pub player_id: i64,
    pub season: i64,
    pub matchday: i64,
    pub yellow_cards: i64,
    pub red_cards: i64,
}

#[derive(Debug, sqlx::FromRow)]
pub struct LeagueRow {
    pub id: i64,
    pub name: String,
    pub division: String,
    pub active: i64,
}
