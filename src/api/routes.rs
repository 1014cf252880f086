use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::availability::resolver::AvailabilityResolver;
use crate::availability::sync::AvailabilitySync;
use crate::config::Config;
use crate::db::store::{division_repositories, BetOptionStore, CardStore, LeagueStore};
use crate::error::AppError;
use crate::markets::generator::BetGenerator;
use crate::provider::ApiFootballClient;
use crate::types::{GenerationSummary, PlayerAvailability, SyncSummary};

#[derive(Clone)]
pub struct ApiState {
    pub pool: sqlx::SqlitePool,
    pub cfg: Config,
    pub provider: Arc<ApiFootballClient>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/availability/:player_id", get(get_availability))
        .route("/availability/sync", post(post_sync))
        .route("/bets/:league_id/:jornada/generate", post(post_generate))
        .route("/bets/generate-all/:jornada", post(post_generate_all))
        .with_state(state)
}

#[derive(Deserialize)]
pub struct SeasonQuery {
    pub season: Option<u16>,
}

#[derive(Serialize)]
pub struct LeagueGeneration {
    pub league_id: i64,
    #[serde(flatten)]
    pub summary: GenerationSummary,
}

async fn get_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn get_availability(
    State(state): State<ApiState>,
    Path(player_id): Path<i64>,
    Query(params): Query<SeasonQuery>,
) -> Json<PlayerAvailability> {
    let season = params.season.unwrap_or(state.cfg.season);
    let resolver = AvailabilityResolver::new(
        state.provider.clone(),
        CardStore::new(state.pool.clone()),
    );
    Json(resolver.resolve(player_id, season).await)
}

async fn post_sync(
    State(state): State<ApiState>,
    Query(params): Query<SeasonQuery>,
) -> Json<SyncSummary> {
    let season = params.season.unwrap_or(state.cfg.season);
    let resolver = AvailabilityResolver::new(
        state.provider.clone(),
        CardStore::new(state.pool.clone()),
    );
    let sync = AvailabilitySync::new(
        resolver,
        division_repositories(&state.pool),
        Duration::from_millis(state.cfg.player_sync_delay_ms),
    );
    Json(sync.sync_all(season).await)
}

async fn post_generate(
    State(state): State<ApiState>,
    Path((league_id, jornada)): Path<(i64, u32)>,
) -> Result<Json<GenerationSummary>, AppError> {
    let mut generator = generator_for(&state);
    Ok(Json(generator.generate_for_league(league_id, jornada).await?))
}

async fn post_generate_all(
    State(state): State<ApiState>,
    Path(jornada): Path<u32>,
) -> Result<Json<Vec<LeagueGeneration>>, AppError> {
    let mut generator = generator_for(&state);
    let results = generator.generate_for_all_leagues(jornada).await?;
    Ok(Json(
        results
            .into_iter()
            .map(|(league_id, summary)| LeagueGeneration { league_id, summary })
            .collect(),
    ))
}

fn generator_for(state: &ApiState) -> BetGenerator<Arc<ApiFootballClient>> {
    BetGenerator::new(
        state.provider.clone(),
        LeagueStore::new(state.pool.clone()),
        BetOptionStore::new(state.pool.clone()),
        state.cfg.season,
        Duration::from_millis(state.cfg.fixture_delay_ms),
    )
}
