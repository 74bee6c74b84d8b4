use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{ApiResponse, MatchView, StatKind};
use crate::services::normalizer::{
    merge_patch, normalize_championship, normalize_match, normalize_player, normalize_standing,
    normalize_stat_event, normalize_team, to_dual_json,
};
use crate::services::procedures::{ensure_schema, invoke};
use crate::services::statistics::load_leaders;
use crate::services::{FilterConfig, StandingsEngine};

/// Shared per-request state: the store and the recalculation engine.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub standings: StandingsEngine,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            standings: StandingsEngine::new(),
        }
    }
}

type JsonResult = AppResult<Json<ApiResponse<Value>>>;
type CreatedResult = AppResult<(StatusCode, Json<ApiResponse<Value>>)>;

pub async fn serve(config: &AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    let pool = db::create_pool(&config.database_url).await?;
    ensure_schema(&pool).await?;

    let app = create_router().with_state(AppState::new(pool));

    let address = config.bind_address(port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("League API server listening on {}", address);

    axum::serve(listener, app).await?;
    Ok(())
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/teams", get(list_teams).post(create_team))
        .route("/teams/{id}", get(get_team).put(update_team).delete(delete_team))
        .route("/matches", get(list_matches).post(create_match))
        .route("/matches/{id}", get(get_match).put(update_match).delete(delete_match))
        .route("/players", get(list_players).post(create_player))
        .route("/players/{id}", get(get_player).put(update_player).delete(delete_player))
        .route("/championships", get(list_championships).post(create_championship))
        .route(
            "/championships/{id}",
            get(get_championship).put(update_championship).delete(delete_championship),
        )
        .route("/stat-events", get(list_stat_events).post(create_stat_event))
        .route("/stat-events/{id}", delete(delete_stat_event))
        .route("/standings", get(list_standings))
        .route("/standings/recalculate", post(recalculate_standings))
        .route("/standings/{id}", put(override_standing))
        .route("/statistics/top-scorers", get(top_scorers))
        .route("/statistics/card-leaders", get(card_leaders))
        .route("/rpc/{name}", post(rpc))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Every payload leaves in both naming conventions.
fn respond<T: Serialize>(data: &T) -> JsonResult {
    Ok(Json(ApiResponse::success(to_dual_json(data)?)))
}

fn created<T: Serialize>(data: &T) -> CreatedResult {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(to_dual_json(data)?))))
}

/// Merges a patch over the stored record, keeping the id from the path.
fn patched<T: Serialize>(existing: &T, id: &str, patch: Value) -> AppResult<Value> {
    let base = serde_json::to_value(existing).map_err(anyhow::Error::from)?;
    let mut merged = merge_patch(base, patch)?;
    merged["id"] = Value::String(id.to_string());
    Ok(merged)
}

fn deleted(found: bool, what: &str) -> JsonResult {
    if found {
        Ok(Json(ApiResponse::success(Value::Bool(true))))
    } else {
        Err(AppError::not_found(what))
    }
}

// Health check endpoint
async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("League API is running"))
}

// ── teams ───────────────────────────────────────────────────────────────────

async fn list_teams(State(state): State<AppState>, Query(filter): Query<FilterConfig>) -> JsonResult {
    let teams = db::get_all_teams(&state.pool).await?;
    respond(&filter.apply(&teams))
}

async fn get_team(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    let team = db::get_team_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("team"))?;
    respond(&team)
}

async fn create_team(State(state): State<AppState>, Json(raw): Json<Value>) -> CreatedResult {
    let team = normalize_team(&raw)?;
    db::insert_team(&state.pool, &team).await?;
    tracing::info!("Created team {} ({} {})", team.name, team.category, team.group_name);
    created(&team)
}

async fn update_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> JsonResult {
    let existing = db::get_team_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("team"))?;
    let team = normalize_team(&patched(&existing, &id, patch)?)?;
    db::update_team(&state.pool, &team).await?;
    respond(&team)
}

async fn delete_team(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    deleted(db::delete_team(&state.pool, &id).await?, "team")
}

// ── matches ─────────────────────────────────────────────────────────────────

async fn list_matches(State(state): State<AppState>, Query(filter): Query<FilterConfig>) -> JsonResult {
    let matches = db::get_matches(&state.pool).await?;
    let teams = db::get_all_teams(&state.pool).await?;
    respond(&filter.apply(&MatchView::resolve(&matches, &teams)))
}

async fn get_match(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    let m = db::get_match_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("match"))?;
    respond(&m)
}

async fn create_match(State(state): State<AppState>, Json(raw): Json<Value>) -> CreatedResult {
    let m = normalize_match(&raw)?;
    db::insert_match(&state.pool, &m).await?;
    created(&m)
}

/// Score edits do not touch standings; recalculation is triggered separately.
async fn update_match(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> JsonResult {
    let existing = db::get_match_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("match"))?;
    let m = normalize_match(&patched(&existing, &id, patch)?)?;
    db::update_match(&state.pool, &m).await?;
    tracing::info!("Updated match {} ({})", m.id, m.status);
    respond(&m)
}

async fn delete_match(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    deleted(db::delete_match(&state.pool, &id).await?, "match")
}

// ── players ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PlayersQuery {
    #[serde(alias = "teamId")]
    team_id: Option<String>,
    search: Option<String>,
}

async fn list_players(State(state): State<AppState>, Query(params): Query<PlayersQuery>) -> JsonResult {
    let players = db::get_players(&state.pool, params.team_id.as_deref()).await?;
    let filter = FilterConfig::default().search(params.search.unwrap_or_default());
    respond(&filter.apply(&players))
}

async fn get_player(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    let player = db::get_player_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("player"))?;
    respond(&player)
}

async fn create_player(State(state): State<AppState>, Json(raw): Json<Value>) -> CreatedResult {
    let player = normalize_player(&raw)?;
    if db::get_team_by_id(&state.pool, &player.team_id).await?.is_none() {
        return Err(AppError::validation("team_id does not match any team"));
    }
    db::insert_player(&state.pool, &player).await?;
    created(&player)
}

async fn update_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> JsonResult {
    let existing = db::get_player_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("player"))?;
    let player = normalize_player(&patched(&existing, &id, patch)?)?;
    db::update_player(&state.pool, &player).await?;
    respond(&player)
}

async fn delete_player(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    deleted(db::delete_player(&state.pool, &id).await?, "player")
}

// ── championships ───────────────────────────────────────────────────────────

async fn list_championships(
    State(state): State<AppState>,
    Query(filter): Query<FilterConfig>,
) -> JsonResult {
    let championships = db::get_championships(&state.pool).await?;
    respond(&filter.apply(&championships))
}

async fn get_championship(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    let championship = db::get_championship_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("championship"))?;
    respond(&championship)
}

async fn create_championship(State(state): State<AppState>, Json(raw): Json<Value>) -> CreatedResult {
    let championship = normalize_championship(&raw)?;
    db::insert_championship(&state.pool, &championship).await?;
    created(&championship)
}

async fn update_championship(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> JsonResult {
    let existing = db::get_championship_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("championship"))?;
    let championship = normalize_championship(&patched(&existing, &id, patch)?)?;
    db::update_championship(&state.pool, &championship).await?;
    respond(&championship)
}

async fn delete_championship(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    deleted(db::delete_championship(&state.pool, &id).await?, "championship")
}

// ── statistic events ────────────────────────────────────────────────────────

async fn list_stat_events(State(state): State<AppState>) -> JsonResult {
    respond(&db::get_stat_events(&state.pool).await?)
}

async fn create_stat_event(State(state): State<AppState>, Json(raw): Json<Value>) -> CreatedResult {
    let event = normalize_stat_event(&raw)?;
    if db::get_player_by_id(&state.pool, &event.player_id).await?.is_none() {
        return Err(AppError::validation("player_id does not match any player"));
    }
    db::insert_stat_event(&state.pool, &event).await?;
    created(&event)
}

async fn delete_stat_event(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    deleted(db::delete_stat_event(&state.pool, &id).await?, "statistic event")
}

// ── derived views ───────────────────────────────────────────────────────────

async fn list_standings(State(state): State<AppState>, Query(filter): Query<FilterConfig>) -> JsonResult {
    let standings = db::get_standings(&state.pool).await?;
    respond(&filter.apply(&standings))
}

/// Manual correction of a derived row; lasts until the next recalculation.
async fn override_standing(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> JsonResult {
    let existing = db::get_standing_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("standing"))?;
    let standing = normalize_standing(&patched(&existing, &id, patch)?)?;
    db::update_standing(&state.pool, &standing).await?;
    tracing::warn!(
        "Standing for {} ({}) overridden by hand; the next recalculation replaces it",
        standing.team_name,
        standing.category
    );
    respond(&standing)
}

async fn recalculate_standings(State(state): State<AppState>) -> JsonResult {
    let summary = state.standings.recalculate(&state.pool).await?;
    respond(&summary)
}

async fn leaders_view(state: &AppState, kind: StatKind, filter: &FilterConfig) -> JsonResult {
    let rows = load_leaders(&state.pool, kind, filter.has_championship()).await?;
    respond(&filter.apply(&rows))
}

async fn top_scorers(State(state): State<AppState>, Query(filter): Query<FilterConfig>) -> JsonResult {
    leaders_view(&state, StatKind::Goal, &filter).await
}

async fn card_leaders(State(state): State<AppState>, Query(filter): Query<FilterConfig>) -> JsonResult {
    leaders_view(&state, StatKind::YellowCard, &filter).await
}

// POST /rpc/{name} - body is optional JSON arguments
async fn rpc(State(state): State<AppState>, Path(name): Path<String>, body: Bytes) -> JsonResult {
    let args = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::validation(format!("invalid arguments: {}", e)))?
    };
    let result = invoke(&state.pool, &state.standings, &name, &args).await?;
    respond(&result)
}
