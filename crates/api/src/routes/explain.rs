use axum::{
    extract::{Query, State},
    Json,
};
use types::{EngineStats, GenerationRecord, SoftBreakdown};

use crate::error::{ApiError, ErrorBody};
use crate::routes::scope::ScopeQuery;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/timetable/explain",
    params(ScopeQuery),
    responses(
        (status = 200, description = "Soft-penalty breakdown of the stored timetable", body = SoftBreakdown),
        (status = 400, description = "Stored entries reference unknown entities", body = ErrorBody)
    )
)]
pub async fn explain(
    State(state): State<AppState>,
    Query(q): Query<ScopeQuery>,
) -> Result<Json<SoftBreakdown>, ApiError> {
    Ok(Json(state.engine().explain(&q.into()).await?))
}

#[utoipa::path(
    get,
    path = "/api/timetable/stats",
    responses((status = 200, description = "Catalog sizes and the last successful generation", body = EngineStats))
)]
pub async fn stats(State(state): State<AppState>) -> Result<Json<EngineStats>, ApiError> {
    Ok(Json(state.engine().stats().await?))
}

#[utoipa::path(
    get,
    path = "/api/timetable/generations",
    responses((status = 200, description = "Generation history, oldest first", body = [GenerationRecord]))
)]
pub async fn generations(State(state): State<AppState>) -> Result<Json<Vec<GenerationRecord>>, ApiError> {
    Ok(Json(state.engine().generations().await?))
}
