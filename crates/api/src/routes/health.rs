use axum::extract::State;

use crate::error::{ApiError, ErrorBody};
use crate::state::AppState;

/// Liveness plus one round-trip to the timetable store.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service up and the timetable store answers"),
        (status = 503, description = "Timetable store unavailable", body = ErrorBody)
    )
)]
pub async fn health(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    state.engine().stats().await?;
    Ok("ok")
}
