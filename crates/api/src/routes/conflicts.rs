use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use types::{Conflict, Scope};
use utoipa::IntoParams;

use crate::error::{ApiError, ErrorBody};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConflictsQuery {
    pub academic_year: String,
    pub semester: u8,
    /// Also report soft-constraint findings.
    #[serde(default)]
    pub include_soft: bool,
}

#[utoipa::path(
    get,
    path = "/api/timetable/conflicts",
    params(ConflictsQuery),
    responses(
        (status = 200, description = "Conflicts in the stored timetable, ordered by severity", body = [Conflict]),
        (status = 400, description = "Stored data is inconsistent", body = ErrorBody)
    )
)]
pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<ConflictsQuery>,
) -> Result<Json<Vec<Conflict>>, ApiError> {
    let scope = Scope::new(q.academic_year, q.semester);
    let conflicts = state.engine().list_conflicts(&scope, q.include_soft).await?;
    Ok(Json(conflicts))
}
