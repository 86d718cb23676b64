use axum::{extract::State, Json};
use serde::Deserialize;
use types::{GenerationMethod, GenerationParams, GenerationSummary, Scope};
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorBody};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateIn {
    pub academic_year: String,
    pub semester: u8,
    #[serde(default)]
    pub method: GenerationMethod,
    /// Falls back to the server's configured parameters.
    #[serde(default)]
    pub params: Option<GenerationParams>,
}

impl GenerateIn {
    pub fn scope(&self) -> Scope {
        Scope::new(self.academic_year.clone(), self.semester)
    }
}

#[utoipa::path(
    post,
    path = "/api/timetable/generate",
    request_body = GenerateIn,
    responses(
        (status = 200, description = "Generation finished; partial runs list what stayed unplaced", body = GenerationSummary),
        (status = 400, description = "Invalid catalog or request", body = ErrorBody),
        (status = 409, description = "A generation for this scope is already running", body = ErrorBody)
    )
)]
pub async fn generate(
    State(state): State<AppState>,
    Json(input): Json<GenerateIn>,
) -> Result<Json<GenerationSummary>, ApiError> {
    let scope = input.scope();
    let summary = state
        .engine()
        .generate(scope, input.method, input.params)
        .await?;
    Ok(Json(summary))
}
