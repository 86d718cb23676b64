use axum::{
    extract::{Path, State},
    Json,
};
use jobs::JobStatus;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorBody};
use crate::routes::generate::GenerateIn;
use crate::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct JobCreated {
    pub job_id: String,
    pub status: &'static str,
}

#[utoipa::path(
    post,
    path = "/api/timetable/jobs",
    request_body = GenerateIn,
    responses((status = 202, description = "Generation enqueued", body = JobCreated))
)]
pub async fn enqueue(
    State(state): State<AppState>,
    Json(input): Json<GenerateIn>,
) -> (http::StatusCode, Json<JobCreated>) {
    let id = state.jobs.enqueue(input.scope(), input.method, input.params);
    (
        http::StatusCode::ACCEPTED,
        Json(JobCreated {
            job_id: id.0,
            status: "queued",
        }),
    )
}

#[utoipa::path(
    get,
    path = "/api/timetable/jobs/{id}",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job status", body = JobStatus),
        (status = 404, description = "Unknown job", body = ErrorBody)
    )
)]
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobStatus>, ApiError> {
    state
        .jobs
        .get(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("job {id}")))
}
