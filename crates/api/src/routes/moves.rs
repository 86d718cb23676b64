use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use types::{ClassroomId, CommitOutcome, EntryId, MoveRequest, MoveVerdict, TeacherId, TimeSlotId};
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorBody};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/timetable/validate-move",
    request_body = MoveRequest,
    responses(
        (status = 200, description = "Hard violations the move would cause; empty when legal", body = MoveVerdict),
        (status = 404, description = "Unknown entry", body = ErrorBody)
    )
)]
pub async fn validate_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<MoveVerdict>, ApiError> {
    Ok(Json(state.engine().validate_move(&req).await?))
}

/// Target placement for an existing entry.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MovePatch {
    pub time_slot_id: TimeSlotId,
    #[serde(default)]
    pub classroom_id: Option<ClassroomId>,
    #[serde(default)]
    pub teacher_id: Option<TeacherId>,
}

#[utoipa::path(
    put,
    path = "/api/timetable/entries/{id}",
    params(("id" = String, Path, description = "Timetable entry ID")),
    request_body = MovePatch,
    responses(
        (status = 200, description = "Applied (ok) or rejected with its violations", body = CommitOutcome),
        (status = 404, description = "Unknown entry", body = ErrorBody),
        (status = 409, description = "Another change made the move illegal; retry", body = ErrorBody)
    )
)]
pub async fn commit_move(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<MovePatch>,
) -> Result<Json<CommitOutcome>, ApiError> {
    let req = MoveRequest {
        entry_id: EntryId(id),
        new_time_slot_id: patch.time_slot_id,
        new_classroom_id: patch.classroom_id,
        new_teacher_id: patch.teacher_id,
    };
    Ok(Json(state.engine().commit_move(&req).await?))
}

#[derive(Serialize, ToSchema)]
pub struct Removed {
    pub version: u64,
}

#[utoipa::path(
    delete,
    path = "/api/timetable/entries/{id}",
    params(("id" = String, Path, description = "Timetable entry ID")),
    responses(
        (status = 200, description = "Entry removed; new scope version", body = Removed),
        (status = 404, description = "Unknown entry", body = ErrorBody)
    )
)]
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Removed>, ApiError> {
    let version = state.engine().remove_entry(&EntryId(id)).await?;
    Ok(Json(Removed { version }))
}
