use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sched_core::{EngineError, InputError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub kind: String,
}

#[derive(Debug)]
pub enum ApiError {
    Engine(EngineError),
    NotFound(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::Engine(InputError::single(msg).into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) | ApiError::Engine(EngineError::EntryNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Engine(EngineError::Input(_)) => StatusCode::BAD_REQUEST,
            ApiError::Engine(EngineError::ConcurrentModification { .. } | EngineError::ScopeBusy(_)) => {
                StatusCode::CONFLICT
            }
            ApiError::Engine(EngineError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::Engine(e) => ErrorBody {
                error: e.to_string(),
                kind: e.kind().to_string(),
            },
            ApiError::NotFound(what) => ErrorBody {
                error: format!("{what} not found"),
                kind: "not_found".to_string(),
            },
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError::Engine(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }
        (status, Json(self.body())).into_response()
    }
}
