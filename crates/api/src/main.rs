mod config;
mod error;
mod state;
mod telemetry;
pub mod routes {
    pub mod conflicts;
    pub mod explain;
    pub mod generate;
    pub mod health;
    pub mod jobs;
    pub mod moves;
    pub mod scope;
    pub mod view;
}

use axum::{
    routing::{get, post, put},
    Router,
};

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            routes::health::health,
            routes::generate::generate,
            routes::jobs::enqueue,
            routes::jobs::status,
            routes::conflicts::list,
            routes::moves::validate_move,
            routes::moves::commit_move,
            routes::moves::remove,
            routes::view::view,
            routes::explain::explain,
            routes::explain::stats,
            routes::explain::generations,
        ),
        components(schemas(
            types::Scope, types::TimetableEntry, types::EntryOrigin, types::SessionType,
            types::EntryId, types::GroupId, types::SubjectId, types::TeacherId,
            types::ClassroomId, types::TimeSlotId, types::ConflictId,
            types::Conflict, types::ConflictType, types::Severity, types::ConstraintViolation,
            types::GenerationMethod, types::GenerationParams, types::GenerationSummary,
            types::GenerationRecord, types::GenerationStatus,
            types::Unscheduled, types::UnscheduledReason,
            types::MoveRequest, types::MoveVerdict, types::CommitOutcome,
            types::SoftBreakdown, types::EngineStats,
            jobs::JobId, jobs::JobStatus,
            error::ErrorBody,
            routes::generate::GenerateIn,
            routes::jobs::JobCreated,
            routes::moves::MovePatch,
            routes::moves::Removed,
            routes::view::ViewBy
        )),
        tags(
            (name = "timetable", description = "Timetable generation and conflict management API")
        )
    )]
struct ApiDoc;

fn router(app_state: state::AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/timetable/generate", post(routes::generate::generate))
        .route("/api/timetable/jobs", post(routes::jobs::enqueue))
        .route("/api/timetable/jobs/:id", get(routes::jobs::status))
        .route("/api/timetable/conflicts", get(routes::conflicts::list))
        .route("/api/timetable/validate-move", post(routes::moves::validate_move))
        .route(
            "/api/timetable/entries/:id",
            put(routes::moves::commit_move).delete(routes::moves::remove),
        )
        .route("/api/timetable/view", get(routes::view::view))
        .route("/api/timetable/explain", get(routes::explain::explain))
        .route("/api/timetable/stats", get(routes::explain::stats))
        .route("/api/timetable/generations", get(routes::explain::generations))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let config = config::Config::from_env()?;
    let app_state = state::AppState::from_config(&config)?;
    let app = router(app_state).layer(telemetry::stack(config.body_limit));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, data = ?config.data_path, seed = config.generation.seed, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
