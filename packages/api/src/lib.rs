// ABOUTME: HTTP API layer for Planboard providing REST endpoints and routing
// ABOUTME: Maps /api paths onto planning service commands and their errors onto status codes

use axum::{
    http::StatusCode,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use planboard_projects::PlanningService;

pub mod activity_handlers;
pub mod project_handlers;
pub mod request;
pub mod response;
pub mod subproject_handlers;

pub use response::{ApiError, ApiResponse, ApiResult};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Health {
    status: &'static str,
    version: &'static str,
}

/// Liveness probe
async fn health() -> Response {
    response::ok(
        StatusCode::OK,
        Health {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

/// Creates the projects API router (nested under /api/projects)
pub fn create_projects_router() -> Router<PlanningService> {
    Router::new()
        .route("/", get(project_handlers::list_projects))
        .route("/", post(project_handlers::create_project))
        .route("/{id}", get(project_handlers::get_project))
        .route("/{id}", put(project_handlers::update_project))
        .route("/{id}", delete(project_handlers::delete_project))
        .route("/{id}/board", get(project_handlers::get_board))
        // Sub-projects
        .route("/{id}/subprojects", get(subproject_handlers::list_sub_projects))
        .route("/{id}/subprojects", post(subproject_handlers::create_sub_project))
        .route(
            "/{id}/subprojects/{sid}",
            get(subproject_handlers::get_sub_project),
        )
        .route(
            "/{id}/subprojects/{sid}",
            put(subproject_handlers::rename_sub_project),
        )
        .route(
            "/{id}/subprojects/{sid}",
            delete(subproject_handlers::delete_sub_project),
        )
        .route(
            "/{id}/subprojects/{sid}/reorder",
            post(subproject_handlers::reorder_sub_project),
        )
        .route(
            "/{id}/subprojects/{sid}/duplicate",
            post(subproject_handlers::duplicate_sub_project),
        )
        .route(
            "/{id}/subprojects/{sid}/shift",
            post(subproject_handlers::shift_sub_project),
        )
        // Activities and their instances
        .route("/{id}/activities", get(activity_handlers::list_activities))
        .route("/{id}/activities", post(activity_handlers::create_activity))
        .route(
            "/{id}/activities/{aid}",
            get(activity_handlers::get_activity),
        )
        .route(
            "/{id}/activities/{aid}",
            put(activity_handlers::update_activity),
        )
        .route(
            "/{id}/activities/{aid}",
            delete(activity_handlers::delete_activity),
        )
        .route(
            "/{id}/activities/{aid}/reorder",
            post(activity_handlers::reorder_activity),
        )
        .route(
            "/{id}/activities/{aid}/instances",
            post(activity_handlers::assign_instance),
        )
        .route(
            "/{id}/activities/{aid}/instances/{date}",
            delete(activity_handlers::unassign_instance),
        )
}

/// The complete application router with its state attached
pub fn create_router(service: PlanningService) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .nest("/api/projects", create_projects_router())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
