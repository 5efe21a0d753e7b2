// ABOUTME: HTTP request handlers for projects and the board projection
// ABOUTME: Thin wrappers that decode requests and delegate to the planning service

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use planboard_projects::{PlanningService, ProjectPayload};

use crate::request::{is_confirmed, json_body, path_id};
use crate::response::{ok, ApiResult};

/// Body of a project update: the full project fields plus the prune confirmation
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[serde(flatten)]
    pub project: ProjectPayload,
    pub confirm_trim_out_of_range: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardQuery {
    pub sub_project_id: Option<String>,
}

/// List all projects
pub async fn list_projects(State(service): State<PlanningService>) -> ApiResult {
    info!("Listing projects");
    let projects = service.list_projects().await?;
    Ok(ok(StatusCode::OK, projects))
}

/// Create a project and its first sub-project
pub async fn create_project(State(service): State<PlanningService>, body: Bytes) -> ApiResult {
    let payload: ProjectPayload = json_body(&body)?;
    let project = service.create_project(&payload).await?;
    info!("Created project {} via API", project.id);
    Ok(ok(StatusCode::CREATED, project))
}

/// Get a single project by ID
pub async fn get_project(
    State(service): State<PlanningService>,
    Path(id): Path<String>,
) -> ApiResult {
    let project_id = path_id(&id)?;
    info!("Getting project: {}", project_id);
    let project = service.get_project(project_id).await?;
    Ok(ok(StatusCode::OK, project))
}

/// Replace a project's name and range
pub async fn update_project(
    State(service): State<PlanningService>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let project_id = path_id(&id)?;
    let request: UpdateProjectRequest = json_body(&body)?;
    let confirm = is_confirmed(request.confirm_trim_out_of_range.as_ref());
    info!("Updating project {} (confirm trim: {})", project_id, confirm);

    let outcome = service
        .update_project(project_id, &request.project, confirm)
        .await?;
    Ok(ok(StatusCode::OK, outcome))
}

/// Delete a project and everything in it
pub async fn delete_project(
    State(service): State<PlanningService>,
    Path(id): Path<String>,
) -> ApiResult {
    let project_id = path_id(&id)?;
    info!("Deleting project: {}", project_id);
    let outcome = service.delete_project(project_id).await?;
    Ok(ok(StatusCode::OK, outcome))
}

/// Project the board, optionally for a chosen sub-project
pub async fn get_board(
    State(service): State<PlanningService>,
    Path(id): Path<String>,
    Query(query): Query<BoardQuery>,
) -> ApiResult {
    let project_id = path_id(&id)?;
    let requested = query
        .sub_project_id
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(path_id)
        .transpose()?;

    let board = service.get_board(project_id, requested).await?;
    Ok(ok(StatusCode::OK, board))
}
