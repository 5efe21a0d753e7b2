// ABOUTME: HTTP request handlers for activities and their board instances
// ABOUTME: Activity CRUD and reorder, plus assigning and unassigning instances on a day

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;

use planboard_core::ValidationError;
use planboard_projects::{ActivityPayload, InstancePayload, PlanningService};

use crate::request::{json_body, path_id};
use crate::response::{ok, ApiError, ApiResult};
use crate::subproject_handlers::ReorderRequest;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignQuery {
    pub sub_project_id: Option<String>,
}

pub async fn list_activities(
    State(service): State<PlanningService>,
    Path(id): Path<String>,
) -> ApiResult {
    let project_id = path_id(&id)?;
    let activities = service.list_activities(project_id).await?;
    Ok(ok(StatusCode::OK, activities))
}

pub async fn get_activity(
    State(service): State<PlanningService>,
    Path((id, aid)): Path<(String, String)>,
) -> ApiResult {
    let (project_id, activity_id) = (path_id(&id)?, path_id(&aid)?);
    let activity = service.get_activity(project_id, activity_id).await?;
    Ok(ok(StatusCode::OK, activity))
}

pub async fn create_activity(
    State(service): State<PlanningService>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let project_id = path_id(&id)?;
    let payload: ActivityPayload = json_body(&body)?;
    let activity = service.create_activity(project_id, &payload).await?;
    info!("Created activity {} in project {} via API", activity.id, project_id);
    Ok(ok(StatusCode::CREATED, activity))
}

pub async fn update_activity(
    State(service): State<PlanningService>,
    Path((id, aid)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult {
    let (project_id, activity_id) = (path_id(&id)?, path_id(&aid)?);
    let payload: ActivityPayload = json_body(&body)?;
    let activity = service
        .update_activity(project_id, activity_id, &payload)
        .await?;
    Ok(ok(StatusCode::OK, activity))
}

pub async fn reorder_activity(
    State(service): State<PlanningService>,
    Path((id, aid)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult {
    let (project_id, activity_id) = (path_id(&id)?, path_id(&aid)?);
    let request: ReorderRequest = json_body(&body)?;
    let outcome = service
        .reorder_activity(project_id, activity_id, request.direction()?)
        .await?;
    Ok(ok(StatusCode::OK, outcome))
}

pub async fn delete_activity(
    State(service): State<PlanningService>,
    Path((id, aid)): Path<(String, String)>,
) -> ApiResult {
    let (project_id, activity_id) = (path_id(&id)?, path_id(&aid)?);
    info!("Deleting activity {} of project {}", activity_id, project_id);
    let outcome = service.delete_activity(project_id, activity_id).await?;
    Ok(ok(StatusCode::OK, outcome))
}

/// Place an activity on a sub-project day
pub async fn assign_instance(
    State(service): State<PlanningService>,
    Path((id, aid)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult {
    let (project_id, activity_id) = (path_id(&id)?, path_id(&aid)?);
    let payload: InstancePayload = json_body(&body)?;
    let instance = service
        .assign_instance(project_id, activity_id, &payload)
        .await?;
    Ok(ok(StatusCode::CREATED, instance))
}

/// Remove the instance on a day; the sub-project comes from the query string
pub async fn unassign_instance(
    State(service): State<PlanningService>,
    Path((id, aid, date)): Path<(String, String, String)>,
    Query(query): Query<UnassignQuery>,
) -> ApiResult {
    let (project_id, activity_id) = (path_id(&id)?, path_id(&aid)?);
    let sub_project_id = match query.sub_project_id.as_deref() {
        Some(raw) if !raw.is_empty() => path_id(raw)?,
        _ => return Err(ApiError::from(ValidationError::Required("subProjectId"))),
    };

    let instance = service
        .unassign_instance(project_id, activity_id, &date, sub_project_id)
        .await?;
    Ok(ok(StatusCode::OK, instance))
}
