// ABOUTME: HTTP request handlers for sub-project operations
// ABOUTME: List, create, rename, reorder, delete, duplicate and shift within a project

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use planboard_core::{parse_shift_days, MoveDirection, ValidationError};
use planboard_projects::{DuplicatePayload, PlanningService, SubProjectPayload};

use crate::request::{is_confirmed, json_body, path_id};
use crate::response::{ok, ApiError, ApiResult};

/// Body of a reorder request
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReorderRequest {
    pub direction: Option<Value>,
}

impl ReorderRequest {
    pub fn direction(&self) -> Result<MoveDirection, ApiError> {
        match self.direction.as_ref() {
            Some(Value::String(raw)) => Ok(raw.parse::<MoveDirection>()?),
            Some(other) => Err(ValidationError::InvalidDirection(other.to_string()).into()),
            None => Err(ValidationError::Required("direction").into()),
        }
    }
}

/// Body of a shift request
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShiftRequest {
    pub days: Option<Value>,
    pub confirm_delete: Option<Value>,
}

/// List sub-projects in display order
pub async fn list_sub_projects(
    State(service): State<PlanningService>,
    Path(id): Path<String>,
) -> ApiResult {
    let project_id = path_id(&id)?;
    let sub_projects = service.list_sub_projects(project_id).await?;
    Ok(ok(StatusCode::OK, sub_projects))
}

pub async fn get_sub_project(
    State(service): State<PlanningService>,
    Path((id, sid)): Path<(String, String)>,
) -> ApiResult {
    let (project_id, sub_project_id) = (path_id(&id)?, path_id(&sid)?);
    let sub_project = service.get_sub_project(project_id, sub_project_id).await?;
    Ok(ok(StatusCode::OK, sub_project))
}

pub async fn create_sub_project(
    State(service): State<PlanningService>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let project_id = path_id(&id)?;
    let payload: SubProjectPayload = json_body(&body)?;
    let sub_project = service.create_sub_project(project_id, &payload).await?;
    info!(
        "Created sub-project {} in project {} via API",
        sub_project.id, project_id
    );
    Ok(ok(StatusCode::CREATED, sub_project))
}

pub async fn rename_sub_project(
    State(service): State<PlanningService>,
    Path((id, sid)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult {
    let (project_id, sub_project_id) = (path_id(&id)?, path_id(&sid)?);
    let payload: SubProjectPayload = json_body(&body)?;
    let sub_project = service
        .rename_sub_project(project_id, sub_project_id, &payload)
        .await?;
    Ok(ok(StatusCode::OK, sub_project))
}

pub async fn reorder_sub_project(
    State(service): State<PlanningService>,
    Path((id, sid)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult {
    let (project_id, sub_project_id) = (path_id(&id)?, path_id(&sid)?);
    let request: ReorderRequest = json_body(&body)?;
    let outcome = service
        .reorder_sub_project(project_id, sub_project_id, request.direction()?)
        .await?;
    Ok(ok(StatusCode::OK, outcome))
}

pub async fn delete_sub_project(
    State(service): State<PlanningService>,
    Path((id, sid)): Path<(String, String)>,
) -> ApiResult {
    let (project_id, sub_project_id) = (path_id(&id)?, path_id(&sid)?);
    info!("Deleting sub-project {} of project {}", sub_project_id, project_id);
    let outcome = service.delete_sub_project(project_id, sub_project_id).await?;
    Ok(ok(StatusCode::OK, outcome))
}

pub async fn duplicate_sub_project(
    State(service): State<PlanningService>,
    Path((id, sid)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult {
    let (project_id, sub_project_id) = (path_id(&id)?, path_id(&sid)?);
    let payload: DuplicatePayload = json_body(&body)?;
    let outcome = service
        .duplicate_sub_project(project_id, sub_project_id, &payload)
        .await?;
    Ok(ok(StatusCode::CREATED, outcome))
}

pub async fn shift_sub_project(
    State(service): State<PlanningService>,
    Path((id, sid)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult {
    let (project_id, sub_project_id) = (path_id(&id)?, path_id(&sid)?);
    let request: ShiftRequest = json_body(&body)?;
    let days = match request.days.as_ref() {
        Some(value) if !value.is_null() => parse_shift_days(value)?,
        _ => return Err(ValidationError::Required("days").into()),
    };
    let confirm = is_confirmed(request.confirm_delete.as_ref());
    info!(
        "Shifting sub-project {} by {} days (confirm delete: {})",
        sub_project_id, days, confirm
    );

    let summary = service
        .shift_sub_project(project_id, sub_project_id, days, confirm)
        .await?;
    Ok(ok(StatusCode::OK, summary))
}
