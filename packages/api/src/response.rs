// ABOUTME: Shared API response envelope and error mapping
// ABOUTME: Every endpoint answers {success, data} or {success, error, code?, outOfRangeInstances?}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use serde::Serialize;
use tracing::error;

use planboard_core::ValidationError;
use planboard_projects::{PlannerError, PreconditionCode};

/// Standard API response wrapper
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<PreconditionCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_of_range_instances: Option<i64>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            code: None,
            out_of_range_instances: None,
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
            code: None,
            out_of_range_instances: None,
        }
    }
}

/// Wrap a successful result with the given status
pub fn ok<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, ResponseJson(ApiResponse::success(data))).into_response()
}

/// Error returned by handlers, rendered with the planning error's status code
#[derive(Debug)]
pub struct ApiError(pub PlannerError);

impl From<PlannerError> for ApiError {
    fn from(err: PlannerError) -> Self {
        ApiError(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError(err.into())
    }
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError(PlannerError::InvalidInput(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            PlannerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PlannerError::NotFound(_) => StatusCode::NOT_FOUND,
            PlannerError::Conflict(_)
            | PlannerError::NameConflict(_)
            | PlannerError::PreconditionRequired(_) => StatusCode::CONFLICT,
            PlannerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self.0 {
            PlannerError::Storage(err) => {
                error!("Storage failure while handling request: {}", err);
                ApiResponse::<()>::error("Database error".to_string())
            }
            PlannerError::PreconditionRequired(precondition) => {
                let mut body = ApiResponse::<()>::error(self.0.to_string());
                body.code = Some(precondition.code);
                body.out_of_range_instances = precondition.out_of_range_instances;
                body
            }
            other => ApiResponse::<()>::error(other.to_string()),
        };

        (status, ResponseJson(body)).into_response()
    }
}

pub type ApiResult = Result<Response, ApiError>;
