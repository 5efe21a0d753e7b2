// ABOUTME: Error taxonomy returned by every planning command
// ABOUTME: Typed variants callers discriminate on, including confirm-required preconditions

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use planboard_core::ValidationError;
use planboard_storage::StorageError;

/// Stable machine-readable codes for commands that need an explicit confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreconditionCode {
    ProjectRangePruneRequired,
    SubprojectShiftOutOfRangeDeleteRequired,
    SubprojectMinimumRequired,
}

impl PreconditionCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreconditionCode::ProjectRangePruneRequired => "PROJECT_RANGE_PRUNE_REQUIRED",
            PreconditionCode::SubprojectShiftOutOfRangeDeleteRequired => {
                "SUBPROJECT_SHIFT_OUT_OF_RANGE_DELETE_REQUIRED"
            }
            PreconditionCode::SubprojectMinimumRequired => "SUBPROJECT_MINIMUM_REQUIRED",
        }
    }
}

impl fmt::Display for PreconditionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The refusal a caller gets back before a destructive side effect.
/// Re-issuing the command with its confirm flag set proceeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Precondition {
    pub code: PreconditionCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_of_range_instances: Option<i64>,
}

impl Precondition {
    pub fn with_count(code: PreconditionCode, count: i64) -> Self {
        Self {
            code,
            out_of_range_instances: Some(count),
        }
    }

    pub fn bare(code: PreconditionCode) -> Self {
        Self {
            code,
            out_of_range_instances: None,
        }
    }
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.out_of_range_instances {
            Some(count) => write!(f, "{} ({} out-of-range instances)", self.code, count),
            None => write!(f, "{}", self.code),
        }
    }
}

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Name already in use: {0}")]
    NameConflict(String),
    #[error("Confirmation required: {0}")]
    PreconditionRequired(Precondition),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl PlannerError {
    pub fn not_found(kind: &str, id: impl fmt::Display) -> Self {
        PlannerError::NotFound(format!("{} {}", kind, id))
    }

    /// The precondition payload, when this is a confirm-required refusal
    pub fn precondition(&self) -> Option<&Precondition> {
        match self {
            PlannerError::PreconditionRequired(precondition) => Some(precondition),
            _ => None,
        }
    }

    /// Translate a store failure, turning uniqueness violations into `on_unique`.
    pub(crate) fn from_write(err: sqlx::Error, on_unique: impl FnOnce() -> PlannerError) -> Self {
        let err = StorageError::from(err);
        if err.is_unique_violation() {
            on_unique()
        } else {
            PlannerError::Storage(err)
        }
    }
}

impl From<ValidationError> for PlannerError {
    fn from(err: ValidationError) -> Self {
        PlannerError::InvalidInput(err.to_string())
    }
}

impl From<sqlx::Error> for PlannerError {
    fn from(err: sqlx::Error) -> Self {
        PlannerError::Storage(StorageError::Sqlx(err))
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_precondition_serializes_stable_codes() {
        let with_count =
            Precondition::with_count(PreconditionCode::ProjectRangePruneRequired, 3);
        assert_eq!(
            serde_json::to_value(&with_count).unwrap(),
            json!({"code": "PROJECT_RANGE_PRUNE_REQUIRED", "outOfRangeInstances": 3})
        );

        let bare = Precondition::bare(PreconditionCode::SubprojectMinimumRequired);
        assert_eq!(
            serde_json::to_value(&bare).unwrap(),
            json!({"code": "SUBPROJECT_MINIMUM_REQUIRED"})
        );

        assert_eq!(
            serde_json::to_value(PreconditionCode::SubprojectShiftOutOfRangeDeleteRequired)
                .unwrap(),
            json!(PreconditionCode::SubprojectShiftOutOfRangeDeleteRequired.as_str())
        );
    }

    #[test]
    fn test_validation_errors_become_invalid_input() {
        let err: PlannerError = ValidationError::Required("name").into();
        assert!(matches!(err, PlannerError::InvalidInput(ref m) if m == "name is required"));
    }
}
