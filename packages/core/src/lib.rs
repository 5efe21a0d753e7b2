// ABOUTME: Core types, date arithmetic and validation for Planboard
// ABOUTME: Foundational package shared by storage, the planning service and the adapters

pub mod constants;
pub mod dates;
pub mod types;
pub mod validation;

// Re-export main types
pub use types::{Activity, Instance, MoveDirection, Project, SubProject};

// Re-export constants
pub use constants::{database_file, planboard_dir, DATABASE_FILE_NAME, DEFAULT_SUB_PROJECT_NAME};

// Re-export date arithmetic
pub use dates::{
    add_days, build_day_range, diff_days_inclusive, is_weekend, parse_date_key, parse_date_value,
    to_date_key, DateKey, DayCell,
};

// Re-export validation
pub use validation::{
    parse_id, parse_id_str, parse_shift_days, validate_activity_payload,
    validate_duplicate_payload, validate_instance_payload, validate_project_payload,
    validate_sub_project_payload, ActivityDraft, ActivityPayload, DuplicateDraft,
    DuplicatePayload, InstanceDraft, InstancePayload, ProjectDraft, ProjectPayload,
    SubProjectDraft, SubProjectPayload, ValidationError,
};
