// ABOUTME: Boundary validation for loosely typed planning payloads
// ABOUTME: Turns raw JSON-shaped input into checked drafts, deriving project ranges

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::dates::{add_days, diff_days_inclusive, parse_date_value, DateKey};

/// Longest accepted name for projects, sub-projects and activities
pub const MAX_NAME_LENGTH: usize = 200;

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#[0-9a-fA-F]{6}$").expect("hex color pattern is valid")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    #[error("{0} must be a string")]
    NotText(&'static str),
    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{0} contains invalid null bytes")]
    NullBytes(&'static str),
    #[error("Invalid date key (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),
    #[error("Date {date} shifted by {days} days leaves the calendar")]
    DateOutOfCalendar { date: String, days: i64 },
    #[error("Invalid color (expected #RRGGBB): {0}")]
    InvalidColor(String),
    #[error("Invalid id (expected a positive integer): {0}")]
    InvalidId(String),
    #[error("Invalid lengthDays (expected a positive integer): {0}")]
    InvalidLength(String),
    #[error("endDate {end} is before startDate {start}")]
    EndBeforeStart { start: String, end: String },
    #[error("endDate {end} does not match lengthDays {length_days} from startDate {start}")]
    RangeMismatch {
        start: String,
        end: String,
        length_days: i64,
    },
    #[error("Invalid direction (expected \"up\" or \"down\"): {0}")]
    InvalidDirection(String),
    #[error("Invalid shift (expected a non-zero integer number of days): {0}")]
    InvalidShift(String),
    #[error("activityIds must be an array of positive integers")]
    InvalidActivityIds,
}

/// Raw project body as received from a transport.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectPayload {
    pub name: Option<Value>,
    pub start_date: Option<Value>,
    pub end_date: Option<Value>,
    pub length_days: Option<Value>,
    pub sub_project_name: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActivityPayload {
    pub name: Option<Value>,
    pub color: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubProjectPayload {
    pub name: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstancePayload {
    pub sub_project_id: Option<Value>,
    pub date: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DuplicatePayload {
    pub name: Option<Value>,
    pub activity_ids: Option<Value>,
}

/// A fully resolved project range: all three of start, end and length agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub start_date: DateKey,
    pub end_date: DateKey,
    pub length_days: i64,
    pub sub_project_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDraft {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubProjectDraft {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDraft {
    pub sub_project_id: i64,
    pub date: DateKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DuplicateDraft {
    pub name: Option<String>,
    pub activity_ids: Option<Vec<i64>>,
}

fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn positive_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().filter(|v| *v > 0),
        Value::String(s) => parse_positive_digits(s),
        _ => None,
    }
}

fn parse_positive_digits(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<i64>().ok().filter(|v| *v > 0)
}

/// Parse an id from a JSON value. Only positive integers pass.
pub fn parse_id(value: &Value) -> Result<i64, ValidationError> {
    positive_integer(value).ok_or_else(|| ValidationError::InvalidId(value.to_string()))
}

/// Parse an id from a path or query segment.
pub fn parse_id_str(input: &str) -> Result<i64, ValidationError> {
    parse_positive_digits(input).ok_or_else(|| ValidationError::InvalidId(input.to_string()))
}

/// Parse a shift amount: any non-zero integer, given as a number or a signed digit string.
pub fn parse_shift_days(value: &Value) -> Result<i64, ValidationError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => {
            let digits = s.strip_prefix('-').unwrap_or(s);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                None
            } else {
                s.parse::<i64>().ok()
            }
        }
        _ => None,
    };

    parsed
        .filter(|days| *days != 0)
        .ok_or_else(|| ValidationError::InvalidShift(value.to_string()))
}

/// Trim and check a required name field.
pub fn required_name(field: &'static str, value: Option<&Value>) -> Result<String, ValidationError> {
    let raw = match value {
        None | Some(Value::Null) => return Err(ValidationError::Required(field)),
        Some(Value::String(s)) => s,
        Some(_) => return Err(ValidationError::NotText(field)),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty(field));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_NAME_LENGTH,
        });
    }
    if trimmed.contains('\0') {
        return Err(ValidationError::NullBytes(field));
    }

    Ok(trimmed.to_string())
}

/// Like [`required_name`], but absent or blank input means "not given".
pub fn optional_name(
    field: &'static str,
    value: Option<&Value>,
) -> Result<Option<String>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => required_name(field, Some(v)).map(Some),
    }
}

pub fn parse_color(value: Option<&Value>) -> Result<String, ValidationError> {
    let raw = match value {
        None | Some(Value::Null) => return Err(ValidationError::Required("color")),
        Some(Value::String(s)) => s.trim(),
        Some(other) => return Err(ValidationError::InvalidColor(other.to_string())),
    };

    if !HEX_COLOR.is_match(raw) {
        return Err(ValidationError::InvalidColor(raw.to_string()));
    }
    Ok(raw.to_string())
}

/// Validate a project body and derive whichever of endDate/lengthDays is missing.
pub fn validate_project_payload(payload: &ProjectPayload) -> Result<ProjectDraft, ValidationError> {
    let name = required_name("name", payload.name.as_ref())?;

    let start_date = match payload.start_date.as_ref() {
        Some(v) if !v.is_null() => parse_date_value(v)?,
        _ => return Err(ValidationError::Required("startDate")),
    };

    let end_date = if is_absent(payload.end_date.as_ref()) {
        None
    } else {
        payload.end_date.as_ref().map(parse_date_value).transpose()?
    };

    let length_days = if is_absent(payload.length_days.as_ref()) {
        None
    } else {
        payload
            .length_days
            .as_ref()
            .map(|v| positive_integer(v).ok_or_else(|| ValidationError::InvalidLength(v.to_string())))
            .transpose()?
    };

    let (end_date, length_days) = match (end_date, length_days) {
        (None, None) => return Err(ValidationError::Required("endDate or lengthDays")),
        (Some(end), maybe_length) => {
            if end < start_date {
                return Err(ValidationError::EndBeforeStart {
                    start: start_date.to_string(),
                    end: end.to_string(),
                });
            }
            let derived = diff_days_inclusive(start_date, end);
            if let Some(given) = maybe_length {
                if given != derived {
                    return Err(ValidationError::RangeMismatch {
                        start: start_date.to_string(),
                        end: end.to_string(),
                        length_days: given,
                    });
                }
            }
            (end, derived)
        }
        (None, Some(length)) => (add_days(start_date, length - 1)?, length),
    };

    let sub_project_name = optional_name("subProjectName", payload.sub_project_name.as_ref())?;

    Ok(ProjectDraft {
        name,
        start_date,
        end_date,
        length_days,
        sub_project_name,
    })
}

pub fn validate_activity_payload(payload: &ActivityPayload) -> Result<ActivityDraft, ValidationError> {
    Ok(ActivityDraft {
        name: required_name("name", payload.name.as_ref())?,
        color: parse_color(payload.color.as_ref())?,
    })
}

pub fn validate_sub_project_payload(
    payload: &SubProjectPayload,
) -> Result<SubProjectDraft, ValidationError> {
    Ok(SubProjectDraft {
        name: required_name("name", payload.name.as_ref())?,
    })
}

pub fn validate_instance_payload(payload: &InstancePayload) -> Result<InstanceDraft, ValidationError> {
    let sub_project_id = match payload.sub_project_id.as_ref() {
        Some(v) if !v.is_null() => parse_id(v)?,
        _ => return Err(ValidationError::Required("subProjectId")),
    };
    let date = match payload.date.as_ref() {
        Some(v) if !v.is_null() => parse_date_value(v)?,
        _ => return Err(ValidationError::Required("date")),
    };

    Ok(InstanceDraft {
        sub_project_id,
        date,
    })
}

pub fn validate_duplicate_payload(
    payload: &DuplicatePayload,
) -> Result<DuplicateDraft, ValidationError> {
    let name = optional_name("name", payload.name.as_ref())?;

    let activity_ids = match payload.activity_ids.as_ref() {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => {
            let mut ids = Vec::with_capacity(items.len());
            for item in items {
                let id = positive_integer(item).ok_or(ValidationError::InvalidActivityIds)?;
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            Some(ids)
        }
        Some(_) => return Err(ValidationError::InvalidActivityIds),
    };

    Ok(DuplicateDraft { name, activity_ids })
}
