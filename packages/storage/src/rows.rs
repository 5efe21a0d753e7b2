// ABOUTME: Mapping from SQLite rows to planning entities
// ABOUTME: Column lists and row converters shared by every query in the service

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use planboard_core::{parse_date_key, Activity, DateKey, Instance, Project, SubProject};

use crate::error::{StorageError, StorageResult};

pub const PROJECT_COLUMNS: &str = "id, name, startDate, endDate, lengthDays, createdAt, updatedAt";
pub const SUBPROJECT_COLUMNS: &str = "id, projectId, name, sortOrder, createdAt";
pub const ACTIVITY_COLUMNS: &str = "id, projectId, name, color, sortOrder, createdAt";
pub const INSTANCE_COLUMNS: &str = "id, subProjectId, activityId, day, createdAt";

/// Current time in the fixed-width form stored in timestamp columns,
/// so that text ordering matches time ordering.
pub fn timestamp_now() -> String {
    format_timestamp(Utc::now())
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp. RFC 3339 is what we write; SQLite's own
/// `datetime()` format is accepted for rows written by older tools.
pub fn parse_timestamp(raw: &str) -> StorageResult<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| StorageError::Database(format!("Invalid timestamp: {}", raw)))
}

fn day_column(row: &SqliteRow, column: &str) -> StorageResult<DateKey> {
    let raw: String = row.try_get(column)?;
    parse_date_key(&raw)
        .map_err(|_| StorageError::Database(format!("Invalid {} value: {}", column, raw)))
}

fn timestamp_column(row: &SqliteRow, column: &str) -> StorageResult<DateTime<Utc>> {
    let raw: String = row.try_get(column)?;
    parse_timestamp(&raw)
}

pub fn row_to_project(row: &SqliteRow) -> StorageResult<Project> {
    Ok(Project {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        start_date: day_column(row, "startDate")?,
        end_date: day_column(row, "endDate")?,
        length_days: row.try_get("lengthDays")?,
        created_at: timestamp_column(row, "createdAt")?,
        updated_at: timestamp_column(row, "updatedAt")?,
    })
}

pub fn row_to_sub_project(row: &SqliteRow) -> StorageResult<SubProject> {
    Ok(SubProject {
        id: row.try_get("id")?,
        project_id: row.try_get("projectId")?,
        name: row.try_get("name")?,
        sort_order: row.try_get("sortOrder")?,
        created_at: timestamp_column(row, "createdAt")?,
    })
}

pub fn row_to_activity(row: &SqliteRow) -> StorageResult<Activity> {
    Ok(Activity {
        id: row.try_get("id")?,
        project_id: row.try_get("projectId")?,
        name: row.try_get("name")?,
        color: row.try_get("color")?,
        sort_order: row.try_get("sortOrder")?,
        created_at: timestamp_column(row, "createdAt")?,
    })
}

pub fn row_to_instance(row: &SqliteRow) -> StorageResult<Instance> {
    Ok(Instance {
        id: row.try_get("id")?,
        sub_project_id: row.try_get("subProjectId")?,
        activity_id: row.try_get("activityId")?,
        day: day_column(row, "day")?,
        created_at: timestamp_column(row, "createdAt")?,
    })
}
