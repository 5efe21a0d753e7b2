// ABOUTME: PlanningService facade over the store plus lookups shared by every command
// ABOUTME: Entity fetches scoped to their project, reported as NotFound when absent

use sqlx::SqliteConnection;

use planboard_core::{Activity, Project, SubProject};
use planboard_storage::rows::{
    row_to_activity, row_to_project, row_to_sub_project, ACTIVITY_COLUMNS, PROJECT_COLUMNS,
    SUBPROJECT_COLUMNS,
};
use planboard_storage::{Store, StoreConfig};

use crate::error::{PlannerError, PlannerResult};

/// Command/query entry point for planning data.
///
/// Queries read straight from the pool. Every command runs as a single
/// transaction under the store's write gate, so commands are applied one at
/// a time in submission order.
#[derive(Clone)]
pub struct PlanningService {
    store: Store,
}

impl PlanningService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Open the database described by `config` and wrap it.
    pub async fn open(config: StoreConfig) -> PlannerResult<Self> {
        let store = Store::open(config).await?;
        Ok(Self::new(store))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

pub(crate) async fn fetch_project(
    conn: &mut SqliteConnection,
    project_id: i64,
) -> PlannerResult<Project> {
    let sql = format!("SELECT {} FROM projects WHERE id = ?", PROJECT_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(project_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| PlannerError::not_found("Project", project_id))?;
    Ok(row_to_project(&row)?)
}

pub(crate) async fn fetch_sub_project(
    conn: &mut SqliteConnection,
    project_id: i64,
    sub_project_id: i64,
) -> PlannerResult<SubProject> {
    let sql = format!(
        "SELECT {} FROM subprojects WHERE id = ? AND projectId = ?",
        SUBPROJECT_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(sub_project_id)
        .bind(project_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| PlannerError::not_found("SubProject", sub_project_id))?;
    Ok(row_to_sub_project(&row)?)
}

pub(crate) async fn fetch_activity(
    conn: &mut SqliteConnection,
    project_id: i64,
    activity_id: i64,
) -> PlannerResult<Activity> {
    let sql = format!(
        "SELECT {} FROM activities WHERE id = ? AND projectId = ?",
        ACTIVITY_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(activity_id)
        .bind(project_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| PlannerError::not_found("Activity", activity_id))?;
    Ok(row_to_activity(&row)?)
}

pub(crate) async fn load_sub_projects(
    conn: &mut SqliteConnection,
    project_id: i64,
) -> PlannerResult<Vec<SubProject>> {
    let sql = format!(
        "SELECT {} FROM subprojects WHERE projectId = ? ORDER BY sortOrder ASC, id ASC",
        SUBPROJECT_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(project_id)
        .fetch_all(&mut *conn)
        .await?;
    rows.iter()
        .map(|row| row_to_sub_project(row).map_err(PlannerError::from))
        .collect()
}

pub(crate) async fn load_activities(
    conn: &mut SqliteConnection,
    project_id: i64,
) -> PlannerResult<Vec<Activity>> {
    let sql = format!(
        "SELECT {} FROM activities WHERE projectId = ? ORDER BY sortOrder ASC, id ASC",
        ACTIVITY_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(project_id)
        .fetch_all(&mut *conn)
        .await?;
    rows.iter()
        .map(|row| row_to_activity(row).map_err(PlannerError::from))
        .collect()
}

/// Whether `name` is taken, case-insensitively, by another row of `table` in the project.
pub(crate) async fn name_taken(
    conn: &mut SqliteConnection,
    table: &str,
    project_id: i64,
    name: &str,
    except_id: Option<i64>,
) -> PlannerResult<bool> {
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE projectId = ? AND name = ? COLLATE NOCASE AND id != ?",
        table
    );
    let count: i64 = sqlx::query_scalar(&sql)
        .bind(project_id)
        .bind(name)
        .bind(except_id.unwrap_or(0))
        .fetch_one(&mut *conn)
        .await?;
    Ok(count > 0)
}
