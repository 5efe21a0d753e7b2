// ABOUTME: Project commands and queries
// ABOUTME: Create with a seed sub-project, range updates with confirm-to-prune, cascading delete

use serde::Serialize;
use tracing::info;

use planboard_core::{validate_project_payload, Project, ProjectPayload, DEFAULT_SUB_PROJECT_NAME};
use planboard_storage::rows::{row_to_project, timestamp_now, PROJECT_COLUMNS};

use crate::error::{PlannerError, PlannerResult, Precondition, PreconditionCode};
use crate::service::{fetch_project, PlanningService};

/// A project after an update, with the number of instances pruned by a shrink.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdateOutcome {
    #[serde(flatten)]
    pub project: Project,
    pub pruned_instances: i64,
}

/// Rows removed along with a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDeleteOutcome {
    pub deleted_sub_projects: i64,
    pub deleted_activities: i64,
    pub deleted_instances: i64,
}

const OUT_OF_RANGE_FILTER: &str = r#"
    activityId IN (SELECT id FROM activities WHERE projectId = ?)
    AND (day < ? OR day > ?)
"#;

impl PlanningService {
    /// All projects, most recently updated first.
    pub async fn list_projects(&self) -> PlannerResult<Vec<Project>> {
        let sql = format!(
            "SELECT {} FROM projects ORDER BY updatedAt DESC, id DESC",
            PROJECT_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(self.store().pool()).await?;
        rows.iter()
            .map(|row| row_to_project(row).map_err(PlannerError::from))
            .collect()
    }

    pub async fn get_project(&self, project_id: i64) -> PlannerResult<Project> {
        let mut conn = self.store().pool().acquire().await?;
        fetch_project(&mut conn, project_id).await
    }

    /// Create a project together with its first sub-project.
    pub async fn create_project(&self, payload: &ProjectPayload) -> PlannerResult<Project> {
        let draft = validate_project_payload(payload)?;
        let sub_project_name = draft
            .sub_project_name
            .clone()
            .unwrap_or_else(|| DEFAULT_SUB_PROJECT_NAME.to_string());
        let now = timestamp_now();

        let mut txn = self.store().begin_write().await?;

        let project_id = sqlx::query(
            r#"
            INSERT INTO projects (name, startDate, endDate, lengthDays, createdAt, updatedAt)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&draft.name)
        .bind(draft.start_date.to_string())
        .bind(draft.end_date.to_string())
        .bind(draft.length_days)
        .bind(&now)
        .bind(&now)
        .execute(txn.conn())
        .await?
        .last_insert_rowid();

        sqlx::query(
            "INSERT INTO subprojects (projectId, name, sortOrder, createdAt) VALUES (?, ?, 1, ?)",
        )
        .bind(project_id)
        .bind(&sub_project_name)
        .bind(&now)
        .execute(txn.conn())
        .await?;

        let project = fetch_project(txn.conn(), project_id).await?;
        txn.commit().await?;

        info!(
            "Created project {} '{}' ({}..{}) with sub-project '{}'",
            project.id, project.name, project.start_date, project.end_date, sub_project_name
        );
        Ok(project)
    }

    /// Replace a project's name and range.
    ///
    /// When the new range would orphan instances the command is refused with
    /// `PROJECT_RANGE_PRUNE_REQUIRED` unless `confirm_trim_out_of_range` is set,
    /// in which case those instances are deleted in the same transaction.
    pub async fn update_project(
        &self,
        project_id: i64,
        payload: &ProjectPayload,
        confirm_trim_out_of_range: bool,
    ) -> PlannerResult<ProjectUpdateOutcome> {
        let draft = validate_project_payload(payload)?;
        let start = draft.start_date.to_string();
        let end = draft.end_date.to_string();

        let mut txn = self.store().begin_write().await?;
        fetch_project(txn.conn(), project_id).await?;

        let count_sql = format!(
            "SELECT COUNT(*) FROM activity_instances WHERE {}",
            OUT_OF_RANGE_FILTER
        );
        let out_of_range: i64 = sqlx::query_scalar(&count_sql)
            .bind(project_id)
            .bind(&start)
            .bind(&end)
            .fetch_one(txn.conn())
            .await?;

        if out_of_range > 0 && !confirm_trim_out_of_range {
            return Err(PlannerError::PreconditionRequired(Precondition::with_count(
                PreconditionCode::ProjectRangePruneRequired,
                out_of_range,
            )));
        }

        let mut pruned = 0;
        if out_of_range > 0 {
            let delete_sql = format!("DELETE FROM activity_instances WHERE {}", OUT_OF_RANGE_FILTER);
            pruned = sqlx::query(&delete_sql)
                .bind(project_id)
                .bind(&start)
                .bind(&end)
                .execute(txn.conn())
                .await?
                .rows_affected() as i64;
        }

        sqlx::query(
            r#"
            UPDATE projects
            SET name = ?, startDate = ?, endDate = ?, lengthDays = ?, updatedAt = ?
            WHERE id = ?
            "#,
        )
        .bind(&draft.name)
        .bind(&start)
        .bind(&end)
        .bind(draft.length_days)
        .bind(timestamp_now())
        .bind(project_id)
        .execute(txn.conn())
        .await?;

        let project = fetch_project(txn.conn(), project_id).await?;
        txn.commit().await?;

        info!(
            "Updated project {} to {}..{} (pruned {} instances)",
            project_id, start, end, pruned
        );
        Ok(ProjectUpdateOutcome {
            project,
            pruned_instances: pruned,
        })
    }

    /// Delete a project; sub-projects, activities and instances cascade.
    pub async fn delete_project(&self, project_id: i64) -> PlannerResult<ProjectDeleteOutcome> {
        let mut txn = self.store().begin_write().await?;
        fetch_project(txn.conn(), project_id).await?;

        let (deleted_sub_projects, deleted_activities, deleted_instances): (i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM subprojects WHERE projectId = ?1),
                    (SELECT COUNT(*) FROM activities WHERE projectId = ?1),
                    (SELECT COUNT(*) FROM activity_instances
                     WHERE subProjectId IN (SELECT id FROM subprojects WHERE projectId = ?1))
                "#,
            )
            .bind(project_id)
            .fetch_one(txn.conn())
            .await?;

        sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(project_id)
            .execute(txn.conn())
            .await?;
        txn.commit().await?;

        info!(
            "Deleted project {} ({} sub-projects, {} activities, {} instances)",
            project_id, deleted_sub_projects, deleted_activities, deleted_instances
        );
        Ok(ProjectDeleteOutcome {
            deleted_sub_projects,
            deleted_activities,
            deleted_instances,
        })
    }
}
