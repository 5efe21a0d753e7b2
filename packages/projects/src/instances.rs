// ABOUTME: Assigning and unassigning activity instances on board cells
// ABOUTME: One instance per (sub-project, activity, day), always inside the project range

use tracing::info;

use planboard_core::{parse_date_key, validate_instance_payload, Instance, InstancePayload};
use planboard_storage::rows::{row_to_instance, timestamp_now, INSTANCE_COLUMNS};

use crate::error::{PlannerError, PlannerResult};
use crate::service::{fetch_activity, fetch_project, fetch_sub_project, PlanningService};

impl PlanningService {
    /// Place `activity_id` on a day of a sub-project.
    pub async fn assign_instance(
        &self,
        project_id: i64,
        activity_id: i64,
        payload: &InstancePayload,
    ) -> PlannerResult<Instance> {
        let draft = validate_instance_payload(payload)?;

        let mut txn = self.store().begin_write().await?;
        let project = fetch_project(txn.conn(), project_id).await?;
        fetch_activity(txn.conn(), project_id, activity_id).await?;
        fetch_sub_project(txn.conn(), project_id, draft.sub_project_id).await?;

        if !project.contains(draft.date) {
            return Err(PlannerError::InvalidInput(format!(
                "date {} is outside the project range {}..{}",
                draft.date, project.start_date, project.end_date
            )));
        }

        let conflict = || {
            PlannerError::Conflict(format!(
                "activity {} is already assigned on {} in sub-project {}",
                activity_id, draft.date, draft.sub_project_id
            ))
        };

        let instance_id = sqlx::query(
            r#"
            INSERT INTO activity_instances (subProjectId, activityId, day, createdAt)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(draft.sub_project_id)
        .bind(activity_id)
        .bind(draft.date.to_string())
        .bind(timestamp_now())
        .execute(txn.conn())
        .await
        .map_err(|err| PlannerError::from_write(err, conflict))?
        .last_insert_rowid();

        let sql = format!(
            "SELECT {} FROM activity_instances WHERE id = ?",
            INSTANCE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(instance_id)
            .fetch_one(txn.conn())
            .await?;
        let instance = row_to_instance(&row)?;
        txn.commit().await?;

        info!(
            "Assigned activity {} on {} in sub-project {} (instance {})",
            activity_id, instance.day, instance.sub_project_id, instance.id
        );
        Ok(instance)
    }

    /// Remove the instance at (sub-project, activity, day) and return it.
    pub async fn unassign_instance(
        &self,
        project_id: i64,
        activity_id: i64,
        date: &str,
        sub_project_id: i64,
    ) -> PlannerResult<Instance> {
        let day = parse_date_key(date)?;

        let mut txn = self.store().begin_write().await?;
        fetch_activity(txn.conn(), project_id, activity_id).await?;
        fetch_sub_project(txn.conn(), project_id, sub_project_id).await?;

        let sql = format!(
            "SELECT {} FROM activity_instances WHERE subProjectId = ? AND activityId = ? AND day = ?",
            INSTANCE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(sub_project_id)
            .bind(activity_id)
            .bind(day.to_string())
            .fetch_optional(txn.conn())
            .await?
            .ok_or_else(|| {
                PlannerError::NotFound(format!(
                    "Instance of activity {} on {} in sub-project {}",
                    activity_id, day, sub_project_id
                ))
            })?;
        let instance = row_to_instance(&row)?;

        sqlx::query("DELETE FROM activity_instances WHERE id = ?")
            .bind(instance.id)
            .execute(txn.conn())
            .await?;
        txn.commit().await?;

        info!(
            "Unassigned activity {} on {} in sub-project {} (instance {})",
            activity_id, day, sub_project_id, instance.id
        );
        Ok(instance)
    }
}
