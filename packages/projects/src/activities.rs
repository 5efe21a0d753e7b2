// ABOUTME: Activity commands and queries
// ABOUTME: Colored rows shared by all sub-projects of a project, kept in sortOrder

use tracing::info;

use planboard_core::{validate_activity_payload, Activity, ActivityPayload, MoveDirection};
use planboard_storage::rows::timestamp_now;

use crate::error::{PlannerError, PlannerResult};
use crate::ordering::{next_sort_order, swap_with_neighbor, OrderedTable};
use crate::service::{fetch_activity, fetch_project, load_activities, PlanningService};
use crate::subprojects::{DeleteOutcome, ReorderOutcome};

impl PlanningService {
    /// Activities of a project in display order.
    pub async fn list_activities(&self, project_id: i64) -> PlannerResult<Vec<Activity>> {
        let mut conn = self.store().pool().acquire().await?;
        fetch_project(&mut conn, project_id).await?;
        load_activities(&mut conn, project_id).await
    }

    pub async fn get_activity(&self, project_id: i64, activity_id: i64) -> PlannerResult<Activity> {
        let mut conn = self.store().pool().acquire().await?;
        fetch_activity(&mut conn, project_id, activity_id).await
    }

    pub async fn create_activity(
        &self,
        project_id: i64,
        payload: &ActivityPayload,
    ) -> PlannerResult<Activity> {
        let draft = validate_activity_payload(payload)?;

        let mut txn = self.store().begin_write().await?;
        fetch_project(txn.conn(), project_id).await?;

        let sort_order = next_sort_order(txn.conn(), OrderedTable::Activities, project_id).await?;
        let activity_id = sqlx::query(
            r#"
            INSERT INTO activities (projectId, name, color, sortOrder, createdAt)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(project_id)
        .bind(&draft.name)
        .bind(&draft.color)
        .bind(sort_order)
        .bind(timestamp_now())
        .execute(txn.conn())
        .await
        .map_err(|err| {
            PlannerError::from_write(err, || PlannerError::NameConflict(draft.name.clone()))
        })?
        .last_insert_rowid();

        let activity = fetch_activity(txn.conn(), project_id, activity_id).await?;
        txn.commit().await?;

        info!(
            "Created activity {} '{}' in project {}",
            activity.id, activity.name, project_id
        );
        Ok(activity)
    }

    /// Rename and recolor an activity.
    pub async fn update_activity(
        &self,
        project_id: i64,
        activity_id: i64,
        payload: &ActivityPayload,
    ) -> PlannerResult<Activity> {
        let draft = validate_activity_payload(payload)?;

        let mut txn = self.store().begin_write().await?;
        fetch_activity(txn.conn(), project_id, activity_id).await?;

        sqlx::query("UPDATE activities SET name = ?, color = ? WHERE id = ?")
            .bind(&draft.name)
            .bind(&draft.color)
            .bind(activity_id)
            .execute(txn.conn())
            .await
            .map_err(|err| {
                PlannerError::from_write(err, || PlannerError::NameConflict(draft.name.clone()))
            })?;

        let activity = fetch_activity(txn.conn(), project_id, activity_id).await?;
        txn.commit().await?;

        info!("Updated activity {}", activity_id);
        Ok(activity)
    }

    pub async fn reorder_activity(
        &self,
        project_id: i64,
        activity_id: i64,
        direction: MoveDirection,
    ) -> PlannerResult<ReorderOutcome> {
        let mut txn = self.store().begin_write().await?;
        let activity = fetch_activity(txn.conn(), project_id, activity_id).await?;

        let moved = swap_with_neighbor(
            txn.conn(),
            OrderedTable::Activities,
            project_id,
            activity_id,
            activity.sort_order,
            direction,
        )
        .await?;
        txn.commit().await?;

        if moved {
            info!("Moved activity {} {:?}", activity_id, direction);
        }
        Ok(ReorderOutcome { moved })
    }

    /// Delete an activity; its instances in every sub-project cascade.
    pub async fn delete_activity(
        &self,
        project_id: i64,
        activity_id: i64,
    ) -> PlannerResult<DeleteOutcome> {
        let mut txn = self.store().begin_write().await?;
        fetch_activity(txn.conn(), project_id, activity_id).await?;

        let deleted_instances: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM activity_instances WHERE activityId = ?")
                .bind(activity_id)
                .fetch_one(txn.conn())
                .await?;
        sqlx::query("DELETE FROM activities WHERE id = ?")
            .bind(activity_id)
            .execute(txn.conn())
            .await?;
        txn.commit().await?;

        info!(
            "Deleted activity {} ({} instances)",
            activity_id, deleted_instances
        );
        Ok(DeleteOutcome { deleted_instances })
    }
}
