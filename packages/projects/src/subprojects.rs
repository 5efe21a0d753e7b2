// ABOUTME: Sub-project commands: create, rename, reorder, delete, duplicate and shift
// ABOUTME: Enforces the at-least-one rule and the confirm-to-delete protocol for shifts

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use planboard_core::validation::MAX_NAME_LENGTH;
use planboard_core::{
    add_days, validate_duplicate_payload, validate_sub_project_payload, DateKey,
    DuplicatePayload, Instance, MoveDirection, SubProject, SubProjectPayload, ValidationError,
};
use planboard_storage::rows::{row_to_instance, timestamp_now, INSTANCE_COLUMNS};

use crate::error::{PlannerError, PlannerResult, Precondition, PreconditionCode};
use crate::ordering::{next_sort_order, swap_with_neighbor, OrderedTable};
use crate::service::{
    fetch_project, fetch_sub_project, load_activities, load_sub_projects, name_taken,
    PlanningService,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderOutcome {
    pub moved: bool,
}

/// Instances removed along with a sub-project or an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub deleted_instances: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateOutcome {
    pub subproject: SubProject,
    pub copied_instances: i64,
}

/// What a shift did to each of the source sub-project's instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSummary {
    pub requested_shift_days: i64,
    pub moved_count: i64,
    pub skipped_out_of_range_count: i64,
    pub skipped_duplicate_count: i64,
    pub deleted_out_of_range_count: i64,
    pub total_source_count: i64,
    pub moved_instance_ids: Vec<i64>,
}

const TABLE: &str = "subprojects";

impl PlanningService {
    /// Sub-projects of a project in display order.
    pub async fn list_sub_projects(&self, project_id: i64) -> PlannerResult<Vec<SubProject>> {
        let mut conn = self.store().pool().acquire().await?;
        fetch_project(&mut conn, project_id).await?;
        load_sub_projects(&mut conn, project_id).await
    }

    pub async fn get_sub_project(
        &self,
        project_id: i64,
        sub_project_id: i64,
    ) -> PlannerResult<SubProject> {
        let mut conn = self.store().pool().acquire().await?;
        fetch_sub_project(&mut conn, project_id, sub_project_id).await
    }

    pub async fn create_sub_project(
        &self,
        project_id: i64,
        payload: &SubProjectPayload,
    ) -> PlannerResult<SubProject> {
        let draft = validate_sub_project_payload(payload)?;

        let mut txn = self.store().begin_write().await?;
        fetch_project(txn.conn(), project_id).await?;

        let sort_order = next_sort_order(txn.conn(), OrderedTable::SubProjects, project_id).await?;
        let id = insert_sub_project(txn.conn(), project_id, &draft.name, sort_order).await?;

        let sub_project = fetch_sub_project(txn.conn(), project_id, id).await?;
        txn.commit().await?;

        info!(
            "Created sub-project {} '{}' in project {}",
            sub_project.id, sub_project.name, project_id
        );
        Ok(sub_project)
    }

    pub async fn rename_sub_project(
        &self,
        project_id: i64,
        sub_project_id: i64,
        payload: &SubProjectPayload,
    ) -> PlannerResult<SubProject> {
        let draft = validate_sub_project_payload(payload)?;

        let mut txn = self.store().begin_write().await?;
        fetch_sub_project(txn.conn(), project_id, sub_project_id).await?;

        sqlx::query("UPDATE subprojects SET name = ? WHERE id = ?")
            .bind(&draft.name)
            .bind(sub_project_id)
            .execute(txn.conn())
            .await
            .map_err(|err| {
                PlannerError::from_write(err, || PlannerError::NameConflict(draft.name.clone()))
            })?;

        let sub_project = fetch_sub_project(txn.conn(), project_id, sub_project_id).await?;
        txn.commit().await?;

        info!("Renamed sub-project {} to '{}'", sub_project_id, sub_project.name);
        Ok(sub_project)
    }

    pub async fn reorder_sub_project(
        &self,
        project_id: i64,
        sub_project_id: i64,
        direction: MoveDirection,
    ) -> PlannerResult<ReorderOutcome> {
        let mut txn = self.store().begin_write().await?;
        let sub_project = fetch_sub_project(txn.conn(), project_id, sub_project_id).await?;

        let moved = swap_with_neighbor(
            txn.conn(),
            OrderedTable::SubProjects,
            project_id,
            sub_project_id,
            sub_project.sort_order,
            direction,
        )
        .await?;
        txn.commit().await?;

        if moved {
            info!("Moved sub-project {} {:?}", sub_project_id, direction);
        }
        Ok(ReorderOutcome { moved })
    }

    /// Delete a sub-project and its instances. The last sub-project of a
    /// project cannot be deleted.
    pub async fn delete_sub_project(
        &self,
        project_id: i64,
        sub_project_id: i64,
    ) -> PlannerResult<DeleteOutcome> {
        let mut txn = self.store().begin_write().await?;
        fetch_sub_project(txn.conn(), project_id, sub_project_id).await?;

        let siblings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subprojects WHERE projectId = ?")
            .bind(project_id)
            .fetch_one(txn.conn())
            .await?;
        if siblings <= 1 {
            return Err(PlannerError::PreconditionRequired(Precondition::bare(
                PreconditionCode::SubprojectMinimumRequired,
            )));
        }

        let deleted_instances = count_instances(txn.conn(), sub_project_id).await?;
        sqlx::query("DELETE FROM subprojects WHERE id = ?")
            .bind(sub_project_id)
            .execute(txn.conn())
            .await?;
        txn.commit().await?;

        info!(
            "Deleted sub-project {} ({} instances)",
            sub_project_id, deleted_instances
        );
        Ok(DeleteOutcome { deleted_instances })
    }

    /// Copy a sub-project and (a subset of) its instances into a new sub-project
    /// appended at the end of the project's list.
    pub async fn duplicate_sub_project(
        &self,
        project_id: i64,
        source_id: i64,
        payload: &DuplicatePayload,
    ) -> PlannerResult<DuplicateOutcome> {
        let draft = validate_duplicate_payload(payload)?;

        let mut txn = self.store().begin_write().await?;
        let source = fetch_sub_project(txn.conn(), project_id, source_id).await?;

        let name = match draft.name {
            Some(name) => {
                if name_taken(txn.conn(), TABLE, project_id, &name, None).await? {
                    return Err(PlannerError::NameConflict(name));
                }
                name
            }
            None => {
                let mut attempt = 1;
                loop {
                    let candidate = copy_name(&source.name, attempt);
                    if !name_taken(txn.conn(), TABLE, project_id, &candidate, None).await? {
                        break candidate;
                    }
                    attempt += 1;
                }
            }
        };

        if let Some(ids) = draft.activity_ids.as_ref() {
            let known: HashSet<i64> = load_activities(txn.conn(), project_id)
                .await?
                .into_iter()
                .map(|activity| activity.id)
                .collect();
            if let Some(foreign) = ids.iter().find(|id| !known.contains(*id)) {
                return Err(PlannerError::InvalidInput(format!(
                    "activity {} does not belong to project {}",
                    foreign, project_id
                )));
            }
        }

        let sort_order = next_sort_order(txn.conn(), OrderedTable::SubProjects, project_id).await?;
        let copy_id = insert_sub_project(txn.conn(), project_id, &name, sort_order).await?;
        let now = timestamp_now();

        let copy_sql = r#"
            INSERT INTO activity_instances (subProjectId, activityId, day, createdAt)
            SELECT ?, activityId, day, ?
            FROM activity_instances
            WHERE subProjectId = ?
        "#;

        let copied_instances = match draft.activity_ids {
            None => sqlx::query(copy_sql)
                .bind(copy_id)
                .bind(&now)
                .bind(source_id)
                .execute(txn.conn())
                .await?
                .rows_affected() as i64,
            Some(ids) => {
                let filtered_sql = format!("{} AND activityId = ?", copy_sql);
                let mut copied = 0;
                for activity_id in ids {
                    copied += sqlx::query(&filtered_sql)
                        .bind(copy_id)
                        .bind(&now)
                        .bind(source_id)
                        .bind(activity_id)
                        .execute(txn.conn())
                        .await?
                        .rows_affected() as i64;
                }
                copied
            }
        };

        let subproject = fetch_sub_project(txn.conn(), project_id, copy_id).await?;
        txn.commit().await?;

        info!(
            "Duplicated sub-project {} as {} '{}' ({} instances)",
            source_id, subproject.id, subproject.name, copied_instances
        );
        Ok(DuplicateOutcome {
            subproject,
            copied_instances,
        })
    }

    /// Move every instance of a sub-project by `days`.
    ///
    /// Instances whose target day leaves the project range are deleted, but
    /// only when `confirm_delete` is set; otherwise the command is refused
    /// with `SUBPROJECT_SHIFT_OUT_OF_RANGE_DELETE_REQUIRED`. A move whose
    /// target key is already occupied is skipped. Instance ids are preserved.
    ///
    /// Consecutive days of one activity shift together as a block: every
    /// instance moves by the same amount, so a run never collides with
    /// itself and `skipped_duplicate_count` is 0 for any shift of a single
    /// sub-project's own instances.
    pub async fn shift_sub_project(
        &self,
        project_id: i64,
        sub_project_id: i64,
        days: i64,
        confirm_delete: bool,
    ) -> PlannerResult<ShiftSummary> {
        if days == 0 {
            return Err(ValidationError::InvalidShift(days.to_string()).into());
        }

        let mut txn = self.store().begin_write().await?;
        let project = fetch_project(txn.conn(), project_id).await?;
        fetch_sub_project(txn.conn(), project_id, sub_project_id).await?;

        let sql = format!(
            "SELECT {} FROM activity_instances WHERE subProjectId = ? ORDER BY day ASC, id ASC",
            INSTANCE_COLUMNS
        );
        let source: Vec<Instance> = sqlx::query(&sql)
            .bind(sub_project_id)
            .fetch_all(txn.conn())
            .await?
            .iter()
            .map(|row| row_to_instance(row).map_err(PlannerError::from))
            .collect::<PlannerResult<_>>()?;
        let total_source_count = source.len() as i64;

        let mut out_of_range = Vec::new();
        let mut candidates = Vec::new();
        for instance in source {
            let target = add_days(instance.day, days)
                .ok()
                .filter(|day| project.contains(*day));
            match target {
                Some(target) => candidates.push((instance, target)),
                None => out_of_range.push(instance),
            }
        }

        if !out_of_range.is_empty() && !confirm_delete {
            return Err(PlannerError::PreconditionRequired(Precondition::with_count(
                PreconditionCode::SubprojectShiftOutOfRangeDeleteRequired,
                out_of_range.len() as i64,
            )));
        }

        for instance in &out_of_range {
            sqlx::query("DELETE FROM activity_instances WHERE id = ?")
                .bind(instance.id)
                .execute(txn.conn())
                .await?;
        }

        let (moves, skipped_duplicate_count) = plan_moves(candidates);

        // Move the instance furthest in the shift direction first so that no
        // intermediate state holds two instances on one key.
        let mut ordered: Vec<&(Instance, DateKey)> = moves.iter().collect();
        if days > 0 {
            ordered.reverse();
        }
        for (instance, target) in ordered {
            sqlx::query("UPDATE activity_instances SET day = ? WHERE id = ?")
                .bind(target.to_string())
                .bind(instance.id)
                .execute(txn.conn())
                .await?;
        }
        txn.commit().await?;

        let summary = ShiftSummary {
            requested_shift_days: days,
            moved_count: moves.len() as i64,
            skipped_out_of_range_count: out_of_range.len() as i64,
            skipped_duplicate_count,
            deleted_out_of_range_count: out_of_range.len() as i64,
            total_source_count,
            moved_instance_ids: moves.iter().map(|(instance, _)| instance.id).collect(),
        };
        info!(
            "Shifted sub-project {} by {} days: moved {}, deleted {}, skipped {}",
            sub_project_id,
            days,
            summary.moved_count,
            summary.deleted_out_of_range_count,
            summary.skipped_duplicate_count
        );
        Ok(summary)
    }
}

/// Resolve the final layout of a shift. Candidates arrive in ascending
/// (day, id) order; one whose target key is already claimed stays put and
/// claims its own key instead.
fn plan_moves(candidates: Vec<(Instance, DateKey)>) -> (Vec<(Instance, DateKey)>, i64) {
    let mut claimed: HashSet<(i64, DateKey)> = HashSet::new();
    let mut moves = Vec::with_capacity(candidates.len());
    let mut skipped = 0;

    for (instance, target) in candidates {
        if claimed.insert((instance.activity_id, target)) {
            moves.push((instance, target));
        } else {
            debug!(
                "Instance {} skipped: {} already occupied for activity {}",
                instance.id, target, instance.activity_id
            );
            claimed.insert((instance.activity_id, instance.day));
            skipped += 1;
        }
    }

    (moves, skipped)
}

/// `"<name> (copy)"` for the first attempt, `"<name> (copy N)"` after that.
/// The base name is shortened so the result never exceeds `MAX_NAME_LENGTH`.
fn copy_name(source: &str, attempt: u32) -> String {
    let suffix = if attempt <= 1 {
        " (copy)".to_string()
    } else {
        format!(" (copy {})", attempt)
    };
    let room = MAX_NAME_LENGTH.saturating_sub(suffix.chars().count());
    let base: String = source.chars().take(room).collect();
    format!("{}{}", base.trim_end(), suffix)
}

async fn insert_sub_project(
    conn: &mut sqlx::SqliteConnection,
    project_id: i64,
    name: &str,
    sort_order: i64,
) -> PlannerResult<i64> {
    let result = sqlx::query(
        "INSERT INTO subprojects (projectId, name, sortOrder, createdAt) VALUES (?, ?, ?, ?)",
    )
    .bind(project_id)
    .bind(name)
    .bind(sort_order)
    .bind(timestamp_now())
    .execute(&mut *conn)
    .await
    .map_err(|err| PlannerError::from_write(err, || PlannerError::NameConflict(name.to_string())))?;
    Ok(result.last_insert_rowid())
}

async fn count_instances(
    conn: &mut sqlx::SqliteConnection,
    sub_project_id: i64,
) -> PlannerResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM activity_instances WHERE subProjectId = ?")
            .bind(sub_project_id)
            .fetch_one(&mut *conn)
            .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn instance(id: i64, activity_id: i64, day: &str) -> Instance {
        Instance {
            id,
            sub_project_id: 1,
            activity_id,
            day: day.parse().unwrap(),
            created_at: Utc::now(),
        }
    }

    fn key(day: &str) -> DateKey {
        day.parse().unwrap()
    }

    #[test]
    fn test_copy_names() {
        assert_eq!(copy_name("Main", 1), "Main (copy)");
        assert_eq!(copy_name("Main", 2), "Main (copy 2)");
        assert_eq!(copy_name("Main", 7), "Main (copy 7)");
    }

    #[test]
    fn test_copy_name_fits_length_limit() {
        let long = "a".repeat(MAX_NAME_LENGTH);
        let first = copy_name(&long, 1);
        assert_eq!(first.chars().count(), MAX_NAME_LENGTH);
        assert!(first.ends_with(" (copy)"));

        let tenth = copy_name(&long, 10);
        assert_eq!(tenth.chars().count(), MAX_NAME_LENGTH);
        assert!(tenth.ends_with(" (copy 10)"));
    }

    #[test]
    fn test_plan_moves_skips_claimed_targets() {
        let candidates = vec![
            (instance(1, 10, "2026-09-01"), key("2026-09-03")),
            (instance(2, 10, "2026-09-02"), key("2026-09-03")),
            (instance(3, 11, "2026-09-02"), key("2026-09-03")),
        ];

        let (moves, skipped) = plan_moves(candidates);

        assert_eq!(skipped, 1);
        let moved: Vec<i64> = moves.iter().map(|(i, _)| i.id).collect();
        assert_eq!(moved, vec![1, 3]);
    }

    #[test]
    fn test_plan_moves_uniform_shift_never_collides() {
        let candidates = vec![
            (instance(1, 10, "2026-09-01"), key("2026-09-02")),
            (instance(2, 10, "2026-09-02"), key("2026-09-03")),
            (instance(3, 10, "2026-09-03"), key("2026-09-04")),
        ];

        let (moves, skipped) = plan_moves(candidates);

        assert_eq!(skipped, 0);
        assert_eq!(moves.len(), 3);
    }
}
