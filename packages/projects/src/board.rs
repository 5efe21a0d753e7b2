// ABOUTME: Board projection: everything a schedule grid needs in one read
// ABOUTME: Day columns, ordered rows, the active sub-project's cell map and per-day entries for all

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use planboard_core::{
    build_day_range, Activity, DateKey, DayCell, Instance, Project, SubProject,
    DEFAULT_SUB_PROJECT_NAME,
};
use planboard_storage::rows::{row_to_instance, timestamp_now};

use crate::error::{PlannerError, PlannerResult};
use crate::service::{fetch_project, load_activities, load_sub_projects, PlanningService};

/// One instance placed on a sub-project day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayEntry {
    pub instance_id: i64,
    pub activity_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub project: Project,
    pub days: Vec<DayCell>,
    pub subprojects: Vec<SubProject>,
    pub activities: Vec<Activity>,
    pub active_sub_project_id: Option<i64>,
    /// Every instance in the project, by (day, activity sortOrder, id)
    pub instances: Vec<Instance>,
    /// activityId -> day -> instanceId, for the active sub-project only
    pub instance_map: BTreeMap<i64, BTreeMap<DateKey, i64>>,
    /// subProjectId -> day -> entries, for every sub-project
    pub sub_project_day_map: BTreeMap<i64, BTreeMap<DateKey, Vec<DayEntry>>>,
}

impl Board {
    /// Instance id at an activity row and day of the active sub-project.
    pub fn cell(&self, activity_id: i64, day: DateKey) -> Option<i64> {
        self.instance_map
            .get(&activity_id)
            .and_then(|days| days.get(&day))
            .copied()
    }
}

impl PlanningService {
    /// Project the board for `project_id`.
    ///
    /// `requested_sub_project_id` selects the active sub-project; it must belong
    /// to the project. Without one, the first sub-project in order is active.
    pub async fn get_board(
        &self,
        project_id: i64,
        requested_sub_project_id: Option<i64>,
    ) -> PlannerResult<Board> {
        {
            let mut conn = self.store().pool().acquire().await?;
            fetch_project(&mut conn, project_id).await?;
            if load_sub_projects(&mut conn, project_id).await?.is_empty() {
                drop(conn);
                self.ensure_default_sub_project(project_id).await?;
            }
        }

        // One read transaction so every part of the board comes from the same snapshot
        let mut tx = self.store().pool().begin().await?;
        let project = fetch_project(&mut tx, project_id).await?;
        let subprojects = load_sub_projects(&mut tx, project_id).await?;
        let activities = load_activities(&mut tx, project_id).await?;

        let active_sub_project_id = match requested_sub_project_id {
            Some(requested) => {
                if !subprojects.iter().any(|sub| sub.id == requested) {
                    return Err(PlannerError::not_found("SubProject", requested));
                }
                Some(requested)
            }
            None => subprojects.first().map(|sub| sub.id),
        };

        let rows = sqlx::query(
            r#"
            SELECT ai.id AS id, ai.subProjectId AS subProjectId, ai.activityId AS activityId,
                   ai.day AS day, ai.createdAt AS createdAt
            FROM activity_instances ai
            JOIN activities a ON a.id = ai.activityId
            WHERE a.projectId = ?
            ORDER BY ai.day ASC, a.sortOrder ASC, ai.id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        let instances = rows
            .iter()
            .map(|row| row_to_instance(row).map_err(PlannerError::from))
            .collect::<PlannerResult<Vec<_>>>()?;

        let mut instance_map: BTreeMap<i64, BTreeMap<DateKey, i64>> = activities
            .iter()
            .map(|activity| (activity.id, BTreeMap::new()))
            .collect();
        let mut sub_project_day_map: BTreeMap<i64, BTreeMap<DateKey, Vec<DayEntry>>> = subprojects
            .iter()
            .map(|sub| (sub.id, BTreeMap::new()))
            .collect();

        for instance in &instances {
            if Some(instance.sub_project_id) == active_sub_project_id {
                instance_map
                    .entry(instance.activity_id)
                    .or_default()
                    .insert(instance.day, instance.id);
            }
            sub_project_day_map
                .entry(instance.sub_project_id)
                .or_default()
                .entry(instance.day)
                .or_default()
                .push(DayEntry {
                    instance_id: instance.id,
                    activity_id: instance.activity_id,
                });
        }

        debug!(
            "Board for project {}: {} days, {} sub-projects, {} activities, {} instances",
            project_id,
            project.length_days,
            subprojects.len(),
            activities.len(),
            instances.len()
        );

        Ok(Board {
            days: build_day_range(project.start_date, project.end_date),
            project,
            subprojects,
            activities,
            active_sub_project_id,
            instances,
            instance_map,
            sub_project_day_map,
        })
    }

    /// Give a project left without sub-projects (older databases) its default one.
    async fn ensure_default_sub_project(&self, project_id: i64) -> PlannerResult<()> {
        let mut txn = self.store().begin_write().await?;
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subprojects WHERE projectId = ?")
            .bind(project_id)
            .fetch_one(txn.conn())
            .await?;
        if existing > 0 {
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO subprojects (projectId, name, sortOrder, createdAt) VALUES (?, ?, 1, ?)",
        )
        .bind(project_id)
        .bind(DEFAULT_SUB_PROJECT_NAME)
        .bind(timestamp_now())
        .execute(txn.conn())
        .await?;
        txn.commit().await?;

        warn!(
            "Project {} had no sub-projects; created '{}'",
            project_id, DEFAULT_SUB_PROJECT_NAME
        );
        Ok(())
    }
}
