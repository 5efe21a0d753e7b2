// ABOUTME: Common test utilities for planning service integration tests
// ABOUTME: Isolated database per test plus shorthand builders for payloads and fixtures

#![allow(dead_code)]

use planboard_projects::{
    Activity, ActivityPayload, DateKey, InstancePayload, PlanningService, Project, ProjectPayload,
    StoreConfig, SubProject, SubProjectPayload,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tempfile::TempDir;

/// A planning service backed by a throwaway database file
pub struct TestContext {
    pub service: PlanningService,
    pub _temp_dir: TempDir,
}

pub async fn setup() -> TestContext {
    let temp_dir = TempDir::new().unwrap();
    let service = PlanningService::open(StoreConfig::new(temp_dir.path().join("planboard.db")))
        .await
        .expect("Failed to open planning database");

    TestContext {
        service,
        _temp_dir: temp_dir,
    }
}

/// Build a raw payload the way a transport would, from JSON
pub fn payload<T: DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).expect("payload should deserialize")
}

pub fn day(key: &str) -> DateKey {
    key.parse().expect("valid date key")
}

impl TestContext {
    pub async fn project(&self, name: &str, start: &str, end: &str) -> Project {
        let body: ProjectPayload = payload(json!({
            "name": name,
            "startDate": start,
            "endDate": end,
        }));
        self.service.create_project(&body).await.unwrap()
    }

    pub async fn activity(&self, project_id: i64, name: &str) -> Activity {
        let body: ActivityPayload = payload(json!({"name": name, "color": "#3366ff"}));
        self.service.create_activity(project_id, &body).await.unwrap()
    }

    pub async fn sub_project(&self, project_id: i64, name: &str) -> SubProject {
        let body: SubProjectPayload = payload(json!({"name": name}));
        self.service
            .create_sub_project(project_id, &body)
            .await
            .unwrap()
    }

    /// The seed sub-project every project is created with
    pub async fn main_sub_project(&self, project_id: i64) -> SubProject {
        self.service
            .list_sub_projects(project_id)
            .await
            .unwrap()
            .into_iter()
            .next()
            .expect("project has a sub-project")
    }

    pub async fn assign(
        &self,
        project_id: i64,
        activity_id: i64,
        sub_project_id: i64,
        date: &str,
    ) -> i64 {
        let body: InstancePayload = payload(json!({"subProjectId": sub_project_id, "date": date}));
        self.service
            .assign_instance(project_id, activity_id, &body)
            .await
            .unwrap()
            .id
    }

    /// (activityId, day) pairs of a sub-project, sorted
    pub async fn layout(&self, project_id: i64, sub_project_id: i64) -> Vec<(i64, String)> {
        let board = self
            .service
            .get_board(project_id, Some(sub_project_id))
            .await
            .unwrap();
        let mut cells: Vec<(i64, String)> = board
            .instances
            .iter()
            .filter(|instance| instance.sub_project_id == sub_project_id)
            .map(|instance| (instance.activity_id, instance.day.to_string()))
            .collect();
        cells.sort();
        cells
    }
}
