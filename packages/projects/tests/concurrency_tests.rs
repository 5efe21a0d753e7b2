// ABOUTME: Concurrent commands against one planning service
// ABOUTME: Writes apply one at a time, so racing commands see each other's committed effects

mod common;

use common::{payload, setup};
use planboard_projects::{InstancePayload, PlannerError, SubProjectPayload};
use serde_json::json;

#[tokio::test]
async fn test_racing_assigns_of_one_cell_yield_single_instance() {
    let ctx = setup().await;
    let project = ctx.project("Race", "2026-05-01", "2026-05-03").await;
    let build = ctx.activity(project.id, "Build").await;
    let main = ctx.main_sub_project(project.id).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = ctx.service.clone();
        let body: InstancePayload = payload(json!({"subProjectId": main.id, "date": "2026-05-02"}));
        handles.push(tokio::spawn(async move {
            service.assign_instance(project.id, build.id, &body).await
        }));
    }

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(PlannerError::Conflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(ctx.layout(project.id, main.id).await.len(), 1);
}

#[tokio::test]
async fn test_concurrent_creates_get_distinct_sort_orders() {
    let ctx = setup().await;
    let project = ctx.project("Orders", "2026-05-01", "2026-05-03").await;

    let mut handles = Vec::new();
    for i in 0..10 {
        let service = ctx.service.clone();
        let body: SubProjectPayload = payload(json!({"name": format!("Lane {i}")}));
        handles.push(tokio::spawn(async move {
            service.create_sub_project(project.id, &body).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let mut orders: Vec<i64> = ctx
        .service
        .list_sub_projects(project.id)
        .await
        .unwrap()
        .iter()
        .map(|s| s.sort_order)
        .collect();
    orders.sort();
    assert_eq!(orders, (1..=11).collect::<Vec<i64>>());
}
