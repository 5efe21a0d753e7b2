// ABOUTME: Integration tests for activities and instance assignment
// ABOUTME: Color validation, name conflicts, reorder, cascading delete, assign and unassign rules

mod common;

use common::{payload, setup};
use planboard_projects::{ActivityPayload, InstancePayload, MoveDirection, PlannerError};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};

#[rstest]
#[case::missing_color(json!({"name": "Build"}))]
#[case::short_hex(json!({"name": "Build", "color": "#fff"}))]
#[case::named_color(json!({"name": "Build", "color": "red"}))]
#[case::blank_name(json!({"name": "", "color": "#123456"}))]
#[case::numeric_name(json!({"name": 12, "color": "#123456"}))]
#[tokio::test]
async fn test_invalid_activity_payloads(#[case] body: Value) {
    let ctx = setup().await;
    let project = ctx.project("Colors", "2026-01-01", "2026-01-05").await;
    let body: ActivityPayload = payload(body);

    assert!(matches!(
        ctx.service.create_activity(project.id, &body).await,
        Err(PlannerError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_activity_lifecycle() {
    let ctx = setup().await;
    let project = ctx.project("Acts", "2026-01-01", "2026-01-05").await;
    let build = ctx.activity(project.id, "Build").await;
    let test = ctx.activity(project.id, "Test").await;
    assert_eq!((build.sort_order, test.sort_order), (1, 2));

    let duplicate: ActivityPayload = payload(json!({"name": "BUILD", "color": "#000000"}));
    assert!(matches!(
        ctx.service.create_activity(project.id, &duplicate).await,
        Err(PlannerError::NameConflict(_))
    ));

    let update: ActivityPayload = payload(json!({"name": "Verify", "color": "#ABCDEF"}));
    let updated = ctx
        .service
        .update_activity(project.id, test.id, &update)
        .await
        .unwrap();
    assert_eq!(updated.name, "Verify");
    assert_eq!(updated.color, "#ABCDEF");
    assert_eq!(updated.sort_order, 2);

    let clash: ActivityPayload = payload(json!({"name": "build", "color": "#ABCDEF"}));
    assert!(matches!(
        ctx.service
            .update_activity(project.id, test.id, &clash)
            .await,
        Err(PlannerError::NameConflict(_))
    ));

    let moved = ctx
        .service
        .reorder_activity(project.id, test.id, MoveDirection::Up)
        .await
        .unwrap();
    assert!(moved.moved);
    let names: Vec<String> = ctx
        .service
        .list_activities(project.id)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(names, vec!["Verify", "Build"]);
}

#[tokio::test]
async fn test_delete_activity_removes_its_instances_everywhere() {
    let ctx = setup().await;
    let project = ctx.project("Acts", "2026-01-01", "2026-01-05").await;
    let build = ctx.activity(project.id, "Build").await;
    let test = ctx.activity(project.id, "Test").await;
    let main = ctx.main_sub_project(project.id).await;
    let extra = ctx.sub_project(project.id, "Extra").await;
    ctx.assign(project.id, build.id, main.id, "2026-01-01").await;
    ctx.assign(project.id, build.id, extra.id, "2026-01-02").await;
    ctx.assign(project.id, test.id, main.id, "2026-01-03").await;

    let outcome = ctx
        .service
        .delete_activity(project.id, build.id)
        .await
        .unwrap();
    assert_eq!(outcome.deleted_instances, 2);

    let board = ctx.service.get_board(project.id, None).await.unwrap();
    assert_eq!(board.activities.len(), 1);
    assert_eq!(board.instances.len(), 1);
    assert_eq!(board.instances[0].activity_id, test.id);

    assert!(matches!(
        ctx.service.get_activity(project.id, build.id).await,
        Err(PlannerError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_assign_validates_date_and_ownership() {
    let ctx = setup().await;
    let project = ctx.project("Range", "2026-01-10", "2026-01-12").await;
    let other = ctx.project("Elsewhere", "2026-01-10", "2026-01-12").await;
    let build = ctx.activity(project.id, "Build").await;
    let foreign_activity = ctx.activity(other.id, "Foreign").await;
    let main = ctx.main_sub_project(project.id).await;
    let foreign_sub = ctx.main_sub_project(other.id).await;

    let outside: InstancePayload = payload(json!({"subProjectId": main.id, "date": "2026-01-13"}));
    assert!(matches!(
        ctx.service.assign_instance(project.id, build.id, &outside).await,
        Err(PlannerError::InvalidInput(_))
    ));

    let malformed: InstancePayload = payload(json!({"subProjectId": main.id, "date": "2026-1-11"}));
    assert!(matches!(
        ctx.service
            .assign_instance(project.id, build.id, &malformed)
            .await,
        Err(PlannerError::InvalidInput(_))
    ));

    let missing_sub: InstancePayload = payload(json!({"date": "2026-01-11"}));
    assert!(matches!(
        ctx.service
            .assign_instance(project.id, build.id, &missing_sub)
            .await,
        Err(PlannerError::InvalidInput(_))
    ));

    let wrong_sub: InstancePayload =
        payload(json!({"subProjectId": foreign_sub.id, "date": "2026-01-11"}));
    assert!(matches!(
        ctx.service.assign_instance(project.id, build.id, &wrong_sub).await,
        Err(PlannerError::NotFound(_))
    ));

    let ok: InstancePayload = payload(json!({"subProjectId": main.id, "date": "2026-01-11"}));
    assert!(matches!(
        ctx.service
            .assign_instance(project.id, foreign_activity.id, &ok)
            .await,
        Err(PlannerError::NotFound(_))
    ));

    // string ids are accepted at the boundary
    let stringly: InstancePayload =
        payload(json!({"subProjectId": main.id.to_string(), "date": "2026-01-11"}));
    let instance = ctx
        .service
        .assign_instance(project.id, build.id, &stringly)
        .await
        .unwrap();
    assert_eq!(instance.sub_project_id, main.id);
    assert_eq!(instance.day.to_string(), "2026-01-11");
}

#[tokio::test]
async fn test_same_cell_in_another_sub_project_is_allowed() {
    let ctx = setup().await;
    let project = ctx.project("Cells", "2026-01-10", "2026-01-12").await;
    let build = ctx.activity(project.id, "Build").await;
    let main = ctx.main_sub_project(project.id).await;
    let extra = ctx.sub_project(project.id, "Extra").await;

    let first = ctx.assign(project.id, build.id, main.id, "2026-01-10").await;
    let second = ctx.assign(project.id, build.id, extra.id, "2026-01-10").await;
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_unassign_returns_removed_instance() {
    let ctx = setup().await;
    let project = ctx.project("Undo", "2026-01-10", "2026-01-12").await;
    let build = ctx.activity(project.id, "Build").await;
    let main = ctx.main_sub_project(project.id).await;
    let id = ctx.assign(project.id, build.id, main.id, "2026-01-11").await;

    let removed = ctx
        .service
        .unassign_instance(project.id, build.id, "2026-01-11", main.id)
        .await
        .unwrap();
    assert_eq!(removed.id, id);
    assert!(ctx.layout(project.id, main.id).await.is_empty());

    assert!(matches!(
        ctx.service
            .unassign_instance(project.id, build.id, "2026-01-11", main.id)
            .await,
        Err(PlannerError::NotFound(_))
    ));
    assert!(matches!(
        ctx.service
            .unassign_instance(project.id, build.id, "11/01/2026", main.id)
            .await,
        Err(PlannerError::InvalidInput(_))
    ));
}
