// ABOUTME: Integration tests for the board projection
// ABOUTME: Day columns, active sub-project selection, map contents, ordering and default backfill

mod common;

use common::{day, setup};
use planboard_projects::{DayEntry, PlannerError};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_board_days_and_weekends() {
    let ctx = setup().await;
    // Friday through Monday
    let project = ctx.project("Weekend", "2026-02-13", "2026-02-16").await;

    let board = ctx.service.get_board(project.id, None).await.unwrap();
    let days: Vec<(String, bool)> = board
        .days
        .iter()
        .map(|cell| (cell.date.to_string(), cell.is_weekend))
        .collect();
    assert_eq!(
        days,
        vec![
            ("2026-02-13".to_string(), false),
            ("2026-02-14".to_string(), true),
            ("2026-02-15".to_string(), true),
            ("2026-02-16".to_string(), false),
        ]
    );
}

#[tokio::test]
async fn test_instance_map_follows_active_sub_project() {
    let ctx = setup().await;
    let project = ctx.project("Active", "2026-03-02", "2026-03-06").await;
    let build = ctx.activity(project.id, "Build").await;
    let main = ctx.main_sub_project(project.id).await;
    let extra = ctx.sub_project(project.id, "Extra").await;
    let in_main = ctx.assign(project.id, build.id, main.id, "2026-03-02").await;
    let in_extra = ctx.assign(project.id, build.id, extra.id, "2026-03-03").await;

    let default = ctx.service.get_board(project.id, None).await.unwrap();
    assert_eq!(default.active_sub_project_id, Some(main.id));
    assert_eq!(default.cell(build.id, day("2026-03-02")), Some(in_main));
    assert_eq!(default.cell(build.id, day("2026-03-03")), None);

    let chosen = ctx
        .service
        .get_board(project.id, Some(extra.id))
        .await
        .unwrap();
    assert_eq!(chosen.active_sub_project_id, Some(extra.id));
    assert_eq!(chosen.cell(build.id, day("2026-03-02")), None);
    assert_eq!(chosen.cell(build.id, day("2026-03-03")), Some(in_extra));

    // the day map always covers every sub-project
    for board in [&default, &chosen] {
        assert_eq!(
            board.sub_project_day_map[&main.id][&day("2026-03-02")],
            vec![DayEntry {
                instance_id: in_main,
                activity_id: build.id
            }]
        );
        assert_eq!(
            board.sub_project_day_map[&extra.id][&day("2026-03-03")],
            vec![DayEntry {
                instance_id: in_extra,
                activity_id: build.id
            }]
        );
    }
}

#[tokio::test]
async fn test_unknown_requested_sub_project_is_not_found() {
    let ctx = setup().await;
    let project = ctx.project("Strict", "2026-03-02", "2026-03-06").await;
    let other = ctx.project("Other", "2026-03-02", "2026-03-06").await;
    let foreign = ctx.main_sub_project(other.id).await;

    assert!(matches!(
        ctx.service.get_board(project.id, Some(foreign.id)).await,
        Err(PlannerError::NotFound(_))
    ));
    assert!(matches!(
        ctx.service.get_board(9999, None).await,
        Err(PlannerError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_instances_ordered_by_day_then_activity_order() {
    let ctx = setup().await;
    let project = ctx.project("Sorted", "2026-03-02", "2026-03-06").await;
    let build = ctx.activity(project.id, "Build").await;
    let test = ctx.activity(project.id, "Test").await;
    let main = ctx.main_sub_project(project.id).await;

    let build_late = ctx.assign(project.id, build.id, main.id, "2026-03-04").await;
    let test_early = ctx.assign(project.id, test.id, main.id, "2026-03-03").await;
    let test_late = ctx.assign(project.id, test.id, main.id, "2026-03-04").await;

    // put Test above Build
    ctx.service
        .reorder_activity(project.id, test.id, planboard_projects::MoveDirection::Up)
        .await
        .unwrap();

    let board = ctx.service.get_board(project.id, None).await.unwrap();
    let ids: Vec<i64> = board.instances.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![test_early, test_late, build_late]);

    let entries: Vec<i64> = board.sub_project_day_map[&main.id][&day("2026-03-04")]
        .iter()
        .map(|entry| entry.instance_id)
        .collect();
    assert_eq!(entries, vec![test_late, build_late]);
}

#[tokio::test]
async fn test_board_serializes_with_string_keys() {
    let ctx = setup().await;
    let project = ctx.project("Json", "2026-03-02", "2026-03-03").await;
    let build = ctx.activity(project.id, "Build").await;
    let main = ctx.main_sub_project(project.id).await;
    let id = ctx.assign(project.id, build.id, main.id, "2026-03-03").await;

    let board = ctx.service.get_board(project.id, None).await.unwrap();
    let value = serde_json::to_value(&board).unwrap();

    assert_eq!(value["activeSubProjectId"], json!(main.id));
    assert_eq!(
        value["instanceMap"][build.id.to_string()]["2026-03-03"],
        json!(id)
    );
    assert_eq!(
        value["subProjectDayMap"][main.id.to_string()]["2026-03-03"],
        json!([{"instanceId": id, "activityId": build.id}])
    );
    assert_eq!(value["days"][0], json!({"date": "2026-03-02", "isWeekend": false}));
}

#[tokio::test]
async fn test_board_backfills_missing_sub_project() {
    let ctx = setup().await;
    let project = ctx.project("Legacy", "2026-03-02", "2026-03-03").await;

    // simulate a project written before sub-projects existed
    let mut txn = ctx.service.store().begin_write().await.unwrap();
    sqlx::query("DELETE FROM subprojects WHERE projectId = ?")
        .bind(project.id)
        .execute(txn.conn())
        .await
        .unwrap();
    txn.commit().await.unwrap();

    let board = ctx.service.get_board(project.id, None).await.unwrap();
    assert_eq!(board.subprojects.len(), 1);
    assert_eq!(board.subprojects[0].name, "Main");
    assert_eq!(board.active_sub_project_id, Some(board.subprojects[0].id));

    // and only once
    let again = ctx.service.get_board(project.id, None).await.unwrap();
    assert_eq!(again.subprojects, board.subprojects);
}
