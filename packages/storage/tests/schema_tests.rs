// ABOUTME: Integration tests for schema creation and legacy migration
// ABOUTME: Verifies tables, indexes, user_version and the pre-partition upgrade path

use std::path::Path;

use planboard_storage::{StorageError, Store, StoreConfig, SCHEMA_VERSION};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, Row, SqliteConnection};
use tempfile::TempDir;

async fn open_store(dir: &TempDir) -> Store {
    Store::open(StoreConfig::new(dir.path().join("plan.db")))
        .await
        .expect("store should open")
}

/// Build a database in the shape used before sub-projects existed
async fn create_legacy_db(path: &Path) {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let mut conn = SqliteConnection::connect_with(&options).await.unwrap();

    let statements = [
        r#"CREATE TABLE projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            startDate TEXT NOT NULL,
            endDate TEXT NOT NULL,
            lengthDays INTEGER NOT NULL,
            createdAt TEXT NOT NULL,
            updatedAt TEXT NOT NULL
        )"#,
        r#"CREATE TABLE activities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            projectId INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            createdAt TEXT NOT NULL
        )"#,
        r#"CREATE TABLE activity_instances (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            activityId INTEGER NOT NULL REFERENCES activities(id) ON DELETE CASCADE,
            day TEXT NOT NULL,
            createdAt TEXT NOT NULL,
            UNIQUE (activityId, day)
        )"#,
        "INSERT INTO projects (name, startDate, endDate, lengthDays, createdAt, updatedAt) VALUES ('Alpha', '2026-02-10', '2026-02-12', 3, '2026-01-01T00:00:00.000Z', '2026-01-01T00:00:00.000Z')",
        "INSERT INTO projects (name, startDate, endDate, lengthDays, createdAt, updatedAt) VALUES ('Beta', '2026-03-01', '2026-03-02', 2, '2026-01-02T00:00:00.000Z', '2026-01-02T00:00:00.000Z')",
        "INSERT INTO activities (projectId, name, color, createdAt) VALUES (1, 'Build', '#ff0000', '2026-01-01T00:00:00.000Z')",
        "INSERT INTO activities (projectId, name, color, createdAt) VALUES (1, 'Test', '#00ff00', '2026-01-01T00:00:00.000Z')",
        "INSERT INTO activities (projectId, name, color, createdAt) VALUES (2, 'Ship', '#0000ff', '2026-01-02T00:00:00.000Z')",
        "INSERT INTO activity_instances (activityId, day, createdAt) VALUES (1, '2026-02-10', '2026-01-05T00:00:00.000Z')",
        "INSERT INTO activity_instances (activityId, day, createdAt) VALUES (1, '2026-02-11', '2026-01-05T00:00:00.000Z')",
        "INSERT INTO activity_instances (activityId, day, createdAt) VALUES (2, '2026-02-12', '2026-01-05T00:00:00.000Z')",
        "INSERT INTO activity_instances (activityId, day, createdAt) VALUES (3, '2026-03-02', '2026-01-06T00:00:00.000Z')",
        "PRAGMA user_version = 1",
    ];

    for statement in statements {
        sqlx::query(statement).execute(&mut conn).await.unwrap();
    }
    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_fresh_database_has_all_tables() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(store.pool())
    .await
    .unwrap();

    assert_eq!(
        tables,
        vec!["activities", "activity_instances", "projects", "subprojects"]
    );
}

#[tokio::test]
async fn test_fresh_database_has_indexes_and_version() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let indexes: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%' ORDER BY name",
    )
    .fetch_all(store.pool())
    .await
    .unwrap();

    for expected in [
        "idx_activities_project_name",
        "idx_activities_project_order",
        "idx_instances_activity_subproject_day",
        "idx_instances_subproject_day",
        "idx_instances_unique",
        "idx_projects_range",
        "idx_subprojects_project_name",
        "idx_subprojects_project_order",
    ] {
        assert!(indexes.contains(&expected.to_string()), "missing index {expected}");
    }

    let version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(version, SCHEMA_VERSION);
}

#[tokio::test]
async fn test_reopen_is_idempotent() {
    let dir = TempDir::new().unwrap();
    {
        let store = open_store(&dir).await;
        let mut txn = store.begin_write().await.unwrap();
        sqlx::query("INSERT INTO projects (name, startDate, endDate, lengthDays, createdAt, updatedAt) VALUES ('A', '2026-01-01', '2026-01-01', 1, '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')")
            .execute(txn.conn())
            .await
            .unwrap();
        sqlx::query("INSERT INTO subprojects (projectId, name, sortOrder, createdAt) VALUES (1, 'Main', 1, '2026-01-01T00:00:00Z')")
            .execute(txn.conn())
            .await
            .unwrap();
        txn.commit().await.unwrap();
        store.close().await;
    }

    let store = open_store(&dir).await;
    let sub_projects: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subprojects")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(sub_projects, 1);
}

#[tokio::test]
async fn test_case_insensitive_name_uniqueness() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let mut txn = store.begin_write().await.unwrap();
    sqlx::query("INSERT INTO projects (name, startDate, endDate, lengthDays, createdAt, updatedAt) VALUES ('A', '2026-01-01', '2026-01-01', 1, '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')")
        .execute(txn.conn())
        .await
        .unwrap();
    sqlx::query("INSERT INTO activities (projectId, name, color, sortOrder, createdAt) VALUES (1, 'Build', '#112233', 1, '2026-01-01T00:00:00Z')")
        .execute(txn.conn())
        .await
        .unwrap();
    let duplicate = sqlx::query("INSERT INTO activities (projectId, name, color, sortOrder, createdAt) VALUES (1, 'BUILD', '#112233', 2, '2026-01-01T00:00:00Z')")
        .execute(txn.conn())
        .await
        .map_err(StorageError::from)
        .unwrap_err();

    assert!(duplicate.is_unique_violation());
}

#[tokio::test]
async fn test_legacy_database_is_upgraded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.db");
    create_legacy_db(&path).await;

    let store = Store::open(StoreConfig::new(&path)).await.unwrap();

    // Every project gained a Main sub-project
    let rows = sqlx::query("SELECT projectId, name, sortOrder FROM subprojects ORDER BY projectId")
        .fetch_all(store.pool())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    for (row, project_id) in rows.iter().zip([1_i64, 2]) {
        assert_eq!(row.get::<i64, _>("projectId"), project_id);
        assert_eq!(row.get::<String, _>("name"), "Main");
        assert_eq!(row.get::<i64, _>("sortOrder"), 1);
    }

    // Activities were given a sortOrder equal to their id
    let orders: Vec<(i64, i64)> = sqlx::query_as("SELECT id, sortOrder FROM activities ORDER BY id")
        .fetch_all(store.pool())
        .await
        .unwrap();
    assert_eq!(orders, vec![(1, 1), (2, 2), (3, 3)]);

    // Instances kept their ids and now point at their project's Main sub-project
    let instances: Vec<(i64, i64, i64, String)> = sqlx::query_as(
        r#"
        SELECT ai.id, ai.subProjectId, s.projectId, ai.day
        FROM activity_instances ai
        JOIN subprojects s ON s.id = ai.subProjectId
        ORDER BY ai.id
        "#,
    )
    .fetch_all(store.pool())
    .await
    .unwrap();
    assert_eq!(instances.len(), 4);
    assert_eq!(instances[0].0, 1);
    assert_eq!(instances[0].2, 1);
    assert_eq!(instances[2].3, "2026-02-12");
    assert_eq!(instances[3].2, 2);

    let version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(version, SCHEMA_VERSION);

    // Cascades work on the rebuilt table
    let mut txn = store.begin_write().await.unwrap();
    sqlx::query("DELETE FROM activities WHERE id = 1")
        .execute(txn.conn())
        .await
        .unwrap();
    txn.commit().await.unwrap();

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_instances")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(remaining, 2);
}

#[tokio::test]
async fn test_newer_schema_is_refused() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("future.db");
    {
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let mut conn = SqliteConnection::connect_with(&options).await.unwrap();
        sqlx::query("PRAGMA user_version = 99")
            .execute(&mut conn)
            .await
            .unwrap();
        conn.close().await.unwrap();
    }

    let result = Store::open(StoreConfig::new(&path)).await;
    assert!(matches!(
        result,
        Err(StorageError::UnsupportedSchemaVersion { found: 99, .. })
    ));
}
