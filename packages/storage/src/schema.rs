// ABOUTME: Schema creation and in-place upgrade of legacy planning databases
// ABOUTME: Gated on PRAGMA user_version; backfills sub-projects for pre-partition data

use sqlx::SqliteConnection;
use tracing::{debug, info, warn};

use planboard_core::DEFAULT_SUB_PROJECT_NAME;

use crate::error::{StorageError, StorageResult};
use crate::rows::timestamp_now;
use crate::store::Store;

/// Schema version written to `PRAGMA user_version` once migration completes.
/// Version 1 is the pre-partition layout (no sub-projects).
pub const SCHEMA_VERSION: i64 = 2;

const CREATE_PROJECTS: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    startDate TEXT NOT NULL,
    endDate TEXT NOT NULL,
    lengthDays INTEGER NOT NULL CHECK (lengthDays >= 1),
    createdAt TEXT NOT NULL,
    updatedAt TEXT NOT NULL
)
"#;

const CREATE_SUBPROJECTS: &str = r#"
CREATE TABLE IF NOT EXISTS subprojects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    projectId INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    sortOrder INTEGER NOT NULL,
    createdAt TEXT NOT NULL
)
"#;

const CREATE_ACTIVITIES: &str = r#"
CREATE TABLE IF NOT EXISTS activities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    projectId INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    color TEXT NOT NULL,
    createdAt TEXT NOT NULL,
    sortOrder INTEGER NOT NULL DEFAULT 0
)
"#;

const INSTANCES_COLUMNS: &str = r#"(
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    subProjectId INTEGER NOT NULL REFERENCES subprojects(id) ON DELETE CASCADE,
    activityId INTEGER NOT NULL REFERENCES activities(id) ON DELETE CASCADE,
    day TEXT NOT NULL,
    createdAt TEXT NOT NULL
)"#;

const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_projects_range ON projects(startDate, endDate)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_subprojects_project_name ON subprojects(projectId, name COLLATE NOCASE)",
    "CREATE INDEX IF NOT EXISTS idx_subprojects_project_order ON subprojects(projectId, sortOrder, id)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_activities_project_name ON activities(projectId, name COLLATE NOCASE)",
    "CREATE INDEX IF NOT EXISTS idx_activities_project_order ON activities(projectId, sortOrder, id)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_instances_unique ON activity_instances(subProjectId, activityId, day)",
    "CREATE INDEX IF NOT EXISTS idx_instances_subproject_day ON activity_instances(subProjectId, day)",
    "CREATE INDEX IF NOT EXISTS idx_instances_activity_subproject_day ON activity_instances(activityId, subProjectId, day)",
];

/// What a migration run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: i64,
    pub to_version: i64,
    pub added_activity_sort_order: bool,
    pub backfilled_sub_projects: u64,
    pub migrated_instances: u64,
}

/// Run the migration through the store's write gate in a single transaction.
pub async fn apply(store: &Store) -> StorageResult<MigrationReport> {
    let mut txn = store.begin_write().await?;
    let report = migrate(txn.conn()).await?;
    txn.commit().await?;
    Ok(report)
}

/// Create or upgrade every table on `conn`. Idempotent.
pub async fn migrate(conn: &mut SqliteConnection) -> StorageResult<MigrationReport> {
    let from_version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(&mut *conn)
        .await?;

    if from_version > SCHEMA_VERSION {
        return Err(StorageError::UnsupportedSchemaVersion {
            found: from_version,
            supported: SCHEMA_VERSION,
        });
    }

    let mut report = MigrationReport {
        from_version,
        to_version: SCHEMA_VERSION,
        ..MigrationReport::default()
    };
    let now = timestamp_now();

    sqlx::query(CREATE_PROJECTS).execute(&mut *conn).await?;
    sqlx::query(CREATE_ACTIVITIES).execute(&mut *conn).await?;

    if !column_exists(conn, "activities", "sortOrder").await? {
        warn!("Legacy activities table without sortOrder; backfilling from ids");
        sqlx::query("ALTER TABLE activities ADD COLUMN sortOrder INTEGER NOT NULL DEFAULT 0")
            .execute(&mut *conn)
            .await?;
        sqlx::query("UPDATE activities SET sortOrder = id")
            .execute(&mut *conn)
            .await?;
        report.added_activity_sort_order = true;
    }

    sqlx::query(CREATE_SUBPROJECTS).execute(&mut *conn).await?;

    report.backfilled_sub_projects = sqlx::query(
        r#"
        INSERT INTO subprojects (projectId, name, sortOrder, createdAt)
        SELECT p.id, ?, 1, ?
        FROM projects p
        WHERE NOT EXISTS (SELECT 1 FROM subprojects s WHERE s.projectId = p.id)
        "#,
    )
    .bind(DEFAULT_SUB_PROJECT_NAME)
    .bind(&now)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    if report.backfilled_sub_projects > 0 {
        warn!(
            "Created default sub-project for {} project(s)",
            report.backfilled_sub_projects
        );
    }

    if table_exists(conn, "activity_instances").await?
        && !column_exists(conn, "activity_instances", "subProjectId").await?
    {
        report.migrated_instances = rebuild_legacy_instances(conn, &now).await?;
    }

    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS activity_instances {INSTANCES_COLUMNS}"
    ))
    .execute(&mut *conn)
    .await?;

    for statement in CREATE_INDEXES {
        sqlx::query(statement).execute(&mut *conn).await?;
    }

    sqlx::query(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))
        .execute(&mut *conn)
        .await?;

    debug!("Schema migration finished: {:?}", report);
    Ok(report)
}

/// Move pre-partition instances into a table keyed by sub-project, assigning
/// each row to the default sub-project of its activity's project.
async fn rebuild_legacy_instances(conn: &mut SqliteConnection, now: &str) -> StorageResult<u64> {
    info!("Rebuilding legacy activity_instances with subProjectId");

    let created_expr = if column_exists(conn, "activity_instances", "createdAt").await? {
        "COALESCE(ai.createdAt, ?)"
    } else {
        "?"
    };

    sqlx::query("DROP TABLE IF EXISTS activity_instances_next")
        .execute(&mut *conn)
        .await?;
    sqlx::query(&format!(
        "CREATE TABLE activity_instances_next {INSTANCES_COLUMNS}"
    ))
    .execute(&mut *conn)
    .await?;

    let migrated = sqlx::query(&format!(
        r#"
        INSERT INTO activity_instances_next (id, subProjectId, activityId, day, createdAt)
        SELECT
            ai.id,
            (
                SELECT s.id FROM subprojects s
                WHERE s.projectId = a.projectId
                ORDER BY CASE WHEN s.name = ? COLLATE NOCASE THEN 0 ELSE 1 END, s.sortOrder, s.id
                LIMIT 1
            ),
            ai.activityId,
            ai.day,
            {created_expr}
        FROM activity_instances ai
        JOIN activities a ON a.id = ai.activityId
        ORDER BY ai.id
        "#
    ))
    .bind(DEFAULT_SUB_PROJECT_NAME)
    .bind(now)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    let legacy_total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_instances")
        .fetch_one(&mut *conn)
        .await?;
    let dropped = legacy_total - migrated as i64;
    if dropped > 0 {
        warn!("Dropped {} orphaned legacy instance(s) with no activity", dropped);
    }

    sqlx::query("DROP TABLE activity_instances")
        .execute(&mut *conn)
        .await?;
    sqlx::query("ALTER TABLE activity_instances_next RENAME TO activity_instances")
        .execute(&mut *conn)
        .await?;

    info!("Migrated {} legacy instance(s) into default sub-projects", migrated);
    Ok(migrated)
}

async fn table_exists(conn: &mut SqliteConnection, table: &str) -> StorageResult<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_one(&mut *conn)
            .await?;
    Ok(count > 0)
}

async fn column_exists(conn: &mut SqliteConnection, table: &str, column: &str) -> StorageResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?")
        .bind(table)
        .bind(column)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count > 0)
}
