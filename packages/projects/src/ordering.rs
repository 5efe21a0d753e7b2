// ABOUTME: Sort-order bookkeeping shared by sub-projects and activities
// ABOUTME: Appends at max+1 and reorders by swapping with the adjacent neighbor

use sqlx::SqliteConnection;
use tracing::debug;

use planboard_core::MoveDirection;

use crate::error::PlannerResult;

/// Tables whose rows carry a per-project `sortOrder`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OrderedTable {
    SubProjects,
    Activities,
}

impl OrderedTable {
    fn name(self) -> &'static str {
        match self {
            OrderedTable::SubProjects => "subprojects",
            OrderedTable::Activities => "activities",
        }
    }
}

/// The sortOrder a new row appended to the project should take.
pub(crate) async fn next_sort_order(
    conn: &mut SqliteConnection,
    table: OrderedTable,
    project_id: i64,
) -> PlannerResult<i64> {
    let sql = format!(
        "SELECT COALESCE(MAX(sortOrder), 0) + 1 FROM {} WHERE projectId = ?",
        table.name()
    );
    let next: i64 = sqlx::query_scalar(&sql)
        .bind(project_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(next)
}

/// Swap `row_id`'s sortOrder with its strict neighbor in `direction`.
/// Returns false, changing nothing, when the row is already at that end.
pub(crate) async fn swap_with_neighbor(
    conn: &mut SqliteConnection,
    table: OrderedTable,
    project_id: i64,
    row_id: i64,
    current_order: i64,
    direction: MoveDirection,
) -> PlannerResult<bool> {
    let neighbor_sql = match direction {
        MoveDirection::Up => format!(
            "SELECT id, sortOrder FROM {} WHERE projectId = ? AND sortOrder < ? \
             ORDER BY sortOrder DESC, id DESC LIMIT 1",
            table.name()
        ),
        MoveDirection::Down => format!(
            "SELECT id, sortOrder FROM {} WHERE projectId = ? AND sortOrder > ? \
             ORDER BY sortOrder ASC, id ASC LIMIT 1",
            table.name()
        ),
    };

    let neighbor: Option<(i64, i64)> = sqlx::query_as(&neighbor_sql)
        .bind(project_id)
        .bind(current_order)
        .fetch_optional(&mut *conn)
        .await?;

    let Some((neighbor_id, neighbor_order)) = neighbor else {
        return Ok(false);
    };

    let update_sql = format!("UPDATE {} SET sortOrder = ? WHERE id = ?", table.name());
    sqlx::query(&update_sql)
        .bind(neighbor_order)
        .bind(row_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query(&update_sql)
        .bind(current_order)
        .bind(neighbor_id)
        .execute(&mut *conn)
        .await?;

    debug!(
        "Swapped {} {} (order {}) with {} (order {})",
        table.name(),
        row_id,
        current_order,
        neighbor_id,
        neighbor_order
    );
    Ok(true)
}
