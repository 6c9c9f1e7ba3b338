//! Group persistence and submission counters

use crate::db::models::Group;
use crate::Result;
use sqlx::{SqliteConnection, SqlitePool};

/// Create a group (or reset an existing one) with an initial counter
pub async fn create_group(pool: &SqlitePool, group: &Group) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO scholar_groups (id, name, submissions)
        VALUES (?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            submissions = excluded.submissions
        "#,
    )
    .bind(&group.id)
    .bind(&group.name)
    .bind(group.submissions)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a group by identifier
pub async fn load_group(pool: &SqlitePool, id: &str) -> Result<Option<Group>> {
    let row: Option<(String, String, i64)> =
        sqlx::query_as("SELECT id, name, submissions FROM scholar_groups WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|(id, name, submissions)| Group {
        id,
        name,
        submissions,
    }))
}

/// Add one to a group's submission counter
///
/// A single UPDATE, so concurrent commits never lose an increment. Returns
/// `false` when no group has this id; the caller decides whether that matters.
pub async fn increment_submissions(conn: &mut SqliteConnection, id: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE scholar_groups SET submissions = submissions + 1 WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() > 0)
}
