//! Submission record persistence

use crate::db::models::SubmissionRecord;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

/// True if an accepted submission recorded this fingerprint
pub async fn hash_exists(pool: &SqlitePool, hash: &str) -> Result<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM submissions WHERE hash = ?)")
            .bind(hash)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Insert a submission record
///
/// Takes a connection so callers can run it inside a transaction alongside
/// the group counter updates.
pub async fn insert_submission(conn: &mut SqliteConnection, record: &SubmissionRecord) -> Result<()> {
    let authors = serde_json::to_string(&record.authors)?;
    let group_ids = serde_json::to_string(&record.groups)?;
    let payload = serde_json::to_string(&record.payload)?;

    sqlx::query(
        r#"
        INSERT INTO submissions (id, hash, title, authors, doi, group_ids, payload, received_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id.to_string())
    .bind(&record.fingerprint)
    .bind(&record.title)
    .bind(authors)
    .bind(&record.doi)
    .bind(group_ids)
    .bind(payload)
    .bind(record.received_at.to_rfc3339())
    .execute(conn)
    .await?;

    Ok(())
}

/// Load a submission record by identifier
pub async fn load_submission(pool: &SqlitePool, id: Uuid) -> Result<Option<SubmissionRecord>> {
    let row = sqlx::query(
        r#"
        SELECT id, hash, title, authors, doi, group_ids, payload, received_at
        FROM submissions
        WHERE id = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let id_str: String = row.get("id");
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| Error::Internal(format!("Corrupt submission id {}: {}", id_str, e)))?;

    let received_str: String = row.get("received_at");
    let received_at = DateTime::parse_from_rfc3339(&received_str)
        .map_err(|e| Error::Internal(format!("Corrupt received_at {}: {}", received_str, e)))?
        .with_timezone(&Utc);

    let authors: String = row.get("authors");
    let group_ids: String = row.get("group_ids");
    let payload: String = row.get("payload");

    Ok(Some(SubmissionRecord {
        id,
        fingerprint: row.get("hash"),
        title: row.get("title"),
        authors: serde_json::from_str(&authors)?,
        doi: row.get("doi"),
        groups: serde_json::from_str(&group_ids)?,
        payload: serde_json::from_str(&payload)?,
        received_at,
    }))
}

/// Total number of committed submissions
pub async fn count_submissions(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM submissions")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_database;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(hash: Option<&str>) -> SubmissionRecord {
        SubmissionRecord {
            id: Uuid::new_v4(),
            fingerprint: hash.map(str::to_string),
            title: Some("On Computable Numbers".to_string()),
            authors: vec!["A. M. Turing".to_string()],
            doi: Some("10.1112/plms/s2-42.1.230".to_string()),
            groups: vec!["g1".to_string()],
            payload: json!({"hash": hash, "title": "On Computable Numbers"}),
            received_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_then_hash_exists() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("test.db")).await.unwrap();

        assert!(!hash_exists(&pool, "abc").await.unwrap());

        let mut conn = pool.acquire().await.unwrap();
        insert_submission(&mut conn, &record(Some("abc"))).await.unwrap();
        drop(conn);

        assert!(hash_exists(&pool, "abc").await.unwrap());
        assert!(!hash_exists(&pool, "abd").await.unwrap());
    }

    #[tokio::test]
    async fn test_load_submission_round_trip() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("test.db")).await.unwrap();

        let original = record(None);
        let mut conn = pool.acquire().await.unwrap();
        insert_submission(&mut conn, &original).await.unwrap();
        drop(conn);

        let loaded = load_submission(&pool, original.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, original.id);
        assert_eq!(loaded.fingerprint, None);
        assert_eq!(loaded.title, original.title);
        assert_eq!(loaded.authors, original.authors);
        assert_eq!(loaded.groups, original.groups);
        assert_eq!(loaded.payload, original.payload);
        assert_eq!(count_submissions(&pool).await.unwrap(), 1);

        assert!(load_submission(&pool, Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("test.db")).await.unwrap();

        let rec = record(Some("dup"));
        let mut conn = pool.acquire().await.unwrap();
        insert_submission(&mut conn, &rec).await.unwrap();
        assert!(insert_submission(&mut conn, &rec).await.is_err());
    }
}
