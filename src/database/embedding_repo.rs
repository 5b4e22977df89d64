use sqlx::SqlitePool;

use crate::models::UserEmbeddingRow;

const SQL_LOAD_USER_EMBEDDING: &str = r#"
SELECT
  vector,
  model,
  updated_at
FROM user_embeddings
WHERE id_user = ?1
"#;

pub async fn load_user_embedding(
    pool: &SqlitePool,
    user_id: i64,
) -> sqlx::Result<Option<UserEmbeddingRow>> {
    sqlx::query_as::<_, UserEmbeddingRow>(SQL_LOAD_USER_EMBEDDING)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

const SQL_UPSERT_USER_EMBEDDING: &str = r#"
INSERT INTO user_embeddings (id_user, vector, model, updated_at)
VALUES (?1, ?2, ?3, datetime('now'))
ON CONFLICT(id_user) DO UPDATE SET
  vector = excluded.vector,
  model = excluded.model,
  updated_at = excluded.updated_at
"#;

pub async fn upsert_user_embedding(
    pool: &SqlitePool,
    user_id: i64,
    vector_json: &str,
    model: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPSERT_USER_EMBEDDING)
        .bind(user_id)
        .bind(vector_json)
        .bind(model)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_DELETE_USER_EMBEDDING: &str = r#"
DELETE FROM user_embeddings
WHERE id_user = ?1
"#;

pub async fn delete_user_embedding(pool: &SqlitePool, user_id: i64) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_USER_EMBEDDING)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_BACKFILL_CANDIDATES: &str = r#"
SELECT u.id_user
FROM users u
WHERE (u.is_deleted = 0 OR u.is_deleted IS NULL)
  AND EXISTS (
    SELECT 1 FROM user_hobbies uh WHERE uh.id_user = u.id_user
  )
  AND NOT EXISTS (
    SELECT 1 FROM user_embeddings e
    WHERE e.id_user = u.id_user
      AND e.model = ?1
  )
ORDER BY u.id_user ASC
LIMIT ?2
"#;

// Users with hobbies whose embedding is missing or was produced by another model.
pub async fn list_backfill_candidates(
    pool: &SqlitePool,
    model: &str,
    limit: i64,
) -> sqlx::Result<Vec<i64>> {
    sqlx::query_scalar::<_, i64>(SQL_LIST_BACKFILL_CANDIDATES)
        .bind(model)
        .bind(limit)
        .fetch_all(pool)
        .await
}
