use sqlx::{sqlite::SqliteArguments, Arguments, SqlitePool};

use crate::models::{MatchCandidateRow, UsersRow};

pub const SQL_LOAD_MATCH_PROFILE: &str = r#"
SELECT
    id_user,
    name,
    surname,
    email,
    role,
    city,
    is_deleted
FROM users
WHERE id_user = ?1
  AND (is_deleted = 0 OR is_deleted IS NULL)
LIMIT 1
"#;

pub async fn load_match_profile(pool: &SqlitePool, user_id: i64) -> sqlx::Result<Option<UsersRow>> {
    sqlx::query_as::<_, UsersRow>(SQL_LOAD_MATCH_PROFILE)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub const SQL_MATCH_CANDIDATES_BASE: &str = r#"
SELECT
    u.id_user, u.name, u.surname, u.email, u.role, u.city,
    e.vector
FROM users u
INNER JOIN user_embeddings e ON e.id_user = u.id_user
WHERE (u.is_deleted = 0 OR u.is_deleted IS NULL)
"#;

// Candidates always carry a precomputed embedding (the INNER JOIN); users
// without one are invisible to matching until the next refresh/backfill.
pub async fn load_match_candidates(
    pool: &SqlitePool,
    user_id: i64,
    same_city: Option<&str>,
    target_role: Option<&str>,
) -> sqlx::Result<Vec<MatchCandidateRow>> {
    let mut sql = String::from(SQL_MATCH_CANDIDATES_BASE);
    let mut args = SqliteArguments::default();

    sql.push_str(" AND u.id_user != ?");
    args.add(user_id);

    match same_city {
        Some(city) => {
            sql.push_str(" AND u.city = ?");
            args.add(city);
        }
        None => {
            sql.push_str(" AND u.city IS NOT NULL AND TRIM(u.city) != ''");
        }
    }

    if let Some(role) = target_role {
        sql.push_str(" AND u.role = ?");
        args.add(role);
    }

    sql.push_str(" ORDER BY u.id_user ASC LIMIT 500");

    sqlx::query_as_with::<_, MatchCandidateRow, _>(&sql, args)
        .fetch_all(pool)
        .await
}
