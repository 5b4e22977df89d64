use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct HobbyRow {
    pub id_hobby: i64,
    pub name: String,
    pub category: Option<String>,
}

const SQL_LIST_USER_HOBBY_NAMES: &str = r#"
SELECT h.name
FROM user_hobbies uh
INNER JOIN hobbies h ON h.id_hobby = uh.id_hobby
WHERE uh.id_user = ?1
  AND TRIM(COALESCE(h.name, '')) != ''
"#;

pub async fn list_user_hobby_names(pool: &SqlitePool, user_id: i64) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(SQL_LIST_USER_HOBBY_NAMES)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

const SQL_LIST_HOBBIES: &str = r#"
SELECT
  id_hobby,
  name,
  category
FROM hobbies
WHERE TRIM(COALESCE(name, '')) != ''
ORDER BY name ASC
"#;

pub async fn list_hobbies(pool: &SqlitePool) -> sqlx::Result<Vec<HobbyRow>> {
    sqlx::query_as::<_, HobbyRow>(SQL_LIST_HOBBIES)
        .fetch_all(pool)
        .await
}
