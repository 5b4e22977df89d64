#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UsersRow {
    pub id_user: i64,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub city: Option<String>,
    pub is_deleted: Option<i64>,
}
