// One row per user; the vector column holds a JSON array of floats.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserEmbeddingRow {
    pub vector: String,
    pub model: String,
    pub updated_at: Option<String>,
}
