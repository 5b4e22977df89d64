// Candidate row for the match ranker (users joined with their stored embedding).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MatchCandidateRow {
    pub id_user: i64,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub city: Option<String>,
    pub vector: Option<String>,
}
