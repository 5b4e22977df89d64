use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub id_user: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub role: String,
    pub similarity: f64,
    pub similarity_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}
