use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::database::embedding_repo;
use crate::errors::MatchError;
use crate::services::hobby_text_service;

pub type Embedding = Vec<f32>;

/// Text embedding backend. The production implementation talks to a
/// sentence-embedding inference sidecar; tests substitute a deterministic stub.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Model identifier, stored next to each vector.
    fn model_name(&self) -> &str;

    fn dimension(&self) -> usize;
}

pub type SharedEmbedder = Arc<dyn Embedder>;

pub struct RemoteEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimension: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

fn upstream_timeout() -> Duration {
    let secs: u64 = std::env::var("UPSTREAM_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);
    Duration::from_secs(secs)
}

impl RemoteEmbedder {
    pub fn new(base_url: &str, model: &str, dimension: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(upstream_timeout())
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimension,
        }
    }

    pub fn from_env() -> Self {
        let base_url = std::env::var("EMBEDDING_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8090".to_string());
        let model = std::env::var("EMBEDDING_MODEL")
            .unwrap_or_else(|_| "paraphrase-multilingual-MiniLM-L12-v2".to_string());
        let dimension: usize = std::env::var("EMBEDDING_DIM")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(384);
        Self::new(&base_url, &model, dimension)
    }
}

#[async_trait]
impl Embedder for RemoteEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        if text.trim().is_empty() {
            return Err(anyhow!("refusing to embed empty text"));
        }

        let url = format!("{}/embed", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "model": self.model,
                "input": text,
            }))
            .send()
            .await
            .with_context(|| format!("embedding upstream unreachable at {}", url))?;

        if !resp.status().is_success() {
            return Err(anyhow!("embedding upstream returned {}", resp.status()));
        }

        let parsed: EmbeddingResponse = resp
            .json()
            .await
            .context("parsing embedding upstream response")?;

        if parsed.embedding.is_empty() {
            return Err(anyhow!("embedding upstream returned an empty vector"));
        }

        Ok(parsed.embedding)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

pub fn encode_vector(vector: &[f32]) -> String {
    serde_json::to_string(vector).unwrap_or_else(|_| "[]".to_string())
}

pub fn decode_vector(raw: &str) -> Option<Embedding> {
    serde_json::from_str::<Embedding>(raw).ok()
}

#[derive(Debug)]
pub enum RefreshOutcome {
    Refreshed { model: String, dimension: usize },
    NoHobbies,
}

// Called after a hobby-set mutation (and lazily by the match ranker): the
// stored vector must stay a pure function of {current hobby set, model}.
pub async fn refresh_user_embedding(
    pool: &SqlitePool,
    embedder: &SharedEmbedder,
    user_id: i64,
) -> Result<RefreshOutcome, MatchError> {
    let text = hobby_text_service::build_hobby_text(pool, user_id).await?;
    if text.is_empty() {
        // A user who cleared their hobbies must not keep matching on stale ones.
        embedding_repo::delete_user_embedding(pool, user_id).await?;
        return Ok(RefreshOutcome::NoHobbies);
    }

    let vector = embedder.embed(&text).await.map_err(MatchError::Embedding)?;
    embedding_repo::upsert_user_embedding(pool, user_id, &encode_vector(&vector), embedder.model_name())
        .await?;

    Ok(RefreshOutcome::Refreshed {
        model: embedder.model_name().to_string(),
        dimension: vector.len(),
    })
}

#[derive(Debug, Default)]
pub struct EmbeddingBackfillReport {
    pub candidates: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub async fn backfill_user_embeddings(
    pool: &SqlitePool,
    embedder: &SharedEmbedder,
    limit: i64,
) -> Result<EmbeddingBackfillReport, MatchError> {
    let ids = embedding_repo::list_backfill_candidates(pool, embedder.model_name(), limit).await?;
    let mut report = EmbeddingBackfillReport {
        candidates: ids.len(),
        ..Default::default()
    };

    for user_id in ids {
        let text = match hobby_text_service::build_hobby_text(pool, user_id).await {
            Ok(t) => t,
            Err(MatchError::UserNotFound) => {
                report.skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };
        if text.is_empty() {
            report.skipped += 1;
            continue;
        }

        match embedder.embed(&text).await {
            Ok(vector) => {
                embedding_repo::upsert_user_embedding(
                    pool,
                    user_id,
                    &encode_vector(&vector),
                    embedder.model_name(),
                )
                .await?;
                report.updated += 1;
            }
            Err(e) => {
                warn!("🧠 Embedding backfill failed for user {}: {}", user_id, e);
                report.failed += 1;
            }
        }
    }

    info!(
        "🧠 Embedding backfill done: candidates={}, updated={}, skipped={}, failed={}",
        report.candidates, report.updated, report.skipped, report.failed
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_vector_with_itself_is_one() {
        let v = vec![0.3f32, -1.2, 4.5, 0.01];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        let a = vec![1.0f32, 0.0];
        let b = vec![0.0f32, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-9);
    }

    #[test]
    fn cosine_zero_vector_does_not_divide_by_zero() {
        let zero = vec![0.0f32; 4];
        let v = vec![1.0f32, 2.0, 3.0, 4.0];
        assert_eq!(cosine_similarity(&zero, &v), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn decode_rejects_malformed_vector() {
        assert!(decode_vector("not json").is_none());
        assert!(decode_vector("{\"a\":1}").is_none());
        assert_eq!(decode_vector("[1.0,2.0]"), Some(vec![1.0f32, 2.0]));
    }

    #[tokio::test]
    async fn remote_embedder_rejects_empty_input() {
        let embedder = RemoteEmbedder::new("http://127.0.0.1:9", "test-model", 4);
        assert!(embedder.embed("").await.is_err());
        assert!(embedder.embed("   ").await.is_err());
    }
}
