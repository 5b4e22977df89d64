use sqlx::SqlitePool;
use std::cmp::Ordering;
use tracing::warn;

use crate::database::{embedding_repo, user_repo};
use crate::errors::MatchError;
use crate::models::{MatchCandidateRow, MatchResult};
use crate::services::embedding_service::{self, Embedder, Embedding, SharedEmbedder};
use crate::services::geocoding_service::{self, GeocodingClient};
use crate::services::hobby_text_service;

pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone)]
pub struct MatchOptions {
    pub top_n: usize,
    pub target_role: Option<String>,
    pub distance_km: Option<f64>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            target_role: None,
            distance_km: None,
        }
    }
}

pub async fn find_matches(
    pool: &SqlitePool,
    embedder: &SharedEmbedder,
    geocoder: &GeocodingClient,
    user_id: i64,
    options: &MatchOptions,
) -> Result<Vec<MatchResult>, MatchError> {
    let Some(profile) = user_repo::load_match_profile(pool, user_id).await? else {
        return Err(MatchError::UserNotFound);
    };

    let Some(query_vector) = load_or_heal_query_embedding(pool, embedder, user_id).await? else {
        // No hobbies, nothing to compare on.
        return Ok(Vec::new());
    };

    // Never recommend across cities for a user with an unknown location,
    // radius mode included. Same-city mode compares the field exactly as stored.
    let city = profile.city.as_deref().unwrap_or("");
    if city.trim().is_empty() {
        return Ok(Vec::new());
    }

    let query_coords = match options.distance_km {
        Some(_) => match geocoder.resolve_city(city).await {
            Some(coords) => Some(coords),
            None => return Ok(Vec::new()),
        },
        None => None,
    };

    let same_city = options.distance_km.is_none().then_some(city);
    let candidates =
        user_repo::load_match_candidates(pool, user_id, same_city, options.target_role.as_deref())
            .await?;

    let mut results = Vec::new();
    for candidate in candidates {
        let Some(vector) = candidate
            .vector
            .as_deref()
            .and_then(embedding_service::decode_vector)
        else {
            warn!(
                "Stored embedding for user {} is unreadable, skipping candidate",
                candidate.id_user
            );
            continue;
        };
        if vector.len() != query_vector.len() {
            warn!(
                "Embedding dimension mismatch for user {} ({} vs {}), skipping candidate",
                candidate.id_user,
                vector.len(),
                query_vector.len()
            );
            continue;
        }

        let mut distance_km = None;
        if let (Some(max_km), Some((query_lat, query_lon))) = (options.distance_km, query_coords) {
            let candidate_city = candidate.city.as_deref().unwrap_or("");
            let Some((lat, lon)) = geocoder.resolve_city(candidate_city).await else {
                continue;
            };
            let dist = geocoding_service::haversine_km(query_lat, query_lon, lat, lon);
            if dist > max_km {
                continue;
            }
            distance_km = Some(dist);
        }

        let similarity = embedding_service::cosine_similarity(&query_vector, &vector);
        results.push(shape_result(candidate, similarity, distance_km));
    }

    results.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id_user.cmp(&b.id_user))
    });
    results.truncate(options.top_n.max(1));

    Ok(results)
}

// Self-heal for the query user only: a missing or unreadable stored vector is
// regenerated from the current hobby set before ranking. Candidates never get
// this treatment; they stay invisible until their own refresh.
async fn load_or_heal_query_embedding(
    pool: &SqlitePool,
    embedder: &SharedEmbedder,
    user_id: i64,
) -> Result<Option<Embedding>, MatchError> {
    if let Some(row) = embedding_repo::load_user_embedding(pool, user_id).await? {
        if let Some(vector) = embedding_service::decode_vector(&row.vector) {
            return Ok(Some(vector));
        }
        warn!("Stored embedding for user {} is unreadable, regenerating", user_id);
    }

    let text = hobby_text_service::build_hobby_text(pool, user_id).await?;
    if text.is_empty() {
        return Ok(None);
    }

    let vector = embedder.embed(&text).await.map_err(MatchError::Embedding)?;
    embedding_repo::upsert_user_embedding(
        pool,
        user_id,
        &embedding_service::encode_vector(&vector),
        embedder.model_name(),
    )
    .await?;

    Ok(Some(vector))
}

fn shape_result(
    candidate: MatchCandidateRow,
    similarity: f64,
    distance_km: Option<f64>,
) -> MatchResult {
    MatchResult {
        id_user: candidate.id_user,
        name: candidate.name.unwrap_or_default(),
        surname: candidate.surname.unwrap_or_default(),
        email: candidate.email.unwrap_or_default(),
        role: candidate.role.unwrap_or_default(),
        similarity,
        similarity_percent: round1(similarity * 100.0),
        distance_km: distance_km.map(round1),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
