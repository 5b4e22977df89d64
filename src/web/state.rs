use sqlx::SqlitePool;
use std::sync::Arc;

use crate::services::embedding_service::SharedEmbedder;
use crate::services::geocoding_service::GeocodingClient;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub embedder: SharedEmbedder,
    pub geocoder: Arc<GeocodingClient>,
}
