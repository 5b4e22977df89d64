use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use std::env;
use std::sync::Arc;

use lifebridge::services::embedding_service::{self, RemoteEmbedder, SharedEmbedder};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL moet in .env staan");
    let pool = SqlitePoolOptions::new()
        .connect(&db_url)
        .await
        .expect("Kan niet verbinden met DB");

    let embedder: SharedEmbedder = Arc::new(RemoteEmbedder::from_env());

    let limit: i64 = env::var("BACKFILL_LIMIT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(500);

    match embedding_service::backfill_user_embeddings(&pool, &embedder, limit).await {
        Ok(report) => {
            println!(
                "embedding backfill: candidates={}, updated={}, skipped={}, failed={}",
                report.candidates, report.updated, report.skipped, report.failed
            );
        }
        Err(e) => {
            eprintln!("embedding backfill failed: {}", e);
            std::process::exit(1);
        }
    }
}
