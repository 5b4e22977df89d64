use axum::{
    routing::{get, post},
    Router,
};
use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

use lifebridge::services::embedding_service::RemoteEmbedder;
use lifebridge::services::geocoding_service::GeocodingClient;
use lifebridge::web::routes::{hobbies, matches};
use lifebridge::web::state::AppState;

#[tokio::main]
async fn main() {
    // Laad .env bestand
    dotenv().ok();

    // 1. Start logging
    tracing_subscriber::fmt::init();

    // 2. Verbind met de Database
    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL moet in .env staan");
    println!("Verbinden met database: {}", db_url);

    let pool = SqlitePoolOptions::new()
        .connect(&db_url)
        .await
        .expect("Kan niet verbinden met DB");

    // 3. Gedeelde services voor de match pipeline
    let state = AppState {
        pool,
        embedder: Arc::new(RemoteEmbedder::from_env()),
        geocoder: Arc::new(GeocodingClient::from_env()),
    };

    // 4. Bouw de hele applicatie
    let app = Router::new()
        .route("/api/hobby", get(hobbies::list_hobbies_handler))
        .route("/api/match/:user_id", get(matches::match_handler))
        .route(
            "/api/match/:user_id/refresh",
            post(matches::match_refresh_handler),
        )
        .layer(CatchPanicLayer::new())
        .with_state(state);

    // 5. Start de server (met fallback poort)
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Kan host/port niet parsen");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!(
                "⚠️  Kon niet binden op {}: {}. Probeer fallback {}:{}",
                addr,
                e,
                host,
                port + 1
            );
            let fallback: SocketAddr = format!("{}:{}", host, port + 1)
                .parse()
                .expect("Kan fallback niet parsen");
            tokio::net::TcpListener::bind(fallback)
                .await
                .expect("Kan niet binden op fallback poort")
        }
    };

    let bound_addr = listener.local_addr().unwrap();
    println!("🚀 Server draait op http://{}", bound_addr);

    axum::serve(listener, app).await.unwrap();
}
