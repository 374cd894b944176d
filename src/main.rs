use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::env;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cryptotracker_backend::AppState;
use cryptotracker_backend::handlers::{crypto, sync};
use cryptotracker_backend::jobs::price_sync::start_price_sync_job;
use cryptotracker_backend::services::catalog::CatalogService;
use cryptotracker_backend::services::coinmarketcap::CoinMarketCapService;
use cryptotracker_backend::services::ingestion::IngestionService;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cryptotracker_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Connect to database
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let base_url = env::var("CMC_BASE_URL")
        .unwrap_or_else(|_| "https://pro-api.coinmarketcap.com".to_string());
    let provider = CoinMarketCapService::new(base_url);
    let ingestion = IngestionService::new(db.clone(), provider);
    let catalog = CatalogService::new(db.clone());

    // The scheduled sync only starts when a provider credential is configured
    match env::var("CMC_API_KEY") {
        Ok(api_key) if !api_key.trim().is_empty() => {
            let interval_secs = env::var("SYNC_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300);
            let limit = env::var("SYNC_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100);
            start_price_sync_job(ingestion.clone(), api_key, interval_secs, limit).await;
        }
        _ => {
            tracing::warn!("CMC_API_KEY not set, scheduled price sync disabled");
        }
    }

    let state = AppState {
        db,
        ingestion,
        catalog,
    };

    // Build router
    let app = Router::new()
        .route("/", get(hello))
        .route("/api/cryptocurrencies", get(crypto::list_cryptocurrencies))
        .route(
            "/api/cryptocurrencies/search",
            get(crypto::search_cryptocurrencies),
        )
        .route("/api/sync", post(sync::trigger_sync))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind server address");

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}

async fn hello() -> &'static str {
    "Hello from CryptoTracker Backend!"
}
