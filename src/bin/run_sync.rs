use dotenvy::dotenv;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::env;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cryptotracker_backend::services::coinmarketcap::CoinMarketCapService;
use cryptotracker_backend::services::ingestion::{IngestionService, RunSummary};
use migration::Migrator;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenv().ok();

    // Connect to database
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = Database::connect(&database_url).await?;

    Migrator::up(&db, None).await?;

    let api_key = env::var("CMC_API_KEY").expect("CMC_API_KEY must be set");
    let base_url = env::var("CMC_BASE_URL")
        .unwrap_or_else(|_| "https://pro-api.coinmarketcap.com".to_string());
    let limit: u32 = env::var("SYNC_LIMIT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(100);

    let provider = CoinMarketCapService::new(base_url);
    let ingestion = IngestionService::new(db, provider);

    tracing::info!("Starting one-off price sync for top {} assets...", limit);

    match ingestion.run(limit, &api_key).await {
        Ok(summary) => {
            tracing::info!(
                records_processed = summary.records_processed,
                inserted = summary.inserted,
                updated = summary.updated,
                total_errors = summary.total_errors,
                "Sync complete"
            );
            for error in &summary.errors {
                tracing::warn!("Sync error: {}", error);
            }
            Ok(())
        }
        Err(e) => {
            let summary = RunSummary::fatal(&e);
            tracing::error!(
                records_processed = summary.records_processed,
                total_errors = summary.total_errors,
                "Sync aborted: {}",
                e
            );
            std::process::exit(1);
        }
    }
}
