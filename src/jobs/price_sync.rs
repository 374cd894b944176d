use tokio::time::{Duration, interval};

use crate::services::ingestion::IngestionService;

/// Spawn the periodic price sync loop.
///
/// Each run is awaited inside the loop, so a slow run delays the next tick
/// instead of overlapping it.
pub async fn start_price_sync_job(
    ingestion: IngestionService,
    api_key: String,
    interval_secs: u64,
    limit: u32,
) {
    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(interval_secs));

        // Run immediately on startup
        tracing::info!("Running initial price sync for top {} listings", limit);
        if let Err(e) = run_once(&ingestion, &api_key, limit).await {
            tracing::error!("Failed to sync prices on startup: {}", e);
        }

        loop {
            interval.tick().await;
            tracing::info!("Starting scheduled price sync");

            if let Err(e) = run_once(&ingestion, &api_key, limit).await {
                tracing::error!("Failed to sync prices: {}", e);
            }
        }
    });
}

async fn run_once(
    ingestion: &IngestionService,
    api_key: &str,
    limit: u32,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let summary = ingestion.run(limit, api_key).await?;

    if summary.total_errors > 0 {
        tracing::warn!(
            "Price sync completed with {} errors: {} inserted, {} updated of {} records",
            summary.total_errors,
            summary.inserted,
            summary.updated,
            summary.records_processed
        );
        for error in &summary.errors {
            tracing::warn!("{}", error);
        }
    } else {
        tracing::info!(
            "Price sync complete: {} inserted, {} updated of {} records",
            summary.inserted,
            summary.updated,
            summary.records_processed
        );
    }

    Ok(())
}
