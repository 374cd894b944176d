use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    models::crypto::{ErrorResponse, SyncQuery},
    services::ingestion::{IngestError, RunSummary},
};

/// Handler for POST /api/sync
/// Triggers one ingestion run against the provider and returns its summary.
/// A completed run is 200 even when individual records failed; only
/// fetch-level failures map to an error status.
pub async fn trigger_sync(
    State(state): State<AppState>,
    Query(query): Query<SyncQuery>,
) -> Result<Json<RunSummary>, (StatusCode, Json<ErrorResponse>)> {
    // Validate query parameters
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let limit = query.get_limit();
    let api_key = query.api_key.as_deref().unwrap_or_default();

    tracing::info!("Manual sync triggered for top {} listings", limit);

    match state.ingestion.run(limit, api_key).await {
        Ok(summary) => Ok(Json(summary)),
        Err(e) => {
            tracing::error!("Sync failed: {}", e);
            let status = match e {
                IngestError::InvalidCredential => StatusCode::UNAUTHORIZED,
                _ => StatusCode::BAD_GATEWAY,
            };
            Err((status, Json(ErrorResponse {
                error: e.to_string(),
            })))
        }
    }
}
