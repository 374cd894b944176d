use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    models::crypto::{AssetWithLatestPrice, ErrorResponse, SearchQuery},
};

/// Handler for GET /api/cryptocurrencies
/// Lists the catalog with each asset's latest price snapshot, ordered by
/// latest rank with unranked assets last
pub async fn list_cryptocurrencies(
    State(state): State<AppState>,
) -> Result<Json<Vec<AssetWithLatestPrice>>, (StatusCode, Json<ErrorResponse>)> {
    let assets = state
        .catalog
        .list_with_latest_price()
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Database error: {}", e),
                }),
            )
        })?;

    Ok(Json(assets))
}

/// Handler for GET /api/cryptocurrencies/search
/// Case-insensitive substring match on name or symbol, bounded to 20 results
pub async fn search_cryptocurrencies(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<AssetWithLatestPrice>>, (StatusCode, Json<ErrorResponse>)> {
    // Validate query parameters
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    tracing::info!("Searching cryptocurrencies for '{}'", query.q);

    let assets = state.catalog.search(&query.q).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Database error: {}", e),
            }),
        )
    })?;

    Ok(Json(assets))
}
