mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    routing::{get, post},
};
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase};
use serde_json::Value;
use tower::ServiceExt;

use cryptotracker_backend::AppState;
use cryptotracker_backend::entities::{crypto_prices, cryptocurrencies};
use cryptotracker_backend::handlers;
use cryptotracker_backend::services::catalog::CatalogService;
use cryptotracker_backend::services::coinmarketcap::CoinMarketCapService;
use cryptotracker_backend::services::ingestion::IngestionService;

use crate::common::{asset_model, listing, listings_body, price_model, spawn_provider_stub};

// Helper to assemble state over a mock connection; the provider URL only
// matters for tests that go through the sync route
fn build_test_state(db: DatabaseConnection, provider_url: &str) -> AppState {
    let provider = CoinMarketCapService::new(provider_url.to_string());
    AppState {
        db: db.clone(),
        ingestion: IngestionService::new(db.clone(), provider).with_concurrency(1),
        catalog: CatalogService::new(db),
    }
}

// Helper to build the API router under test
fn build_test_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/cryptocurrencies",
            get(handlers::crypto::list_cryptocurrencies),
        )
        .route(
            "/api/cryptocurrencies/search",
            get(handlers::crypto::search_cryptocurrencies),
        )
        .route("/api/sync", post(handlers::sync::trigger_sync))
        .with_state(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// GET /api/cryptocurrencies returns every asset with its latest snapshot
#[tokio::test]
async fn test_list_cryptocurrencies_success() {
    let alpha = asset_model(1, "Alpha", "AAA");
    let beta = asset_model(2, "Beta", "BBB");

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![alpha.clone(), beta.clone()]])
        .append_query_results([vec![price_model(alpha.id, 1)], vec![]])
        .into_connection();

    let app = build_test_router(build_test_state(db, "http://127.0.0.1:1"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/cryptocurrencies")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let assets = json.as_array().unwrap();

    assert_eq!(assets.len(), 2);
    assert_eq!(assets[0]["name"], "Alpha");
    assert_eq!(assets[0]["symbol"], "AAA");
    assert_eq!(assets[0]["latest_price"]["rank"], 1);
    assert!(assets[1]["latest_price"].is_null());
}

/// Assets with a snapshot come first ordered by rank, never-synced ones last
#[tokio::test]
async fn test_list_orders_by_latest_rank() {
    let alpha = asset_model(1, "Alpha", "AAA");
    let zeta = asset_model(2, "Zeta", "ZZZ");

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![alpha.clone(), zeta.clone()]])
        .append_query_results([
            Vec::<crypto_prices::Model>::new(),
            vec![price_model(zeta.id, 1)],
        ])
        .into_connection();

    let app = build_test_router(build_test_state(db, "http://127.0.0.1:1"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/cryptocurrencies")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let assets = json.as_array().unwrap();

    assert_eq!(assets[0]["name"], "Zeta");
    assert_eq!(assets[1]["name"], "Alpha");
}

/// Database failures on the list route map to a 500 with an error payload
#[tokio::test]
async fn test_list_maps_database_error_to_500() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("connection refused".to_string())])
        .into_connection();

    let app = build_test_router(build_test_state(db, "http://127.0.0.1:1"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/cryptocurrencies")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().starts_with("Database error:"));
}

/// GET /api/cryptocurrencies/search rejects a blank q
#[tokio::test]
async fn test_search_rejects_blank_query() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = build_test_router(build_test_state(db, "http://127.0.0.1:1"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/cryptocurrencies/search?q=")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "q cannot be empty");
}

/// Missing q entirely is rejected by the extractor
#[tokio::test]
async fn test_search_requires_query_param() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = build_test_router(build_test_state(db, "http://127.0.0.1:1"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/cryptocurrencies/search")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Search returns matches with their latest snapshot attached
#[tokio::test]
async fn test_search_returns_matches() {
    let bitcoin = asset_model(1, "Bitcoin", "BTC");

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![bitcoin.clone()]])
        .append_query_results([vec![price_model(bitcoin.id, 1)]])
        .into_connection();

    let app = build_test_router(build_test_state(db, "http://127.0.0.1:1"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/cryptocurrencies/search?q=bit")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let assets = json.as_array().unwrap();

    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0]["symbol"], "BTC");
    assert_eq!(assets[0]["latest_price"]["price_usd"], 95000.5);
}

/// POST /api/sync without an api_key is rejected up front
#[tokio::test]
async fn test_sync_requires_api_key() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = build_test_router(build_test_state(db, "http://127.0.0.1:1"));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sync")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "api_key is required");
}

/// POST /api/sync validates the limit range
#[tokio::test]
async fn test_sync_rejects_out_of_range_limit() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = build_test_router(build_test_state(db, "http://127.0.0.1:1"));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sync?api_key=test-key&limit=0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "limit must be between 1 and 5000, got: 0");
}

/// A rejected credential surfaces as 401 with the provider error
#[tokio::test]
async fn test_sync_maps_invalid_credential_to_401() {
    let base_url = spawn_provider_stub(StatusCode::UNAUTHORIZED, serde_json::json!({})).await;

    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = build_test_router(build_test_state(db, &base_url));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sync?api_key=wrong-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["error"], "CoinMarketCap rejected the API credential");
}

/// A failing provider surfaces as 502
#[tokio::test]
async fn test_sync_maps_upstream_failure_to_502() {
    let base_url = spawn_provider_stub(
        StatusCode::INTERNAL_SERVER_ERROR,
        serde_json::json!({"status": {"error_message": "boom"}}),
    )
    .await;

    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = build_test_router(build_test_state(db, &base_url));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sync?api_key=test-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("boom"));
}

/// A full sync over HTTP lands records and reports the summary
#[tokio::test]
async fn test_sync_returns_run_summary() {
    let btc = listing(1, "Bitcoin", "BTC", 95000.5);
    let base_url = spawn_provider_stub(StatusCode::OK, listings_body(&[btc])).await;

    let btc_row = asset_model(1, "Bitcoin", "BTC");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<cryptocurrencies::Model>::new()])
        .append_query_results([vec![btc_row.clone()]])
        .append_query_results([vec![price_model(btc_row.id, 1)]])
        .into_connection();

    let app = build_test_router(build_test_state(db, &base_url));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sync?api_key=test-key&limit=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["records_processed"], 1);
    assert_eq!(json["inserted"], 1);
    assert_eq!(json["updated"], 0);
    assert_eq!(json["total_errors"], 0);
}
