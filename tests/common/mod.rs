use axum::{Json, Router, http::StatusCode, routing::get};
use chrono::Utc;
use rust_decimal_macros::dec;
use tokio::net::TcpListener;
use uuid::Uuid;

use cryptotracker_backend::entities::{crypto_prices, cryptocurrencies};
use cryptotracker_backend::services::coinmarketcap::{RawListing, RawQuote, RawUsdQuote};

/// Serve one canned listings response on an ephemeral local port and return
/// the base URL to point the provider client at
pub async fn spawn_provider_stub(status: StatusCode, body: serde_json::Value) -> String {
    let app = Router::new().route(
        "/v1/cryptocurrency/listings/latest",
        get(move || async move { (status, Json(body)) }),
    );

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub listener");
    let addr = listener.local_addr().expect("Failed to read stub address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Stub server failed");
    });

    format!("http://{}", addr)
}

/// A complete, well-formed provider record
pub fn listing(cmc_id: i64, name: &str, symbol: &str, price: f64) -> RawListing {
    RawListing {
        id: Some(cmc_id),
        name: Some(name.to_string()),
        symbol: Some(symbol.to_string()),
        slug: Some(name.to_lowercase()),
        cmc_rank: Some(cmc_id),
        max_supply: None,
        circulating_supply: Some(1_000_000.0),
        total_supply: Some(1_000_000.0),
        quote: Some(RawQuote {
            usd: Some(RawUsdQuote {
                price: Some(price),
                market_cap: Some(price * 1_000_000.0),
                volume_24h: Some(250_000.0),
                percent_change_1h: Some(0.1),
                percent_change_24h: Some(-1.2),
                percent_change_7d: Some(3.4),
                percent_change_30d: None,
            }),
        }),
    }
}

/// Wire shape of a successful listings response
pub fn listings_body(listings: &[RawListing]) -> serde_json::Value {
    serde_json::json!({ "data": listings })
}

/// Stored catalog row for mock query results
pub fn asset_model(cmc_id: i64, name: &str, symbol: &str) -> cryptocurrencies::Model {
    let now = Utc::now().fixed_offset();
    cryptocurrencies::Model {
        id: Uuid::new_v4(),
        cmc_id,
        name: name.to_string(),
        symbol: symbol.to_string(),
        slug: name.to_lowercase(),
        logo_url: format!(
            "https://s2.coinmarketcap.com/static/img/coins/64x64/{}.png",
            cmc_id
        ),
        max_supply: None,
        circulating_supply: Some(dec!(1000000)),
        total_supply: Some(dec!(1000000)),
        created_at: now,
        updated_at: now,
    }
}

/// Stored snapshot row for mock query results
pub fn price_model(crypto_id: Uuid, rank: i32) -> crypto_prices::Model {
    let now = Utc::now().fixed_offset();
    crypto_prices::Model {
        id: rank as i64,
        crypto_id,
        price_usd: dec!(95000.5),
        market_cap: dec!(1870000000),
        volume_24h: dec!(45000000),
        percent_change_1h: Some(dec!(0.2)),
        percent_change_24h: Some(dec!(-1.3)),
        percent_change_7d: None,
        percent_change_30d: None,
        rank,
        recorded_at: now,
        created_at: Some(now),
    }
}
