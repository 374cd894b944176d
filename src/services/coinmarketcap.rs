use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::services::ingestion::IngestError;

/// Client for the CoinMarketCap listings API.
///
/// Pure I/O boundary: fetches one page of ranked records and maps transport
/// or status failures onto the ingestion error taxonomy. No retries here;
/// the caller decides cadence.
#[derive(Clone)]
pub struct CoinMarketCapService {
    client: Client,
    base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ListingsResponse {
    data: Vec<RawListing>,
}

/// One provider record as it arrives on the wire.
///
/// Every field is optional so a single malformed record surfaces during
/// normalization instead of failing the whole page deserialize.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawListing {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub slug: Option<String>,
    /// Provider-reported rank; carried for diagnostics but never stored.
    /// Stored rank is the fetch position assigned during reconciliation.
    pub cmc_rank: Option<i64>,
    pub max_supply: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub total_supply: Option<f64>,
    pub quote: Option<RawQuote>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawQuote {
    #[serde(rename = "USD")]
    pub usd: Option<RawUsdQuote>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawUsdQuote {
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume_24h: Option<f64>,
    pub percent_change_1h: Option<f64>,
    pub percent_change_24h: Option<f64>,
    pub percent_change_7d: Option<f64>,
    pub percent_change_30d: Option<f64>,
}

impl CoinMarketCapService {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Fetch the top `limit` listings ordered by descending market cap.
    ///
    /// The credential travels per call because both the manual sync endpoint
    /// and the scheduled job supply their own key.
    pub async fn fetch_ranked_listing(
        &self,
        limit: u32,
        api_key: &str,
    ) -> Result<Vec<RawListing>, IngestError> {
        tracing::info!("Fetching top {} listings from CoinMarketCap", limit);

        let url = format!("{}/v1/cryptocurrency/listings/latest", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .header("X-CMC_PRO_API_KEY", api_key)
            .query(&[("limit", limit.to_string().as_str()), ("convert", "USD")])
            .send()
            .await
            .map_err(|e| IngestError::UpstreamUnavailable {
                status: None,
                body: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(IngestError::InvalidCredential);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(IngestError::UpstreamUnavailable {
                status: Some(status.as_u16()),
                body: error_text,
            });
        }

        let payload: ListingsResponse =
            response
                .json()
                .await
                .map_err(|e| IngestError::UpstreamUnavailable {
                    status: Some(status.as_u16()),
                    body: format!("invalid response body: {}", e),
                })?;

        tracing::info!(
            "Fetched {} listings from CoinMarketCap",
            payload.data.len()
        );

        Ok(payload.data)
    }
}
