use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generic error payload returned by all handlers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Query parameters for POST /api/sync
#[derive(Debug, Clone, Deserialize)]
pub struct SyncQuery {
    pub limit: Option<u32>,   // Default: 100, Max: 5000 (provider page cap)
    pub api_key: Option<String>,
}

/// Query parameters for GET /api/cryptocurrencies/search
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

/// Latest price snapshot attached to a catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestPrice {
    pub price_usd: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    pub percent_change_1h: Option<f64>,
    pub percent_change_24h: Option<f64>,
    pub percent_change_7d: Option<f64>,
    pub percent_change_30d: Option<f64>,
    pub rank: i32,
    pub recorded_at: DateTime<Utc>,
}

/// Catalog entry with its most recent snapshot, if any exists yet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetWithLatestPrice {
    pub id: uuid::Uuid,
    pub cmc_id: i64,
    pub name: String,
    pub symbol: String,
    pub slug: String,
    pub logo_url: String,
    pub max_supply: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub total_supply: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub latest_price: Option<LatestPrice>,
}

impl SyncQuery {
    /// Validates query parameters
    pub fn validate(&self) -> Result<(), String> {
        // api_key must be present and non-empty
        match &self.api_key {
            None => return Err("api_key is required".to_string()),
            Some(key) if key.trim().is_empty() => {
                return Err("api_key is required".to_string());
            }
            Some(_) => {}
        }

        // Validate limit is within the provider page range (1-5000)
        if let Some(limit) = self.limit {
            if limit < 1 || limit > 5000 {
                return Err(format!(
                    "limit must be between 1 and 5000, got: {}",
                    limit
                ));
            }
        }

        Ok(())
    }

    /// Get the limit value with default of 100
    pub fn get_limit(&self) -> u32 {
        self.limit.unwrap_or(100)
    }
}

impl SearchQuery {
    /// Validates query parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.q.trim().is_empty() {
            return Err("q cannot be empty".to_string());
        }

        Ok(())
    }
}
