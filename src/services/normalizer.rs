//! Pure mapping from raw provider records to canonical catalog and snapshot
//! fields.
//!
//! Fails closed: a record missing any required identity or quote field is
//! rejected as malformed rather than stored with gaps. Numeric conversion
//! happens here so a non-finite value is a normalization failure, not a
//! storage failure.

use rust_decimal::Decimal;

use crate::services::coinmarketcap::RawListing;
use crate::services::ingestion::IngestError;

/// Descriptive fields for the catalog upsert
#[derive(Debug, Clone, PartialEq)]
pub struct AssetFields {
    pub cmc_id: i64,
    pub name: String,
    pub symbol: String,
    pub slug: String,
    pub logo_url: String,
    pub max_supply: Option<Decimal>,
    pub circulating_supply: Option<Decimal>,
    pub total_supply: Option<Decimal>,
}

/// Market fields for one price snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct PriceFields {
    pub price_usd: Decimal,
    pub market_cap: Decimal,
    pub volume_24h: Decimal,
    pub percent_change_1h: Option<Decimal>,
    pub percent_change_24h: Option<Decimal>,
    pub percent_change_7d: Option<Decimal>,
    pub percent_change_30d: Option<Decimal>,
}

const LOGO_URL_BASE: &str = "https://s2.coinmarketcap.com/static/img/coins/64x64";

/// Map one raw provider record into canonical fields.
///
/// Required: provider id, name, symbol, and the USD quote's price, market cap
/// and 24h volume. The slug falls back to a derivation of the name, and the
/// logo URL is keyed on the provider id so it stays stable across runs.
pub fn normalize(raw: &RawListing) -> Result<(AssetFields, PriceFields), IngestError> {
    let cmc_id = raw.id.ok_or_else(|| malformed("missing provider id"))?;

    let name = raw
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| malformed("missing name"))?;

    let symbol = raw
        .symbol
        .clone()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| malformed("missing symbol"))?;

    let usd = raw
        .quote
        .as_ref()
        .and_then(|q| q.usd.as_ref())
        .ok_or_else(|| malformed("missing USD quote"))?;

    let price_usd = required_decimal(usd.price, "price")?;
    let market_cap = required_decimal(usd.market_cap, "market_cap")?;
    let volume_24h = required_decimal(usd.volume_24h, "volume_24h")?;

    let slug = match raw.slug.clone().filter(|s| !s.trim().is_empty()) {
        Some(slug) => slug,
        None => slugify(&name),
    };

    let asset = AssetFields {
        cmc_id,
        logo_url: format!("{}/{}.png", LOGO_URL_BASE, cmc_id),
        name,
        symbol,
        slug,
        max_supply: optional_decimal(raw.max_supply),
        circulating_supply: optional_decimal(raw.circulating_supply),
        total_supply: optional_decimal(raw.total_supply),
    };

    let price = PriceFields {
        price_usd,
        market_cap,
        volume_24h,
        percent_change_1h: optional_decimal(usd.percent_change_1h),
        percent_change_24h: optional_decimal(usd.percent_change_24h),
        percent_change_7d: optional_decimal(usd.percent_change_7d),
        percent_change_30d: optional_decimal(usd.percent_change_30d),
    };

    Ok((asset, price))
}

fn malformed(detail: &str) -> IngestError {
    IngestError::MalformedRecord(detail.to_string())
}

fn required_decimal(value: Option<f64>, field: &str) -> Result<Decimal, IngestError> {
    let value = value.ok_or_else(|| malformed(&format!("missing {}", field)))?;
    Decimal::from_f64_retain(value).ok_or_else(|| malformed(&format!("invalid {}", field)))
}

// Optional fields tolerate a non-finite value; absent is a defined state
fn optional_decimal(value: Option<f64>) -> Option<Decimal> {
    value.and_then(Decimal::from_f64_retain)
}

/// Lowercased, hyphen-separated derivation of the name
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_hyphen = true;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
