//! Read-side queries over the catalog: listing with the latest snapshot per
//! asset, and case-insensitive search on name or symbol.

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use sea_orm::sea_query::{Expr, extension::postgres::PgExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, Order, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::entities::{crypto_prices, cryptocurrencies, prelude::*};
use crate::models::crypto::{AssetWithLatestPrice, LatestPrice};

const SEARCH_PAGE_SIZE: u64 = 20;

#[derive(Clone)]
pub struct CatalogService {
    db: DatabaseConnection,
}

impl CatalogService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All catalog entries with their latest snapshot, ordered by latest
    /// rank ascending with unranked assets last
    pub async fn list_with_latest_price(&self) -> Result<Vec<AssetWithLatestPrice>, DbErr> {
        let assets = Cryptocurrencies::find()
            .order_by(cryptocurrencies::Column::Name, Order::Asc)
            .all(&self.db)
            .await?;

        let mut results = Vec::with_capacity(assets.len());
        for asset in assets {
            let latest = self.latest_price_for(asset.id).await?;
            results.push(to_asset_dto(asset, latest));
        }

        sort_by_latest_rank(&mut results);
        Ok(results)
    }

    /// Case-insensitive substring match on name or symbol, bounded to one
    /// page of results
    pub async fn search(&self, q: &str) -> Result<Vec<AssetWithLatestPrice>, DbErr> {
        let pattern = format!("%{}%", q.trim());

        let assets = Cryptocurrencies::find()
            .filter(
                Condition::any()
                    .add(Expr::col(cryptocurrencies::Column::Name).ilike(pattern.as_str()))
                    .add(Expr::col(cryptocurrencies::Column::Symbol).ilike(pattern.as_str())),
            )
            .order_by(cryptocurrencies::Column::Name, Order::Asc)
            .limit(SEARCH_PAGE_SIZE)
            .all(&self.db)
            .await?;

        let mut results = Vec::with_capacity(assets.len());
        for asset in assets {
            let latest = self.latest_price_for(asset.id).await?;
            results.push(to_asset_dto(asset, latest));
        }

        sort_by_latest_rank(&mut results);
        Ok(results)
    }

    async fn latest_price_for(&self, crypto_id: Uuid) -> Result<Option<crypto_prices::Model>, DbErr> {
        CryptoPrices::find()
            .filter(crypto_prices::Column::CryptoId.eq(crypto_id))
            .order_by(crypto_prices::Column::RecordedAt, Order::Desc)
            .one(&self.db)
            .await
    }
}

fn to_asset_dto(
    asset: cryptocurrencies::Model,
    latest: Option<crypto_prices::Model>,
) -> AssetWithLatestPrice {
    let latest_price = latest.map(|price| LatestPrice {
        price_usd: price.price_usd.to_f64().unwrap_or(0.0),
        market_cap: price.market_cap.to_f64().unwrap_or(0.0),
        volume_24h: price.volume_24h.to_f64().unwrap_or(0.0),
        percent_change_1h: price.percent_change_1h.and_then(|v| v.to_f64()),
        percent_change_24h: price.percent_change_24h.and_then(|v| v.to_f64()),
        percent_change_7d: price.percent_change_7d.and_then(|v| v.to_f64()),
        percent_change_30d: price.percent_change_30d.and_then(|v| v.to_f64()),
        rank: price.rank,
        recorded_at: price.recorded_at.with_timezone(&Utc),
    });

    AssetWithLatestPrice {
        id: asset.id,
        cmc_id: asset.cmc_id,
        name: asset.name,
        symbol: asset.symbol,
        slug: asset.slug,
        logo_url: asset.logo_url,
        max_supply: asset.max_supply.and_then(|v| v.to_f64()),
        circulating_supply: asset.circulating_supply.and_then(|v| v.to_f64()),
        total_supply: asset.total_supply.and_then(|v| v.to_f64()),
        created_at: asset.created_at.with_timezone(&Utc),
        updated_at: asset.updated_at.with_timezone(&Utc),
        latest_price,
    }
}

// Unranked assets sort last; ties break on name for a stable order
fn sort_by_latest_rank(assets: &mut [AssetWithLatestPrice]) {
    assets.sort_by(|a, b| {
        let rank_a = a.latest_price.as_ref().map(|p| p.rank).unwrap_or(i32::MAX);
        let rank_b = b.latest_price.as_ref().map(|p| p.rank).unwrap_or(i32::MAX);
        rank_a.cmp(&rank_b).then_with(|| a.name.cmp(&b.name))
    });
}
