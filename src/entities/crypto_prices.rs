//! SeaORM Entity for crypto price snapshots
//!
//! Append-only time series. Rows are never updated or deleted by the
//! ingestion path; the latest row per crypto_id is the current price.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "crypto_prices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning cryptocurrencies.id
    pub crypto_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))")]
    pub price_usd: Decimal,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))")]
    pub market_cap: Decimal,
    #[sea_orm(column_name = "volume_24h", column_type = "Decimal(Some((30, 10)))")]
    pub volume_24h: Decimal,
    #[sea_orm(column_name = "percent_change_1h", column_type = "Decimal(Some((18, 8)))", nullable)]
    pub percent_change_1h: Option<Decimal>,
    #[sea_orm(column_name = "percent_change_24h", column_type = "Decimal(Some((18, 8)))", nullable)]
    pub percent_change_24h: Option<Decimal>,
    #[sea_orm(column_name = "percent_change_7d", column_type = "Decimal(Some((18, 8)))", nullable)]
    pub percent_change_7d: Option<Decimal>,
    #[sea_orm(column_name = "percent_change_30d", column_type = "Decimal(Some((18, 8)))", nullable)]
    pub percent_change_30d: Option<Decimal>,
    /// 1-based position in the listing that produced this snapshot
    pub rank: i32,
    /// Timestamp of the price snapshot
    pub recorded_at: DateTimeWithTimeZone,
    pub created_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
