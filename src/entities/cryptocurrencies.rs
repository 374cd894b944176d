//! SeaORM Entity for the cryptocurrencies catalog
//!
//! One row per tracked asset, keyed internally by UUID and externally by the
//! provider-assigned cmc_id.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cryptocurrencies")]
pub struct Model {
    /// Internal identifier, assigned once on first insert, never reused
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Provider identifier, unique across the catalog
    #[sea_orm(unique)]
    pub cmc_id: i64,
    pub name: String,
    pub symbol: String,
    pub slug: String,
    pub logo_url: String,
    /// Supply fields are absent when the provider does not know them
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub max_supply: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub circulating_supply: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub total_supply: Option<Decimal>,
    pub created_at: DateTimeWithTimeZone,
    /// Touched on every reconciliation pass, even when no field changed
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
