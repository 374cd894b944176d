// src/lib.rs

use sea_orm::DatabaseConnection;
use services::{catalog::CatalogService, ingestion::IngestionService};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub ingestion: IngestionService,
    pub catalog: CatalogService,
}

pub mod entities {
    pub mod prelude;
    pub mod crypto_prices;
    pub mod cryptocurrencies;
}

pub mod services {
    pub mod catalog;
    pub mod coinmarketcap;
    pub mod ingestion;
    pub mod normalizer;
}

pub mod models;
pub mod handlers;
pub mod jobs;
