//! Ingestion pipeline: fetch a ranked listing from the provider, reconcile
//! each record against the catalog, and append one price snapshot per asset.
//!
//! One run executes to completion before its summary is returned. A fetch
//! failure aborts the whole run; a failure while reconciling one record is
//! recorded in the summary and never stops the other records.

use chrono::Utc;
use futures_util::{StreamExt, stream};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{crypto_prices, cryptocurrencies, prelude::*};
use crate::services::coinmarketcap::{CoinMarketCapService, RawListing};
use crate::services::normalizer;

/// Error types for the ingestion pipeline
#[derive(Debug)]
pub enum IngestError {
    /// The provider rejected the credential; fatal, the run is aborted
    InvalidCredential,
    /// The provider was unreachable or answered with a non-success status;
    /// fatal, retryable by the caller on its own schedule
    UpstreamUnavailable { status: Option<u16>, body: String },
    /// One record failed validation during normalization
    MalformedRecord(String),
    /// One record failed at a storage step
    Storage(String),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::InvalidCredential => {
                write!(f, "CoinMarketCap rejected the API credential")
            }
            IngestError::UpstreamUnavailable {
                status: Some(status),
                body,
            } => {
                write!(f, "CoinMarketCap API error {}: {}", status, body)
            }
            IngestError::UpstreamUnavailable { status: None, body } => {
                write!(f, "CoinMarketCap request failed: {}", body)
            }
            IngestError::MalformedRecord(detail) => write!(f, "Malformed record: {}", detail),
            IngestError::Storage(detail) => write!(f, "Database error: {}", detail),
        }
    }
}

impl std::error::Error for IngestError {}

/// Outcome of reconciling a single fetched record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Inserted,
    Updated,
    Failed(String),
}

/// Aggregated result of one ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub success: bool,
    pub records_processed: usize,
    pub inserted: usize,
    pub updated: usize,
    pub errors: Vec<String>,
    pub total_errors: usize,
}

impl RunSummary {
    /// Summary of a run that aborted at the fetch step, before any record
    /// was reconciled
    pub fn fatal(error: &IngestError) -> Self {
        Self {
            success: false,
            records_processed: 0,
            inserted: 0,
            updated: 0,
            errors: vec![error.to_string()],
            total_errors: 1,
        }
    }

    fn from_outcomes(outcomes: Vec<RecordOutcome>) -> Self {
        let mut summary = Self {
            success: true,
            records_processed: outcomes.len(),
            inserted: 0,
            updated: 0,
            errors: Vec::new(),
            total_errors: 0,
        };

        for outcome in outcomes {
            match outcome {
                RecordOutcome::Inserted => summary.inserted += 1,
                RecordOutcome::Updated => summary.updated += 1,
                RecordOutcome::Failed(message) => summary.errors.push(message),
            }
        }

        summary.total_errors = summary.errors.len();
        summary
    }
}

const DEFAULT_CONCURRENCY: usize = 8;

/// Batch orchestrator for one ingestion pass
#[derive(Clone)]
pub struct IngestionService {
    db: DatabaseConnection,
    provider: CoinMarketCapService,
    concurrency: usize,
}

impl IngestionService {
    pub fn new(db: DatabaseConnection, provider: CoinMarketCapService) -> Self {
        Self {
            db,
            provider,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Cap on per-record storage pipelines in flight at once
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Run one full ingestion pass.
    ///
    /// Returns `Err` only for fetch-level failures; a completed run always
    /// returns a summary, however many records failed individually.
    pub async fn run(&self, limit: u32, api_key: &str) -> Result<RunSummary, IngestError> {
        tracing::info!("Starting ingestion run for top {} listings", limit);

        let listings = match self.provider.fetch_ranked_listing(limit, api_key).await {
            Ok(listings) => listings,
            Err(e) => {
                tracing::error!("Ingestion run aborted at fetch: {}", e);
                return Err(e);
            }
        };

        let summary = self.reconcile(listings).await;

        tracing::info!(
            records_processed = summary.records_processed,
            inserted = summary.inserted,
            updated = summary.updated,
            total_errors = summary.total_errors,
            "Ingestion run complete"
        );

        Ok(summary)
    }

    /// Reconcile already-fetched records against the catalog.
    ///
    /// Rank is the 1-based fetch position, assigned here before any record
    /// is dispatched. Records are processed on a bounded concurrent stream
    /// that yields outcomes in fetch order, so the summary's error list
    /// stays ordered by position.
    pub async fn reconcile(&self, listings: Vec<RawListing>) -> RunSummary {
        let recorded_at = Utc::now().fixed_offset();

        let tasks: Vec<_> = listings
            .iter()
            .enumerate()
            .map(|(position, raw)| {
                let rank = (position + 1) as i32;
                self.reconcile_record(raw, rank, recorded_at)
            })
            .collect();

        let outcomes: Vec<RecordOutcome> = stream::iter(tasks)
            .buffered(self.concurrency)
            .collect()
            .await;

        RunSummary::from_outcomes(outcomes)
    }

    /// Normalize, resolve, upsert and record one fetched record.
    ///
    /// Every failure is caught and folded into the outcome; nothing
    /// propagates past this record.
    async fn reconcile_record(
        &self,
        raw: &RawListing,
        rank: i32,
        recorded_at: DateTimeWithTimeZone,
    ) -> RecordOutcome {
        let (asset, price) = match normalizer::normalize(raw) {
            Ok(fields) => fields,
            Err(IngestError::MalformedRecord(detail)) => {
                return RecordOutcome::Failed(format!(
                    "Malformed record at position {}: {}",
                    rank, detail
                ));
            }
            Err(other) => {
                return RecordOutcome::Failed(format!(
                    "Malformed record at position {}: {}",
                    rank, other
                ));
            }
        };

        // Identity resolution, keyed on the provider id only
        let existing = match Cryptocurrencies::find()
            .filter(cryptocurrencies::Column::CmcId.eq(asset.cmc_id))
            .one(&self.db)
            .await
        {
            Ok(row) => row,
            Err(e) => return storage_failure("Select", &asset.name, e),
        };

        // Catalog upsert: refresh descriptive fields in place, or create the
        // asset with a fresh internal id
        let (crypto_id, was_inserted) = match existing {
            Some(row) => {
                let id = row.id;
                let mut active: cryptocurrencies::ActiveModel = row.into();
                active.name = Set(asset.name.clone());
                active.symbol = Set(asset.symbol.clone());
                active.slug = Set(asset.slug.clone());
                active.logo_url = Set(asset.logo_url.clone());
                active.max_supply = Set(asset.max_supply);
                active.circulating_supply = Set(asset.circulating_supply);
                active.total_supply = Set(asset.total_supply);
                active.updated_at = Set(recorded_at);

                match active.update(&self.db).await {
                    Ok(_) => (id, false),
                    Err(e) => return storage_failure("Update", &asset.name, e),
                }
            }
            None => {
                let new_id = Uuid::new_v4();
                let active = cryptocurrencies::ActiveModel {
                    id: Set(new_id),
                    cmc_id: Set(asset.cmc_id),
                    name: Set(asset.name.clone()),
                    symbol: Set(asset.symbol.clone()),
                    slug: Set(asset.slug.clone()),
                    logo_url: Set(asset.logo_url.clone()),
                    max_supply: Set(asset.max_supply),
                    circulating_supply: Set(asset.circulating_supply),
                    total_supply: Set(asset.total_supply),
                    created_at: Set(recorded_at),
                    updated_at: Set(recorded_at),
                };

                // A concurrent run can insert the same cmc_id between the
                // select above and this insert; the conflict clause turns
                // that into an update instead of a duplicate-key failure.
                let insert = Cryptocurrencies::insert(active)
                    .on_conflict(
                        OnConflict::column(cryptocurrencies::Column::CmcId)
                            .update_columns([
                                cryptocurrencies::Column::Name,
                                cryptocurrencies::Column::Symbol,
                                cryptocurrencies::Column::Slug,
                                cryptocurrencies::Column::LogoUrl,
                                cryptocurrencies::Column::MaxSupply,
                                cryptocurrencies::Column::CirculatingSupply,
                                cryptocurrencies::Column::TotalSupply,
                                cryptocurrencies::Column::UpdatedAt,
                            ])
                            .to_owned(),
                    )
                    .exec_with_returning(&self.db)
                    .await;

                match insert {
                    // When the conflict path fired, the returned id belongs
                    // to the earlier insert; the snapshot must attach to
                    // that id, not the one generated above
                    Ok(row) => (row.id, true),
                    Err(e) => return storage_failure("Insert", &asset.name, e),
                }
            }
        };

        // Append-only snapshot, never an update
        let snapshot = crypto_prices::ActiveModel {
            id: NotSet,
            crypto_id: Set(crypto_id),
            price_usd: Set(price.price_usd),
            market_cap: Set(price.market_cap),
            volume_24h: Set(price.volume_24h),
            percent_change_1h: Set(price.percent_change_1h),
            percent_change_24h: Set(price.percent_change_24h),
            percent_change_7d: Set(price.percent_change_7d),
            percent_change_30d: Set(price.percent_change_30d),
            rank: Set(rank),
            recorded_at: Set(recorded_at),
            created_at: NotSet,
        };

        if let Err(e) = snapshot.insert(&self.db).await {
            return storage_failure("Price insert", &asset.name, e);
        }

        if was_inserted {
            RecordOutcome::Inserted
        } else {
            RecordOutcome::Updated
        }
    }
}

// Storage failures stay per-record: fold the error into the outcome with
// the failing step named
fn storage_failure(step: &str, name: &str, e: sea_orm::DbErr) -> RecordOutcome {
    let error = IngestError::Storage(e.to_string());
    RecordOutcome::Failed(format!("{} error for {}: {}", step, name, error))
}
