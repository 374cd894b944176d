use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create crypto_prices append-only snapshot table
        manager
            .create_table(
                Table::create()
                    .table(CryptoPrices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CryptoPrices::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CryptoPrices::CryptoId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CryptoPrices::PriceUsd)
                            .decimal_len(30, 10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CryptoPrices::MarketCap)
                            .decimal_len(30, 10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CryptoPrices::Volume24h)
                            .decimal_len(30, 10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CryptoPrices::PercentChange1h)
                            .decimal_len(18, 8)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CryptoPrices::PercentChange24h)
                            .decimal_len(18, 8)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CryptoPrices::PercentChange7d)
                            .decimal_len(18, 8)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CryptoPrices::PercentChange30d)
                            .decimal_len(18, 8)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CryptoPrices::Rank)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CryptoPrices::RecordedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CryptoPrices::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Foreign key to cryptocurrencies
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_crypto_prices_crypto_id")
                    .from(CryptoPrices::Table, CryptoPrices::CryptoId)
                    .to(Cryptocurrencies::Table, Cryptocurrencies::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // Composite index for latest-price lookups: (crypto_id, recorded_at DESC)
        manager
            .create_index(
                Index::create()
                    .name("idx_crypto_prices_crypto_recorded")
                    .table(CryptoPrices::Table)
                    .col(CryptoPrices::CryptoId)
                    .col((CryptoPrices::RecordedAt, IndexOrder::Desc))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CryptoPrices::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CryptoPrices {
    Table,
    Id,
    CryptoId,
    PriceUsd,
    MarketCap,
    #[sea_orm(iden = "volume_24h")]
    Volume24h,
    #[sea_orm(iden = "percent_change_1h")]
    PercentChange1h,
    #[sea_orm(iden = "percent_change_24h")]
    PercentChange24h,
    #[sea_orm(iden = "percent_change_7d")]
    PercentChange7d,
    #[sea_orm(iden = "percent_change_30d")]
    PercentChange30d,
    Rank,
    RecordedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Cryptocurrencies {
    Table,
    Id,
}
