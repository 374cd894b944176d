use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create cryptocurrencies catalog table
        manager
            .create_table(
                Table::create()
                    .table(Cryptocurrencies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cryptocurrencies::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Cryptocurrencies::CmcId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Cryptocurrencies::Name)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Cryptocurrencies::Symbol)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Cryptocurrencies::Slug)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Cryptocurrencies::LogoUrl)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Cryptocurrencies::MaxSupply)
                            .decimal_len(30, 10)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Cryptocurrencies::CirculatingSupply)
                            .decimal_len(30, 10)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Cryptocurrencies::TotalSupply)
                            .decimal_len(30, 10)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Cryptocurrencies::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(Cryptocurrencies::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique constraint: one catalog row per provider id, backs the
        // ON CONFLICT upsert in the ingestion path
        manager
            .create_index(
                Index::create()
                    .name("idx_cryptocurrencies_cmc_id")
                    .table(Cryptocurrencies::Table)
                    .col(Cryptocurrencies::CmcId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index for case-insensitive search on symbol
        manager
            .create_index(
                Index::create()
                    .name("idx_cryptocurrencies_symbol")
                    .table(Cryptocurrencies::Table)
                    .col(Cryptocurrencies::Symbol)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Cryptocurrencies::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Cryptocurrencies {
    Table,
    Id,
    CmcId,
    Name,
    Symbol,
    Slug,
    LogoUrl,
    MaxSupply,
    CirculatingSupply,
    TotalSupply,
    CreatedAt,
    UpdatedAt,
}
