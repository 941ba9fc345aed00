//! Migration: Create products table with catalog indexes.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Full-text document over name, description and tags. Declared IMMUTABLE
/// so it can back an expression index.
const CREATE_SEARCH_FUNCTION: &str = r#"
CREATE OR REPLACE FUNCTION product_search_document(name text, description text, tags text[])
RETURNS tsvector
LANGUAGE sql
IMMUTABLE
AS $$
    SELECT to_tsvector(
        'english'::regconfig,
        coalesce(name, '') || ' ' || coalesce(description, '') || ' ' || coalesce(array_to_string(tags, ' '), '')
    )
$$
"#;

const CREATE_SEARCH_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_products_search \
     ON products USING GIN (product_search_document(name, description, tags))";

const ADD_CHECKS: &str = "ALTER TABLE products \
     ADD CONSTRAINT chk_products_rating CHECK (average_rating >= 0 AND average_rating <= 5), \
     ADD CONSTRAINT chk_products_year CHECK (year_created IS NULL OR year_created >= 1000), \
     ADD CONSTRAINT chk_products_counters CHECK (review_count >= 0 AND view_count >= 0)";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Products::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::Description).text().not_null())
                    .col(
                        ColumnDef::new(Products::Price)
                            .double()
                            .not_null()
                            .check(Expr::col(Products::Price).gte(0)),
                    )
                    .col(ColumnDef::new(Products::Category).string_len(32).not_null())
                    .col(ColumnDef::new(Products::Origin).string().not_null())
                    .col(ColumnDef::new(Products::Artist).string().not_null())
                    .col(ColumnDef::new(Products::Tribe).string().null())
                    .col(
                        ColumnDef::new(Products::Stock)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Products::Stock).gte(0)),
                    )
                    .col(&mut text_array(Products::Images))
                    .col(ColumnDef::new(Products::Dimensions).json_binary().null())
                    .col(&mut text_array(Products::Materials))
                    .col(
                        ColumnDef::new(Products::Condition)
                            .string_len(16)
                            .not_null()
                            .default("new"),
                    )
                    .col(ColumnDef::new(Products::YearCreated).integer().null())
                    .col(
                        ColumnDef::new(Products::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(&mut text_array(Products::Tags))
                    .col(
                        ColumnDef::new(Products::IsFeatured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Products::AverageRating)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Products::ReviewCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Products::ViewCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Products::CulturalSignificance).text().null())
                    .col(ColumnDef::new(Products::AuthenticityNote).text().null())
                    .col(ColumnDef::new(Products::SeoTitle).string().null())
                    .col(ColumnDef::new(Products::SeoDescription).text().null())
                    .col(&mut text_array(Products::SeoKeywords))
                    .col(ColumnDef::new(Products::AddedBy).uuid().not_null())
                    .col(ColumnDef::new(Products::LastModifiedBy).uuid().null())
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Products::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_category_status")
                    .table(Products::Table)
                    .col(Products::Category)
                    .col(Products::Status)
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_products_origin", Products::Origin),
            ("idx_products_artist", Products::Artist),
            ("idx_products_price", Products::Price),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Products::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        let db = manager.get_connection();
        db.execute_unprepared(ADD_CHECKS).await?;
        db.execute_unprepared(CREATE_SEARCH_FUNCTION).await?;
        db.execute_unprepared(CREATE_SEARCH_INDEX).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "DROP FUNCTION IF EXISTS product_search_document(text, text, text[])",
            )
            .await?;

        Ok(())
    }
}

fn text_array(column: Products) -> ColumnDef {
    ColumnDef::new(column)
        .array(ColumnType::Text)
        .not_null()
        .default(Expr::cust("'{}'::text[]"))
        .to_owned()
}

#[derive(Iden, Clone, Copy)]
enum Products {
    Table,
    Id,
    Name,
    Description,
    Price,
    Category,
    Origin,
    Artist,
    Tribe,
    Stock,
    Images,
    Dimensions,
    Materials,
    Condition,
    YearCreated,
    Status,
    Tags,
    IsFeatured,
    AverageRating,
    ReviewCount,
    ViewCount,
    CulturalSignificance,
    AuthenticityNote,
    SeoTitle,
    SeoDescription,
    SeoKeywords,
    AddedBy,
    LastModifiedBy,
    CreatedAt,
    UpdatedAt,
}
