//! Typed SQL builders for the products table.
//!
//! Every set field of a [`ProductFilter`] becomes one term of a single
//! AND condition; the full-text search is just another term. Writes that
//! race with counters (stock, views) touch only the columns they own.

use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Alias, Expr, Func, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect, Select,
    UpdateMany, Value,
};
use uuid::Uuid;

use super::entities::product::{Column, Entity as ProductEntity};
use crate::config::SEARCH_LANGUAGE;
use crate::domain::{ProductChanges, ProductFilter, ProductStatus, SortField, SortOrder};
use crate::errors::{AppError, AppResult};

pub struct ProductQueryBuilder<'a> {
    filter: &'a ProductFilter,
}

impl<'a> ProductQueryBuilder<'a> {
    pub fn new(filter: &'a ProductFilter) -> Self {
        Self { filter }
    }

    /// AND of every active filter term
    pub fn condition(&self) -> Condition {
        let f = self.filter;

        Condition::all()
            .add(Column::Status.eq(f.status.as_str()))
            .add_option(f.search.as_deref().map(text_search))
            .add_option(f.category.map(|c| Column::Category.eq(c.as_str())))
            .add_option(f.origin.as_deref().map(|o| contains_ci(Column::Origin, o)))
            .add_option(f.artist.as_deref().map(|a| contains_ci(Column::Artist, a)))
            .add_option(f.min_price.map(|p| Column::Price.gte(p)))
            .add_option(f.max_price.map(|p| Column::Price.lte(p)))
            .add_option(f.condition.map(|c| Column::Condition.eq(c.as_str())))
            .add_option(f.is_featured.map(|v| Column::IsFeatured.eq(v)))
    }

    pub fn order(&self) -> (Column, Order) {
        let column = match self.filter.sort_by {
            SortField::CreatedAt => Column::CreatedAt,
            SortField::UpdatedAt => Column::UpdatedAt,
            SortField::Price => Column::Price,
            SortField::Name => Column::Name,
            SortField::AverageRating => Column::AverageRating,
            SortField::ViewCount => Column::ViewCount,
            SortField::Stock => Column::Stock,
            SortField::YearCreated => Column::YearCreated,
        };
        let order = match self.filter.sort_order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };
        (column, order)
    }

    /// Filtered and ordered select, without paging
    pub fn select(&self) -> Select<ProductEntity> {
        let (column, order) = self.order();
        ProductEntity::find()
            .filter(self.condition())
            .order_by(column, order)
            // Stable pages when the sort key ties
            .order_by_asc(Column::Id)
    }
}

/// Status once the stock becomes `new_stock`, mirroring
/// [`ProductStatus::after_stock_change`] in SQL.
pub fn status_after_stock(new_stock: SimpleExpr) -> SimpleExpr {
    Expr::case(
        Expr::expr(new_stock.clone()).eq(0),
        Expr::value(ProductStatus::OutOfStock.as_str()),
    )
    .case(
        Condition::all()
            .add(Expr::col(Column::Status).eq(ProductStatus::OutOfStock.as_str()))
            .add(Expr::expr(new_stock).gt(0)),
        Expr::value(ProductStatus::Active.as_str()),
    )
    .finally(Expr::col(Column::Status))
    .into()
}

/// Atomic `stock += delta` with the status rule applied in the same row write.
///
/// Matches no row when the product is missing or the result would leave
/// `0..=i32::MAX`; the bound is checked in bigint so it cannot overflow.
pub fn stock_adjustment(id: Uuid, delta: i32) -> UpdateMany<ProductEntity> {
    let new_stock = Expr::col(Column::Stock).add(delta);
    let widened = Expr::col(Column::Stock)
        .cast_as(Alias::new("bigint"))
        .add(i64::from(delta));

    ProductEntity::update_many()
        .col_expr(Column::Stock, new_stock.clone())
        .col_expr(Column::Status, status_after_stock(new_stock))
        .col_expr(Column::UpdatedAt, Expr::current_timestamp().into())
        .filter(Column::Id.eq(id))
        .filter(Expr::expr(widened).between(0i64, i64::from(i32::MAX)))
}

/// UPDATE writing only the submitted columns plus the audit fields.
///
/// A stock change without an explicit status runs the status rule against
/// the row's current status.
pub fn partial_update(
    id: Uuid,
    changes: &ProductChanges,
    modified_by: Uuid,
) -> AppResult<UpdateMany<ProductEntity>> {
    let dimensions = changes
        .dimensions
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| AppError::internal(format!("dimensions encode failed: {}", e)))?;

    let text = |value: &Option<String>| value.clone().map(Value::from);
    let list = |value: &Option<Vec<String>>| value.clone().map(Value::from);
    let assignments: [(Column, Option<Value>); 23] = [
        (Column::Name, changes.name.as_ref().map(|n| n.trim().into())),
        (Column::Description, text(&changes.description)),
        (Column::Price, changes.price.map(Value::from)),
        (Column::Category, changes.category.map(|c| c.as_str().into())),
        (Column::Origin, text(&changes.origin)),
        (Column::Artist, text(&changes.artist)),
        (Column::Tribe, text(&changes.tribe)),
        (Column::Stock, changes.stock.map(Value::from)),
        (Column::Images, list(&changes.images)),
        (Column::Dimensions, dimensions.map(Value::from)),
        (Column::Materials, list(&changes.materials)),
        (Column::Condition, changes.condition.map(|c| c.as_str().into())),
        (Column::YearCreated, changes.year_created.map(Value::from)),
        (Column::Status, changes.status.map(|s| s.as_str().into())),
        (Column::Tags, list(&changes.tags)),
        (Column::IsFeatured, changes.is_featured.map(Value::from)),
        (Column::AverageRating, changes.average_rating.map(Value::from)),
        (Column::ReviewCount, changes.review_count.map(Value::from)),
        (Column::CulturalSignificance, text(&changes.cultural_significance)),
        (Column::AuthenticityNote, text(&changes.authenticity_note)),
        (Column::SeoTitle, text(&changes.seo_title)),
        (Column::SeoDescription, text(&changes.seo_description)),
        (Column::SeoKeywords, list(&changes.seo_keywords)),
    ];

    let mut update = assignments
        .into_iter()
        .filter_map(|(column, value)| value.map(|value| (column, value)))
        .fold(ProductEntity::update_many(), |update, (column, value)| {
            update.col_expr(column, Expr::value(value))
        });

    if let (None, Some(stock)) = (changes.status, changes.stock) {
        update = update.col_expr(Column::Status, status_after_stock(Expr::value(stock)));
    }

    Ok(update
        .col_expr(Column::LastModifiedBy, Expr::value(modified_by))
        .col_expr(Column::UpdatedAt, Expr::current_timestamp().into())
        .filter(Column::Id.eq(id)))
}

/// Whole-catalog totals in one row
pub fn catalog_totals() -> Select<ProductEntity> {
    ProductEntity::find()
        .select_only()
        .column_as(Expr::expr(Func::count(Expr::col(Column::Id))), "total_products")
        .column_as(
            Expr::cust(format!(
                "COUNT(*) FILTER (WHERE \"status\" = '{}')",
                ProductStatus::Active.as_str()
            )),
            "active_products",
        )
        .column_as(Expr::expr(Func::sum(Expr::col(Column::Price))), "total_value")
        .column_as(Expr::expr(Func::avg(Expr::col(Column::Price))), "average_price")
        .column_as(Expr::expr(Func::sum(Expr::col(Column::Stock))), "total_stock")
}

/// Product count per category, largest first
pub fn category_counts() -> Select<ProductEntity> {
    ProductEntity::find()
        .select_only()
        .column(Column::Category)
        .column_as(Expr::expr(Func::count(Expr::col(Column::Id))), "count")
        .group_by(Column::Category)
        .order_by(Expr::cust("\"count\""), Order::Desc)
        .order_by_asc(Column::Category)
}

fn text_search(terms: &str) -> SimpleExpr {
    Expr::cust_with_expr(
        format!(
            r#"product_search_document("name", "description", "tags") @@ plainto_tsquery('{}', $1)"#,
            SEARCH_LANGUAGE
        ),
        Expr::val(terms),
    )
}

fn contains_ci(column: Column, needle: &str) -> SimpleExpr {
    Expr::col(column).ilike(format!("%{}%", escape_like(needle)))
}

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
