//! Product database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::{Dimensions, Product};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: f64,
    pub category: String,
    pub origin: String,
    pub artist: String,
    pub tribe: Option<String>,
    pub stock: i32,
    pub images: Vec<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub dimensions: Option<Json>,
    pub materials: Vec<String>,
    pub condition: String,
    pub year_created: Option<i32>,
    pub status: String,
    pub tags: Vec<String>,
    pub is_featured: bool,
    pub average_rating: f64,
    pub review_count: i32,
    pub view_count: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub cultural_significance: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub authenticity_note: Option<String>,
    pub seo_title: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub seo_description: Option<String>,
    pub seo_keywords: Vec<String>,
    pub added_by: Uuid,
    pub last_modified_by: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn corrupt(id: Uuid, field: &str, detail: impl std::fmt::Display) -> AppError {
    AppError::internal(format!("product {} has invalid {}: {}", id, field, detail))
}

impl TryFrom<Model> for Product {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = model.id;
        let dimensions = model
            .dimensions
            .map(serde_json::from_value::<Dimensions>)
            .transpose()
            .map_err(|e| corrupt(id, "dimensions", e))?;

        Ok(Product {
            id,
            name: model.name,
            description: model.description,
            price: model.price,
            category: model.category.parse().map_err(|e| corrupt(id, "category", e))?,
            origin: model.origin,
            artist: model.artist,
            tribe: model.tribe,
            stock: model.stock,
            images: model.images,
            dimensions,
            materials: model.materials,
            condition: model
                .condition
                .parse()
                .map_err(|e| corrupt(id, "condition", e))?,
            year_created: model.year_created,
            status: model.status.parse().map_err(|e| corrupt(id, "status", e))?,
            tags: model.tags,
            is_featured: model.is_featured,
            average_rating: model.average_rating,
            review_count: model.review_count,
            view_count: model.view_count,
            cultural_significance: model.cultural_significance,
            authenticity_note: model.authenticity_note,
            seo_title: model.seo_title,
            seo_description: model.seo_description,
            seo_keywords: model.seo_keywords,
            added_by: model.added_by,
            last_modified_by: model.last_modified_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl ActiveModel {
    /// Full-row active model for a domain product
    pub fn from_product(product: &Product) -> Result<Self, AppError> {
        let dimensions = product
            .dimensions
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| AppError::internal(format!("dimensions encode failed: {}", e)))?;

        Ok(Self {
            id: Set(product.id),
            name: Set(product.name.clone()),
            description: Set(product.description.clone()),
            price: Set(product.price),
            category: Set(product.category.as_str().to_string()),
            origin: Set(product.origin.clone()),
            artist: Set(product.artist.clone()),
            tribe: Set(product.tribe.clone()),
            stock: Set(product.stock),
            images: Set(product.images.clone()),
            dimensions: Set(dimensions),
            materials: Set(product.materials.clone()),
            condition: Set(product.condition.as_str().to_string()),
            year_created: Set(product.year_created),
            status: Set(product.status.as_str().to_string()),
            tags: Set(product.tags.clone()),
            is_featured: Set(product.is_featured),
            average_rating: Set(product.average_rating),
            review_count: Set(product.review_count),
            view_count: Set(product.view_count),
            cultural_significance: Set(product.cultural_significance.clone()),
            authenticity_note: Set(product.authenticity_note.clone()),
            seo_title: Set(product.seo_title.clone()),
            seo_description: Set(product.seo_description.clone()),
            seo_keywords: Set(product.seo_keywords.clone()),
            added_by: Set(product.added_by),
            last_modified_by: Set(product.last_modified_by),
            created_at: Set(product.created_at),
            updated_at: Set(product.updated_at),
        })
    }
}
