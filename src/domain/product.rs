//! Product aggregate: catalog item with descriptive metadata and stock rules.

use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::config::{MAX_AVERAGE_RATING, MIN_YEAR_CREATED};
use crate::errors::{AppError, AppResult};

macro_rules! string_enum {
    ($name:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(AppError::validation(format!(
                        "Unknown {} '{}'",
                        $label, other
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Sculpture,
    Painting,
    Mask,
    Textile,
    Jewelry,
    Pottery,
    Woodcarving,
    Beadwork,
    Basket,
    Instrument,
}

string_enum!(ProductCategory, "category" {
    Sculpture => "sculpture",
    Painting => "painting",
    Mask => "mask",
    Textile => "textile",
    Jewelry => "jewelry",
    Pottery => "pottery",
    Woodcarving => "woodcarving",
    Beadwork => "beadwork",
    Basket => "basket",
    Instrument => "instrument",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductCondition {
    #[default]
    New,
    Vintage,
    Antique,
    Restored,
}

string_enum!(ProductCondition, "condition" {
    New => "new",
    Vintage => "vintage",
    Antique => "antique",
    Restored => "restored",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    OutOfStock,
    Discontinued,
}

string_enum!(ProductStatus, "status" {
    Active => "active",
    Inactive => "inactive",
    OutOfStock => "out_of_stock",
    Discontinued => "discontinued",
});

impl ProductStatus {
    /// Status after the stock level changed to `new_stock`.
    ///
    /// Empty stock always reads as out of stock; restocking only revives
    /// items that were out of stock, never inactive or discontinued ones.
    pub fn after_stock_change(self, new_stock: i32) -> Self {
        match (self, new_stock) {
            (_, 0) => ProductStatus::OutOfStock,
            (ProductStatus::OutOfStock, n) if n > 0 => ProductStatus::Active,
            (status, _) => status,
        }
    }
}

/// Physical dimensions; weight is in grams
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Dimensions {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}

impl Dimensions {
    pub fn validate(&self) -> AppResult<()> {
        let fields = [
            ("length", self.length),
            ("width", self.width),
            ("height", self.height),
            ("weight", self.weight),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                non_negative(&format!("dimensions.{}", name), value)?;
            }
        }
        Ok(())
    }
}

/// Catalog item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Gelede Mask")]
    pub name: String,
    pub description: String,
    #[schema(example = 120.0)]
    pub price: f64,
    pub category: ProductCategory,
    #[schema(example = "Nigeria")]
    pub origin: String,
    pub artist: String,
    pub tribe: Option<String>,
    pub stock: i32,
    pub images: Vec<String>,
    pub dimensions: Option<Dimensions>,
    pub materials: Vec<String>,
    pub condition: ProductCondition,
    pub year_created: Option<i32>,
    pub status: ProductStatus,
    pub tags: Vec<String>,
    pub is_featured: bool,
    pub average_rating: f64,
    pub review_count: i32,
    pub view_count: i64,
    pub cultural_significance: Option<String>,
    pub authenticity_note: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Vec<String>,
    pub added_by: Uuid,
    pub last_modified_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Build a fresh product from a validated draft.
    pub fn create(draft: NewProduct, added_by: Uuid) -> AppResult<Self> {
        let draft = draft.normalized();
        let now = Utc::now();
        // A draft with no explicit status follows the stock rule from the start.
        let status = match draft.status {
            Some(status) => status,
            None => ProductStatus::default().after_stock_change(draft.stock),
        };

        let product = Self {
            id: Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            category: draft.category,
            origin: draft.origin,
            artist: draft.artist,
            tribe: draft.tribe,
            stock: draft.stock,
            images: draft.images,
            dimensions: draft.dimensions,
            materials: draft.materials,
            condition: draft.condition.unwrap_or_default(),
            year_created: draft.year_created,
            status,
            tags: draft.tags,
            is_featured: draft.is_featured.unwrap_or(false),
            average_rating: draft.average_rating.unwrap_or(0.0),
            review_count: draft.review_count.unwrap_or(0),
            view_count: 0,
            cultural_significance: draft.cultural_significance,
            authenticity_note: draft.authenticity_note,
            seo_title: draft.seo_title,
            seo_description: draft.seo_description,
            seo_keywords: draft.seo_keywords,
            added_by,
            last_modified_by: None,
            created_at: now,
            updated_at: now,
        };

        product.check_invariants()?;
        Ok(product)
    }

    /// Apply a partial update. Fields absent from `changes` keep their value.
    pub fn apply(&mut self, changes: ProductChanges, modified_by: Uuid) {
        let stock_changed = changes.stock.is_some();
        let status_given = changes.status.is_some();

        macro_rules! assign {
            ($($field:ident),+) => {
                $(if let Some(value) = changes.$field {
                    self.$field = value;
                })+
            };
        }
        macro_rules! assign_opt {
            ($($field:ident),+) => {
                $(if let Some(value) = changes.$field {
                    self.$field = Some(value);
                })+
            };
        }

        if let Some(name) = changes.name {
            self.name = name.trim().to_string();
        }
        assign!(
            description, price, category, origin, artist, stock, images, materials, condition,
            status, tags, is_featured, average_rating, review_count, seo_keywords
        );
        assign_opt!(
            tribe, dimensions, year_created, cultural_significance, authenticity_note,
            seo_title, seo_description
        );

        if stock_changed && !status_given {
            self.status = self.status.after_stock_change(self.stock);
        }

        self.last_modified_by = Some(modified_by);
        self.updated_at = Utc::now();
    }

    /// Validate every field-level invariant of the record.
    pub fn check_invariants(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("name must not be empty"));
        }
        non_negative("price", self.price)?;
        if self.stock < 0 {
            return Err(AppError::validation("stock must not be negative"));
        }
        if let Some(dimensions) = &self.dimensions {
            dimensions.validate()?;
        }
        if let Some(year) = self.year_created {
            check_year_created(year)?;
        }
        if !(0.0..=MAX_AVERAGE_RATING).contains(&self.average_rating) {
            return Err(AppError::validation(format!(
                "averageRating must be between 0 and {}",
                MAX_AVERAGE_RATING
            )));
        }
        if self.review_count < 0 || self.view_count < 0 {
            return Err(AppError::validation("counters must not be negative"));
        }
        Ok(())
    }
}

/// Input for creating a product
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    pub category: ProductCategory,
    #[validate(length(min = 1, message = "Origin is required"))]
    pub origin: String,
    #[validate(length(min = 1, message = "Artist is required"))]
    pub artist: String,
    pub tribe: Option<String>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,
    #[serde(default)]
    pub images: Vec<String>,
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    pub materials: Vec<String>,
    pub condition: Option<ProductCondition>,
    pub year_created: Option<i32>,
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_featured: Option<bool>,
    #[validate(range(min = 0.0, max = 5.0, message = "averageRating must be between 0 and 5"))]
    pub average_rating: Option<f64>,
    #[validate(range(min = 0, message = "reviewCount cannot be negative"))]
    pub review_count: Option<i32>,
    pub cultural_significance: Option<String>,
    pub authenticity_note: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    #[serde(default)]
    pub seo_keywords: Vec<String>,
}

impl NewProduct {
    /// Minimal draft with the required fields; everything else defaulted.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        category: ProductCategory,
        origin: impl Into<String>,
        artist: impl Into<String>,
        stock: i32,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
            category,
            origin: origin.into(),
            artist: artist.into(),
            tribe: None,
            stock,
            images: Vec::new(),
            dimensions: None,
            materials: Vec::new(),
            condition: None,
            year_created: None,
            status: None,
            tags: Vec::new(),
            is_featured: None,
            average_rating: None,
            review_count: None,
            cultural_significance: None,
            authenticity_note: None,
            seo_title: None,
            seo_description: None,
            seo_keywords: Vec::new(),
        }
    }

    fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }
}

/// Partial product update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanges {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    pub category: Option<ProductCategory>,
    #[validate(length(min = 1, message = "Origin cannot be empty"))]
    pub origin: Option<String>,
    #[validate(length(min = 1, message = "Artist cannot be empty"))]
    pub artist: Option<String>,
    pub tribe: Option<String>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
    pub images: Option<Vec<String>>,
    pub dimensions: Option<Dimensions>,
    pub materials: Option<Vec<String>>,
    pub condition: Option<ProductCondition>,
    pub year_created: Option<i32>,
    pub status: Option<ProductStatus>,
    pub tags: Option<Vec<String>>,
    pub is_featured: Option<bool>,
    #[validate(range(min = 0.0, max = 5.0, message = "averageRating must be between 0 and 5"))]
    pub average_rating: Option<f64>,
    #[validate(range(min = 0, message = "reviewCount cannot be negative"))]
    pub review_count: Option<i32>,
    pub cultural_significance: Option<String>,
    pub authenticity_note: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<Vec<String>>,
}

/// Product with its admin references resolved to email projections
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[serde(flatten)]
    #[schema(inline)]
    pub product: ProductBody,
    pub added_by: super::AdminRef,
    pub last_modified_by: Option<super::AdminRef>,
}

/// Product fields without the raw admin reference ids
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: ProductCategory,
    pub origin: String,
    pub artist: String,
    pub tribe: Option<String>,
    pub stock: i32,
    pub images: Vec<String>,
    pub dimensions: Option<Dimensions>,
    pub materials: Vec<String>,
    pub condition: ProductCondition,
    pub year_created: Option<i32>,
    pub status: ProductStatus,
    pub tags: Vec<String>,
    pub is_featured: bool,
    pub average_rating: f64,
    pub review_count: i32,
    pub view_count: i64,
    pub cultural_significance: Option<String>,
    pub authenticity_note: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductResponse {
    pub fn new(
        product: Product,
        added_by: super::AdminRef,
        last_modified_by: Option<super::AdminRef>,
    ) -> Self {
        Self {
            product: ProductBody {
                id: product.id,
                name: product.name,
                description: product.description,
                price: product.price,
                category: product.category,
                origin: product.origin,
                artist: product.artist,
                tribe: product.tribe,
                stock: product.stock,
                images: product.images,
                dimensions: product.dimensions,
                materials: product.materials,
                condition: product.condition,
                year_created: product.year_created,
                status: product.status,
                tags: product.tags,
                is_featured: product.is_featured,
                average_rating: product.average_rating,
                review_count: product.review_count,
                view_count: product.view_count,
                cultural_significance: product.cultural_significance,
                authenticity_note: product.authenticity_note,
                seo_title: product.seo_title,
                seo_description: product.seo_description,
                seo_keywords: product.seo_keywords,
                created_at: product.created_at,
                updated_at: product.updated_at,
            },
            added_by,
            last_modified_by,
        }
    }
}

/// Parse a product id from a path segment.
pub fn parse_product_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::invalid_argument("Invalid product ID"))
}

fn non_negative(field: &str, value: f64) -> AppResult<()> {
    if value.is_nan() || value < 0.0 {
        return Err(AppError::validation(format!("{} must not be negative", field)));
    }
    Ok(())
}

fn check_year_created(year: i32) -> AppResult<()> {
    let current_year = Utc::now().year();
    if year < MIN_YEAR_CREATED || year > current_year {
        return Err(AppError::validation(format!(
            "yearCreated must be between {} and {}",
            MIN_YEAR_CREATED, current_year
        )));
    }
    Ok(())
}
