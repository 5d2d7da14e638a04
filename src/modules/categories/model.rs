//! Category data models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Free-form JSON describing which product attributes apply to this
    /// category (storage and battery for phones, ram for laptops, ...).
    #[schema(value_type = Option<Object>)]
    pub field_config: Option<serde_json::Value>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Subcategory entry embedded in a category tree response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubCategorySummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// A category with its subcategories and product count.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithChildren {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub field_config: Option<serde_json::Value>,
    pub sub_categories: Vec<SubCategorySummary>,
    pub product_count: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl CategoryWithChildren {
    pub fn from_parts(
        category: Category,
        sub_categories: Vec<SubCategorySummary>,
        product_count: i64,
    ) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            field_config: category.field_config,
            sub_categories,
            product_count,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub field_config: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub field_config: Option<serde_json::Value>,
}
