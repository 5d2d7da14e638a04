//! Product data models and DTOs.
//!
//! Products carry a set of free-form descriptive attributes (storage,
//! battery, ram, ...). Which of them are meaningful for a given product is
//! described by the parent category's `field_config`; the API itself treats
//! them all as optional strings.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::modules::purchases::model::Purchase;
use crate::modules::sales::model::Sale;
use crate::utils::pagination::PaginationParams;
use crate::utils::serde::deserialize_optional_uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub sub_category_id: Option<Uuid>,
    pub color: Option<String>,
    pub storage: Option<String>,
    pub model: Option<String>,
    pub battery: Option<String>,
    pub sim_type: Option<String>,
    pub condition: Option<String>,
    pub ram: Option<String>,
    pub processor: Option<String>,
    pub screen_size: Option<String>,
    pub graphics: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Reference to a named entity, embedded in product responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EntityRef {
    pub id: Uuid,
    pub name: String,
}

/// Product list row: the product plus its category and subcategory refs.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithRefs {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<EntityRef>,
    pub sub_category: Option<EntityRef>,
}

/// Product detail: refs plus full purchase and sale history, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<EntityRef>,
    pub sub_category: Option<EntityRef>,
    pub purchases: Vec<Purchase>,
    pub sales: Vec<Sale>,
}

/// Profit aggregation for a single product.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfitReport {
    pub product_id: Uuid,
    pub product_name: String,
    pub total_cost: f64,
    pub total_revenue: f64,
    pub profit: f64,
    pub total_purchased: i64,
    pub total_sold: i64,
    pub stock: i64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub sub_category_id: Option<Uuid>,
    pub color: Option<String>,
    pub storage: Option<String>,
    pub model: Option<String>,
    pub battery: Option<String>,
    pub sim_type: Option<String>,
    pub condition: Option<String>,
    pub ram: Option<String>,
    pub processor: Option<String>,
    pub screen_size: Option<String>,
    pub graphics: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub sub_category_id: Option<Uuid>,
    pub color: Option<String>,
    pub storage: Option<String>,
    pub model: Option<String>,
    pub battery: Option<String>,
    pub sim_type: Option<String>,
    pub condition: Option<String>,
    pub ram: Option<String>,
    pub processor: Option<String>,
    pub screen_size: Option<String>,
    pub graphics: Option<String>,
}

/// Query parameters for filtering products.
///
/// All filters are optional and can be combined.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub category_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub sub_category_id: Option<Uuid>,
    /// Case-insensitive substring match on name and model.
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "iPhone 13".to_string(),
            description: None,
            category_id: Uuid::new_v4(),
            sub_category_id: None,
            color: Some("Black".to_string()),
            storage: Some("128GB".to_string()),
            model: Some("A2633".to_string()),
            battery: None,
            sim_type: Some("eSIM".to_string()),
            condition: Some("New".to_string()),
            ram: None,
            processor: None,
            screen_size: None,
            graphics: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_product_serializes_camel_case() {
        let value = serde_json::to_value(sample_product()).unwrap();
        assert!(value.get("categoryId").is_some());
        assert!(value.get("subCategoryId").is_some());
        assert!(value.get("simType").is_some());
        assert!(value.get("screenSize").is_some());
    }

    #[test]
    fn test_product_with_refs_flattens_product_fields() {
        let product = sample_product();
        let row = ProductWithRefs {
            category: Some(EntityRef {
                id: product.category_id,
                name: "Phones".to_string(),
            }),
            sub_category: None,
            product,
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["name"], "iPhone 13");
        assert_eq!(value["category"]["name"], "Phones");
        assert!(value["subCategory"].is_null());
    }

    #[test]
    fn test_profit_report_wire_format() {
        let report = ProfitReport {
            product_id: Uuid::new_v4(),
            product_name: "iPhone 13".to_string(),
            total_cost: 25_000_000.0,
            total_revenue: 9_000_000.0,
            profit: -16_000_000.0,
            total_purchased: 10,
            total_sold: 3,
            stock: 7,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["totalCost"], 25_000_000.0);
        assert_eq!(value["totalPurchased"], 10);
        assert_eq!(value["stock"], 7);
    }

    #[test]
    fn test_create_product_dto_requires_name() {
        let dto = CreateProductDto {
            name: String::new(),
            description: None,
            category_id: Uuid::new_v4(),
            sub_category_id: None,
            color: None,
            storage: None,
            model: None,
            battery: None,
            sim_type: None,
            condition: None,
            ram: None,
            processor: None,
            screen_size: None,
            graphics: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_filter_params_tolerate_bad_uuid_and_page() {
        let filters: ProductFilterParams =
            serde_json::from_str(r#"{"categoryId":"garbage","page":"zero","search":"mac"}"#)
                .unwrap();
        assert_eq!(filters.category_id, None);
        assert_eq!(filters.search.as_deref(), Some("mac"));
        assert_eq!(filters.pagination.page(), 1);
    }
}
