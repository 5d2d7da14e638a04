//! Sale data models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::modules::products::model::EntityRef;
use crate::utils::pagination::PaginationParams;
use crate::utils::serde::deserialize_optional_uuid;

/// A sale, priced directly in MGA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    #[serde(rename = "priceMGA")]
    pub price_mga: f64,
    /// Always `price_mga * quantity`; never client-supplied.
    pub total_revenue: f64,
    pub sale_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sale list row: the sale plus its product ref.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleWithProduct {
    #[serde(flatten)]
    pub sale: Sale,
    pub product: EntityRef,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleDto {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(range(exclusive_min = 0.0, message = "Price must be greater than 0"))]
    #[serde(rename = "priceMGA")]
    pub price_mga: f64,
    /// Defaults to now.
    pub sale_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSaleDto {
    pub product_id: Option<Uuid>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: Option<i32>,
    #[validate(range(exclusive_min = 0.0, message = "Price must be greater than 0"))]
    #[serde(rename = "priceMGA")]
    pub price_mga: Option<f64>,
    pub sale_date: Option<DateTime<Utc>>,
}

/// Query parameters for filtering sales.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub product_id: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}
