//! Purchase data models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::modules::products::model::EntityRef;
use crate::utils::pagination::PaginationParams;
use crate::utils::serde::deserialize_optional_uuid;

/// A stock purchase (import), priced in RMB and converted to MGA at the
/// recorded exchange rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    #[serde(rename = "priceRMB")]
    pub price_rmb: f64,
    pub exchange_rate: f64,
    /// Always `price_rmb * exchange_rate * quantity`; never client-supplied.
    #[serde(rename = "totalCostMGA")]
    pub total_cost_mga: f64,
    pub purchase_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Purchase list row: the purchase plus its product ref.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseWithProduct {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub product: EntityRef,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseDto {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(range(exclusive_min = 0.0, message = "Price must be greater than 0"))]
    #[serde(rename = "priceRMB")]
    pub price_rmb: f64,
    /// Falls back to the active exchange rate when omitted.
    #[validate(range(exclusive_min = 0.0, message = "Exchange rate must be greater than 0"))]
    pub exchange_rate: Option<f64>,
    /// Defaults to now.
    pub purchase_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePurchaseDto {
    pub product_id: Option<Uuid>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: Option<i32>,
    #[validate(range(exclusive_min = 0.0, message = "Price must be greater than 0"))]
    #[serde(rename = "priceRMB")]
    pub price_rmb: Option<f64>,
    #[validate(range(exclusive_min = 0.0, message = "Exchange rate must be greater than 0"))]
    pub exchange_rate: Option<f64>,
    pub purchase_date: Option<DateTime<Utc>>,
}

/// Query parameters for filtering purchases.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub product_id: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}
