//! Exchange rate data models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// RMB → MGA conversion rate.
///
/// At most one row is active at a time; the active row is the default rate
/// applied to new purchases and orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub id: Uuid,
    pub rate: f64,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExchangeRateDto {
    #[validate(range(exclusive_min = 0.0, message = "Rate must be greater than 0"))]
    pub rate: f64,
    /// New rates become the active rate unless explicitly created inactive.
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExchangeRateDto {
    #[validate(range(exclusive_min = 0.0, message = "Rate must be greater than 0"))]
    pub rate: Option<f64>,
    pub is_active: Option<bool>,
}
