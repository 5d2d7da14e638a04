//! Order data models and DTOs.
//!
//! Orders track inbound procurement that has not become stock yet, so they
//! reference the product by free-text name rather than by id.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::PaginationParams;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(()),
        }
    }
}

/// Unknown status values in the query string drop the filter instead of
/// failing the request, like the other lenient list parameters.
fn deserialize_optional_status<'de, D>(deserializer: D) -> Result<Option<OrderStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.and_then(|s| s.parse().ok()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    #[serde(rename = "priceRMB")]
    pub price_rmb: f64,
    pub exchange_rate: f64,
    /// Always `price_rmb * exchange_rate * quantity`; never client-supplied.
    #[serde(rename = "totalCostMGA")]
    pub total_cost_mga: f64,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderDto {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub product_name: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(range(exclusive_min = 0.0, message = "Price must be greater than 0"))]
    #[serde(rename = "priceRMB")]
    pub price_rmb: f64,
    /// Falls back to the active exchange rate when omitted.
    #[validate(range(exclusive_min = 0.0, message = "Exchange rate must be greater than 0"))]
    pub exchange_rate: Option<f64>,
    #[serde(default)]
    pub status: OrderStatus,
    /// Defaults to now.
    pub order_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderDto {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub product_name: Option<String>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: Option<i32>,
    #[validate(range(exclusive_min = 0.0, message = "Price must be greater than 0"))]
    #[serde(rename = "priceRMB")]
    pub price_rmb: Option<f64>,
    #[validate(range(exclusive_min = 0.0, message = "Exchange rate must be greater than 0"))]
    pub exchange_rate: Option<f64>,
    pub status: Option<OrderStatus>,
    pub order_date: Option<DateTime<Utc>>,
}

/// Query parameters for filtering orders.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_status")]
    pub status: Option<OrderStatus>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_round_trips_through_strings() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_order_status_parse_is_case_insensitive() {
        assert_eq!("PENDING".parse::<OrderStatus>(), Ok(OrderStatus::Pending));
        assert_eq!(" Completed ".parse(), Ok(OrderStatus::Completed));
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_wire_field_names() {
        let order = Order {
            id: Uuid::new_v4(),
            product_name: "MacBook Pro".to_string(),
            quantity: 10,
            price_rmb: 500.0,
            exchange_rate: 5000.0,
            total_cost_mga: 25_000_000.0,
            status: OrderStatus::Pending,
            order_date: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["priceRMB"], 500.0);
        assert_eq!(value["totalCostMGA"], 25_000_000.0);
        assert_eq!(value["status"], "pending");
        assert_eq!(value["productName"], "MacBook Pro");
    }

    #[test]
    fn test_create_dto_status_defaults_to_pending() {
        let dto: CreateOrderDto = serde_json::from_str(
            r#"{"productName":"MacBook Pro","quantity":10,"priceRMB":500}"#,
        )
        .unwrap();
        assert_eq!(dto.status, OrderStatus::Pending);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_filter_params_drop_unknown_status() {
        let filters: OrderFilterParams =
            serde_json::from_str(r#"{"status":"shipped","page":"2"}"#).unwrap();
        assert_eq!(filters.status, None);
        assert_eq!(filters.pagination.page(), 2);

        let filters: OrderFilterParams = serde_json::from_str(r#"{"status":"completed"}"#).unwrap();
        assert_eq!(filters.status, Some(OrderStatus::Completed));
    }
}
