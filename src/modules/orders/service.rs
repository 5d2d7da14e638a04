use std::time::Duration;

use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use stockbay_cache::{MemoryCache, invalidate, keys};

use crate::modules::exchange_rates::service::ExchangeRateService;
use crate::modules::orders::model::{CreateOrderDto, Order, OrderFilterParams, UpdateOrderDto};
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginatedResponse;

const ORDER_LIST_TTL: Duration = Duration::from_secs(60);

const ORDER_COLUMNS: &str = "id, product_name, quantity, price_rmb, exchange_rate, \
     total_cost_mga, status, order_date, created_at, updated_at";

const SORTABLE_COLUMNS: &[(&str, &str)] = &[
    ("orderDate", "order_date"),
    ("createdAt", "created_at"),
    ("totalCostMGA", "total_cost_mga"),
    ("status", "status"),
];

/// Totals are derived, never accepted from the client.
fn total_cost_mga(price_rmb: f64, exchange_rate: f64, quantity: i32) -> f64 {
    price_rmb * exchange_rate * f64::from(quantity)
}

pub struct OrderService;

impl OrderService {
    #[instrument(skip(db, cache, filters), fields(db.operation = "SELECT", db.table = "orders"))]
    pub async fn get_orders(
        db: &PgPool,
        cache: &MemoryCache,
        filters: OrderFilterParams,
    ) -> Result<PaginatedResponse<Order>, AppError> {
        let page = filters.pagination.page();
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();
        let sort_column = filters
            .pagination
            .sort_column(SORTABLE_COLUMNS, "order_date");
        let sort_order = filters.pagination.sort_order();

        let mut key_params: Vec<(&str, String)> = vec![
            ("page", page.to_string()),
            ("limit", limit.to_string()),
            ("sortBy", sort_column.to_string()),
            ("sortOrder", sort_order.as_sql().to_string()),
        ];
        if let Some(status) = filters.status {
            key_params.push(("status", status.as_str().to_string()));
        }
        let cache_key = keys::generate(keys::prefixes::ORDERS, &key_params);

        if let Some(cached) = cache.get::<PaginatedResponse<Order>>(&cache_key).await {
            debug!("Order list served from cache");
            return Ok(cached);
        }

        let mut where_clause = String::from(" WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(status) = filters.status {
            params.push(status.as_str().to_string());
            where_clause.push_str(&format!(" AND status = ${}::order_status", params.len()));
        }

        let count_query = format!("SELECT COUNT(*) FROM orders{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {ORDER_COLUMNS} FROM orders{where_clause} \
             ORDER BY {sort_column} {} LIMIT {limit} OFFSET {offset}",
            sort_order.as_sql()
        );
        let mut data_sql = sqlx::query_as::<_, Order>(&data_query);
        for param in &params {
            data_sql = data_sql.bind(param);
        }
        let orders = data_sql.fetch_all(db).await?;

        let response = PaginatedResponse::new(orders, total, page, limit);

        if let Err(e) = cache
            .set_with_ttl(&cache_key, &response, ORDER_LIST_TTL)
            .await
        {
            warn!(error = %e, "Failed to cache order list");
        }

        Ok(response)
    }

    #[instrument(skip(db), fields(order.id = %id, db.operation = "SELECT", db.table = "orders"))]
    pub async fn get_order(db: &PgPool, id: Uuid) -> Result<Order, AppError> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");

        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("Order not found"))
    }

    #[instrument(skip(db, cache, dto), fields(order.product_name = %dto.product_name, db.operation = "INSERT", db.table = "orders"))]
    pub async fn create_order(
        db: &PgPool,
        cache: &MemoryCache,
        dto: CreateOrderDto,
    ) -> Result<Order, AppError> {
        let exchange_rate = ExchangeRateService::resolve_rate(db, dto.exchange_rate).await?;
        let total = total_cost_mga(dto.price_rmb, exchange_rate, dto.quantity);

        let query = format!(
            "INSERT INTO orders \
             (product_name, quantity, price_rmb, exchange_rate, total_cost_mga, status, order_date) \
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW())) \
             RETURNING {ORDER_COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(&dto.product_name)
            .bind(dto.quantity)
            .bind(dto.price_rmb)
            .bind(exchange_rate)
            .bind(total)
            .bind(dto.status)
            .bind(dto.order_date)
            .fetch_one(db)
            .await?;

        invalidate::orders(cache).await;

        info!(
            order.id = %order.id,
            order.total_cost_mga = %order.total_cost_mga,
            order.status = %order.status.as_str(),
            "Order created"
        );

        Ok(order)
    }

    #[instrument(skip(db, cache, dto), fields(order.id = %id, db.operation = "UPDATE", db.table = "orders"))]
    pub async fn update_order(
        db: &PgPool,
        cache: &MemoryCache,
        id: Uuid,
        dto: UpdateOrderDto,
    ) -> Result<Order, AppError> {
        let existing = Self::get_order(db, id).await?;

        let product_name = dto.product_name.unwrap_or(existing.product_name);
        let quantity = dto.quantity.unwrap_or(existing.quantity);
        let price_rmb = dto.price_rmb.unwrap_or(existing.price_rmb);
        let exchange_rate = dto.exchange_rate.unwrap_or(existing.exchange_rate);
        let status = dto.status.unwrap_or(existing.status);
        let order_date = dto.order_date.unwrap_or(existing.order_date);
        // The stored total always reflects the merged row, even when only
        // one of the numeric fields changed.
        let total = total_cost_mga(price_rmb, exchange_rate, quantity);

        if status != existing.status {
            info!(
                order.id = %id,
                order.status_from = %existing.status.as_str(),
                order.status_to = %status.as_str(),
                "Order status changed"
            );
        }

        let query = format!(
            "UPDATE orders SET product_name = $2, quantity = $3, price_rmb = $4, \
             exchange_rate = $5, total_cost_mga = $6, status = $7, order_date = $8, \
             updated_at = NOW() \
             WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(&product_name)
            .bind(quantity)
            .bind(price_rmb)
            .bind(exchange_rate)
            .bind(total)
            .bind(status)
            .bind(order_date)
            .fetch_one(db)
            .await?;

        invalidate::orders(cache).await;

        info!(
            order.id = %order.id,
            order.total_cost_mga = %order.total_cost_mga,
            "Order updated"
        );

        Ok(order)
    }

    #[instrument(skip(db, cache), fields(order.id = %id, db.operation = "DELETE", db.table = "orders"))]
    pub async fn delete_order(db: &PgPool, cache: &MemoryCache, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Order not found"));
        }

        invalidate::orders(cache).await;

        info!(order.id = %id, "Order deleted");

        Ok(())
    }
}
