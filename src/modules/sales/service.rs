use std::time::Duration;

use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use stockbay_cache::{MemoryCache, invalidate, keys};

use crate::modules::products::model::EntityRef;
use crate::modules::sales::model::{
    CreateSaleDto, Sale, SaleFilterParams, SaleWithProduct, UpdateSaleDto,
};
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginatedResponse;

const SALE_LIST_TTL: Duration = Duration::from_secs(60);

const SALE_COLUMNS: &str =
    "id, product_id, quantity, price_mga, total_revenue, sale_date, created_at, updated_at";

const JOINED_COLUMNS: &str = "s.id, s.product_id, s.quantity, s.price_mga, s.total_revenue, \
     s.sale_date, s.created_at, s.updated_at, p.name AS product_name";

const SORTABLE_COLUMNS: &[(&str, &str)] = &[
    ("saleDate", "s.sale_date"),
    ("createdAt", "s.created_at"),
    ("totalRevenue", "s.total_revenue"),
    ("quantity", "s.quantity"),
];

#[derive(sqlx::FromRow)]
struct SaleProductRow {
    #[sqlx(flatten)]
    sale: Sale,
    product_name: String,
}

impl From<SaleProductRow> for SaleWithProduct {
    fn from(row: SaleProductRow) -> Self {
        let product = EntityRef {
            id: row.sale.product_id,
            name: row.product_name,
        };
        SaleWithProduct {
            sale: row.sale,
            product,
        }
    }
}

/// Totals are derived, never accepted from the client.
fn total_revenue(price_mga: f64, quantity: i32) -> f64 {
    price_mga * f64::from(quantity)
}

pub struct SaleService;

impl SaleService {
    #[instrument(skip(db, cache, filters), fields(db.operation = "SELECT", db.table = "sales"))]
    pub async fn get_sales(
        db: &PgPool,
        cache: &MemoryCache,
        filters: SaleFilterParams,
    ) -> Result<PaginatedResponse<SaleWithProduct>, AppError> {
        let page = filters.pagination.page();
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();
        let sort_column = filters
            .pagination
            .sort_column(SORTABLE_COLUMNS, "s.sale_date");
        let sort_order = filters.pagination.sort_order();

        let mut key_params: Vec<(&str, String)> = vec![
            ("page", page.to_string()),
            ("limit", limit.to_string()),
            ("sortBy", sort_column.to_string()),
            ("sortOrder", sort_order.as_sql().to_string()),
        ];
        if let Some(product_id) = &filters.product_id {
            key_params.push(("productId", product_id.to_string()));
        }
        let cache_key = keys::generate(keys::prefixes::SALES, &key_params);

        if let Some(cached) = cache
            .get::<PaginatedResponse<SaleWithProduct>>(&cache_key)
            .await
        {
            debug!("Sale list served from cache");
            return Ok(cached);
        }

        let mut where_clause = String::from(" WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(product_id) = filters.product_id {
            params.push(product_id.to_string());
            where_clause.push_str(&format!(" AND s.product_id = ${}::uuid", params.len()));
        }

        let count_query = format!("SELECT COUNT(*) FROM sales s{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {JOINED_COLUMNS} FROM sales s \
             INNER JOIN products p ON p.id = s.product_id{where_clause} \
             ORDER BY {sort_column} {} LIMIT {limit} OFFSET {offset}",
            sort_order.as_sql()
        );
        let mut data_sql = sqlx::query_as::<_, SaleProductRow>(&data_query);
        for param in &params {
            data_sql = data_sql.bind(param);
        }
        let rows = data_sql.fetch_all(db).await?;

        let data = rows.into_iter().map(SaleWithProduct::from).collect();
        let response = PaginatedResponse::new(data, total, page, limit);

        if let Err(e) = cache.set_with_ttl(&cache_key, &response, SALE_LIST_TTL).await {
            warn!(error = %e, "Failed to cache sale list");
        }

        Ok(response)
    }

    #[instrument(skip(db), fields(sale.id = %id, db.operation = "SELECT", db.table = "sales"))]
    pub async fn get_sale(db: &PgPool, id: Uuid) -> Result<SaleWithProduct, AppError> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM sales s \
             INNER JOIN products p ON p.id = s.product_id \
             WHERE s.id = $1"
        );

        let row = sqlx::query_as::<_, SaleProductRow>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("Sale not found"))?;

        Ok(row.into())
    }

    #[instrument(skip(db, cache, dto), fields(product.id = %dto.product_id, db.operation = "INSERT", db.table = "sales"))]
    pub async fn create_sale(
        db: &PgPool,
        cache: &MemoryCache,
        dto: CreateSaleDto,
    ) -> Result<Sale, AppError> {
        Self::ensure_product_exists(db, dto.product_id).await?;

        // Stock is advisory: an oversell is logged, not blocked.
        let stock = Self::current_stock(db, dto.product_id).await?;
        if i64::from(dto.quantity) > stock {
            warn!(
                product.id = %dto.product_id,
                sale.quantity = %dto.quantity,
                product.stock = %stock,
                "Sale exceeds recorded stock"
            );
        }

        let total = total_revenue(dto.price_mga, dto.quantity);

        let query = format!(
            "INSERT INTO sales (product_id, quantity, price_mga, total_revenue, sale_date) \
             VALUES ($1, $2, $3, $4, COALESCE($5, NOW())) \
             RETURNING {SALE_COLUMNS}"
        );
        let sale = sqlx::query_as::<_, Sale>(&query)
            .bind(dto.product_id)
            .bind(dto.quantity)
            .bind(dto.price_mga)
            .bind(total)
            .bind(dto.sale_date)
            .fetch_one(db)
            .await?;

        invalidate::sales(cache).await;

        info!(
            sale.id = %sale.id,
            sale.total_revenue = %sale.total_revenue,
            "Sale recorded"
        );

        Ok(sale)
    }

    #[instrument(skip(db, cache, dto), fields(sale.id = %id, db.operation = "UPDATE", db.table = "sales"))]
    pub async fn update_sale(
        db: &PgPool,
        cache: &MemoryCache,
        id: Uuid,
        dto: UpdateSaleDto,
    ) -> Result<Sale, AppError> {
        let existing = Self::fetch_sale(db, id).await?;

        if let Some(product_id) = dto.product_id
            && product_id != existing.product_id
        {
            Self::ensure_product_exists(db, product_id).await?;
        }

        let product_id = dto.product_id.unwrap_or(existing.product_id);
        let quantity = dto.quantity.unwrap_or(existing.quantity);
        let price_mga = dto.price_mga.unwrap_or(existing.price_mga);
        let sale_date = dto.sale_date.unwrap_or(existing.sale_date);
        // The stored total always reflects the merged row.
        let total = total_revenue(price_mga, quantity);

        let query = format!(
            "UPDATE sales SET product_id = $2, quantity = $3, price_mga = $4, \
             total_revenue = $5, sale_date = $6, updated_at = NOW() \
             WHERE id = $1 RETURNING {SALE_COLUMNS}"
        );
        let sale = sqlx::query_as::<_, Sale>(&query)
            .bind(id)
            .bind(product_id)
            .bind(quantity)
            .bind(price_mga)
            .bind(total)
            .bind(sale_date)
            .fetch_one(db)
            .await?;

        invalidate::sales(cache).await;

        info!(
            sale.id = %sale.id,
            sale.total_revenue = %sale.total_revenue,
            "Sale updated"
        );

        Ok(sale)
    }

    #[instrument(skip(db, cache), fields(sale.id = %id, db.operation = "DELETE", db.table = "sales"))]
    pub async fn delete_sale(db: &PgPool, cache: &MemoryCache, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Sale not found"));
        }

        invalidate::sales(cache).await;

        info!(sale.id = %id, "Sale deleted");

        Ok(())
    }

    /// Units purchased minus units sold, from the transaction history.
    async fn current_stock(db: &PgPool, product_id: Uuid) -> Result<i64, AppError> {
        let stock = sqlx::query_scalar::<_, i64>(
            "SELECT (COALESCE((SELECT SUM(quantity) FROM purchases WHERE product_id = $1), 0) - \
                     COALESCE((SELECT SUM(quantity) FROM sales WHERE product_id = $1), 0))::BIGINT",
        )
        .bind(product_id)
        .fetch_one(db)
        .await?;

        Ok(stock)
    }

    async fn fetch_sale(db: &PgPool, id: Uuid) -> Result<Sale, AppError> {
        let query = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = $1");

        sqlx::query_as::<_, Sale>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("Sale not found"))
    }

    async fn ensure_product_exists(db: &PgPool, product_id: Uuid) -> Result<(), AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(db)
                .await?;

        if !exists {
            return Err(AppError::not_found("Product not found"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_revenue_is_price_times_quantity() {
        assert_eq!(total_revenue(3_000_000.0, 3), 9_000_000.0);
    }

    #[test]
    fn test_total_revenue_single_unit() {
        assert_eq!(total_revenue(1_499_999.5, 1), 1_499_999.5);
    }
}
