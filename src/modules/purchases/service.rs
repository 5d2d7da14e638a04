use std::time::Duration;

use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use stockbay_cache::{MemoryCache, invalidate, keys};

use crate::modules::exchange_rates::service::ExchangeRateService;
use crate::modules::products::model::EntityRef;
use crate::modules::purchases::model::{
    CreatePurchaseDto, Purchase, PurchaseFilterParams, PurchaseWithProduct, UpdatePurchaseDto,
};
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginatedResponse;

/// Purchases are recorded continuously during restocks, so their lists get
/// the short TTL.
const PURCHASE_LIST_TTL: Duration = Duration::from_secs(60);

const PURCHASE_COLUMNS: &str = "id, product_id, quantity, price_rmb, exchange_rate, \
     total_cost_mga, purchase_date, created_at, updated_at";

const JOINED_COLUMNS: &str = "pu.id, pu.product_id, pu.quantity, pu.price_rmb, \
     pu.exchange_rate, pu.total_cost_mga, pu.purchase_date, pu.created_at, pu.updated_at, \
     p.name AS product_name";

const SORTABLE_COLUMNS: &[(&str, &str)] = &[
    ("purchaseDate", "pu.purchase_date"),
    ("createdAt", "pu.created_at"),
    ("totalCostMGA", "pu.total_cost_mga"),
    ("quantity", "pu.quantity"),
];

#[derive(sqlx::FromRow)]
struct PurchaseProductRow {
    #[sqlx(flatten)]
    purchase: Purchase,
    product_name: String,
}

impl From<PurchaseProductRow> for PurchaseWithProduct {
    fn from(row: PurchaseProductRow) -> Self {
        let product = EntityRef {
            id: row.purchase.product_id,
            name: row.product_name,
        };
        PurchaseWithProduct {
            purchase: row.purchase,
            product,
        }
    }
}

/// Totals are derived, never accepted from the client.
fn total_cost_mga(price_rmb: f64, exchange_rate: f64, quantity: i32) -> f64 {
    price_rmb * exchange_rate * f64::from(quantity)
}

pub struct PurchaseService;

impl PurchaseService {
    #[instrument(skip(db, cache, filters), fields(db.operation = "SELECT", db.table = "purchases"))]
    pub async fn get_purchases(
        db: &PgPool,
        cache: &MemoryCache,
        filters: PurchaseFilterParams,
    ) -> Result<PaginatedResponse<PurchaseWithProduct>, AppError> {
        let page = filters.pagination.page();
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();
        let sort_column = filters
            .pagination
            .sort_column(SORTABLE_COLUMNS, "pu.purchase_date");
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
        let cache_key = keys::generate(keys::prefixes::PURCHASES, &key_params);

        if let Some(cached) = cache
            .get::<PaginatedResponse<PurchaseWithProduct>>(&cache_key)
            .await
        {
            debug!("Purchase list served from cache");
            return Ok(cached);
        }

        let mut where_clause = String::from(" WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(product_id) = filters.product_id {
            params.push(product_id.to_string());
            where_clause.push_str(&format!(" AND pu.product_id = ${}::uuid", params.len()));
        }

        let count_query = format!("SELECT COUNT(*) FROM purchases pu{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {JOINED_COLUMNS} FROM purchases pu \
             INNER JOIN products p ON p.id = pu.product_id{where_clause} \
             ORDER BY {sort_column} {} LIMIT {limit} OFFSET {offset}",
            sort_order.as_sql()
        );
        let mut data_sql = sqlx::query_as::<_, PurchaseProductRow>(&data_query);
        for param in &params {
            data_sql = data_sql.bind(param);
        }
        let rows = data_sql.fetch_all(db).await?;

        let data = rows.into_iter().map(PurchaseWithProduct::from).collect();
        let response = PaginatedResponse::new(data, total, page, limit);

        if let Err(e) = cache
            .set_with_ttl(&cache_key, &response, PURCHASE_LIST_TTL)
            .await
        {
            warn!(error = %e, "Failed to cache purchase list");
        }

        Ok(response)
    }

    #[instrument(skip(db), fields(purchase.id = %id, db.operation = "SELECT", db.table = "purchases"))]
    pub async fn get_purchase(db: &PgPool, id: Uuid) -> Result<PurchaseWithProduct, AppError> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM purchases pu \
             INNER JOIN products p ON p.id = pu.product_id \
             WHERE pu.id = $1"
        );

        let row = sqlx::query_as::<_, PurchaseProductRow>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("Purchase not found"))?;

        Ok(row.into())
    }

    #[instrument(skip(db, cache, dto), fields(product.id = %dto.product_id, db.operation = "INSERT", db.table = "purchases"))]
    pub async fn create_purchase(
        db: &PgPool,
        cache: &MemoryCache,
        dto: CreatePurchaseDto,
    ) -> Result<Purchase, AppError> {
        Self::ensure_product_exists(db, dto.product_id).await?;

        let exchange_rate = ExchangeRateService::resolve_rate(db, dto.exchange_rate).await?;
        let total = total_cost_mga(dto.price_rmb, exchange_rate, dto.quantity);

        let query = format!(
            "INSERT INTO purchases \
             (product_id, quantity, price_rmb, exchange_rate, total_cost_mga, purchase_date) \
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW())) \
             RETURNING {PURCHASE_COLUMNS}"
        );
        let purchase = sqlx::query_as::<_, Purchase>(&query)
            .bind(dto.product_id)
            .bind(dto.quantity)
            .bind(dto.price_rmb)
            .bind(exchange_rate)
            .bind(total)
            .bind(dto.purchase_date)
            .fetch_one(db)
            .await?;

        invalidate::purchases(cache).await;

        info!(
            purchase.id = %purchase.id,
            purchase.total_cost_mga = %purchase.total_cost_mga,
            "Purchase recorded"
        );

        Ok(purchase)
    }

    #[instrument(skip(db, cache, dto), fields(purchase.id = %id, db.operation = "UPDATE", db.table = "purchases"))]
    pub async fn update_purchase(
        db: &PgPool,
        cache: &MemoryCache,
        id: Uuid,
        dto: UpdatePurchaseDto,
    ) -> Result<Purchase, AppError> {
        let existing = Self::fetch_purchase(db, id).await?;

        if let Some(product_id) = dto.product_id
            && product_id != existing.product_id
        {
            Self::ensure_product_exists(db, product_id).await?;
        }

        let product_id = dto.product_id.unwrap_or(existing.product_id);
        let quantity = dto.quantity.unwrap_or(existing.quantity);
        let price_rmb = dto.price_rmb.unwrap_or(existing.price_rmb);
        let exchange_rate = dto.exchange_rate.unwrap_or(existing.exchange_rate);
        let purchase_date = dto.purchase_date.unwrap_or(existing.purchase_date);
        // The stored total always reflects the merged row.
        let total = total_cost_mga(price_rmb, exchange_rate, quantity);

        let query = format!(
            "UPDATE purchases SET product_id = $2, quantity = $3, price_rmb = $4, \
             exchange_rate = $5, total_cost_mga = $6, purchase_date = $7, updated_at = NOW() \
             WHERE id = $1 RETURNING {PURCHASE_COLUMNS}"
        );
        let purchase = sqlx::query_as::<_, Purchase>(&query)
            .bind(id)
            .bind(product_id)
            .bind(quantity)
            .bind(price_rmb)
            .bind(exchange_rate)
            .bind(total)
            .bind(purchase_date)
            .fetch_one(db)
            .await?;

        invalidate::purchases(cache).await;

        info!(
            purchase.id = %purchase.id,
            purchase.total_cost_mga = %purchase.total_cost_mga,
            "Purchase updated"
        );

        Ok(purchase)
    }

    #[instrument(skip(db, cache), fields(purchase.id = %id, db.operation = "DELETE", db.table = "purchases"))]
    pub async fn delete_purchase(
        db: &PgPool,
        cache: &MemoryCache,
        id: Uuid,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM purchases WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Purchase not found"));
        }

        invalidate::purchases(cache).await;

        info!(purchase.id = %id, "Purchase deleted");

        Ok(())
    }

    async fn fetch_purchase(db: &PgPool, id: Uuid) -> Result<Purchase, AppError> {
        let query = format!("SELECT {PURCHASE_COLUMNS} FROM purchases WHERE id = $1");

        sqlx::query_as::<_, Purchase>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("Purchase not found"))
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
