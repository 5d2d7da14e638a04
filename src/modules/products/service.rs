use std::collections::{HashMap, HashSet};
use std::time::Duration;

use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use stockbay_cache::{MemoryCache, invalidate, keys};

use crate::modules::products::model::{
    CreateProductDto, EntityRef, Product, ProductDetail, ProductFilterParams, ProductWithRefs,
    ProfitReport, UpdateProductDto,
};
use crate::modules::purchases::model::Purchase;
use crate::modules::sales::model::Sale;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginatedResponse;

/// Product lists change often enough that they expire faster than the
/// cache-wide default.
const PRODUCT_LIST_TTL: Duration = Duration::from_secs(120);

const PRODUCT_COLUMNS: &str = "id, name, description, category_id, sub_category_id, color, \
     storage, model, battery, sim_type, condition, ram, processor, screen_size, graphics, \
     created_at, updated_at";

const SORTABLE_COLUMNS: &[(&str, &str)] = &[
    ("name", "name"),
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
];

pub struct ProductService;

impl ProductService {
    #[instrument(skip(db, cache, filters), fields(db.operation = "SELECT", db.table = "products"))]
    pub async fn get_products(
        db: &PgPool,
        cache: &MemoryCache,
        filters: ProductFilterParams,
    ) -> Result<PaginatedResponse<ProductWithRefs>, AppError> {
        let page = filters.pagination.page();
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();
        let sort_column = filters.pagination.sort_column(SORTABLE_COLUMNS, "created_at");
        let sort_order = filters.pagination.sort_order();

        let mut key_params: Vec<(&str, String)> = vec![
            ("page", page.to_string()),
            ("limit", limit.to_string()),
            ("sortBy", sort_column.to_string()),
            ("sortOrder", sort_order.as_sql().to_string()),
        ];
        if let Some(category_id) = &filters.category_id {
            key_params.push(("categoryId", category_id.to_string()));
        }
        if let Some(sub_category_id) = &filters.sub_category_id {
            key_params.push(("subCategoryId", sub_category_id.to_string()));
        }
        if let Some(search) = &filters.search {
            key_params.push(("search", search.clone()));
        }
        let cache_key = keys::generate(keys::prefixes::PRODUCTS, &key_params);

        if let Some(cached) = cache
            .get::<PaginatedResponse<ProductWithRefs>>(&cache_key)
            .await
        {
            debug!("Product list served from cache");
            return Ok(cached);
        }

        let mut where_clause = String::from(" WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(category_id) = filters.category_id {
            params.push(category_id.to_string());
            where_clause.push_str(&format!(" AND category_id = ${}::uuid", params.len()));
        }

        if let Some(sub_category_id) = filters.sub_category_id {
            params.push(sub_category_id.to_string());
            where_clause.push_str(&format!(" AND sub_category_id = ${}::uuid", params.len()));
        }

        if let Some(search) = &filters.search
            && !search.trim().is_empty()
        {
            params.push(format!("%{}%", search.trim()));
            // A single bound pattern, referenced twice.
            where_clause.push_str(&format!(
                " AND (name ILIKE ${n} OR model ILIKE ${n})",
                n = params.len()
            ));
        }

        let count_query = format!("SELECT COUNT(*) FROM products{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products{where_clause} \
             ORDER BY {sort_column} {} LIMIT {limit} OFFSET {offset}",
            sort_order.as_sql()
        );
        let mut data_sql = sqlx::query_as::<_, Product>(&data_query);
        for param in &params {
            data_sql = data_sql.bind(param);
        }
        let products = data_sql.fetch_all(db).await?;

        let rows = Self::attach_refs(db, products).await?;
        let response = PaginatedResponse::new(rows, total, page, limit);

        if let Err(e) = cache
            .set_with_ttl(&cache_key, &response, PRODUCT_LIST_TTL)
            .await
        {
            warn!(error = %e, "Failed to cache product list");
        }

        Ok(response)
    }

    #[instrument(skip(db), fields(product.id = %id, db.operation = "SELECT", db.table = "products"))]
    pub async fn get_product(db: &PgPool, id: Uuid) -> Result<ProductDetail, AppError> {
        let product = Self::fetch_product(db, id).await?;

        let category =
            sqlx::query_as::<_, EntityRef>("SELECT id, name FROM categories WHERE id = $1")
                .bind(product.category_id)
                .fetch_optional(db)
                .await?;

        let sub_category = if let Some(sub_category_id) = product.sub_category_id {
            sqlx::query_as::<_, EntityRef>("SELECT id, name FROM sub_categories WHERE id = $1")
                .bind(sub_category_id)
                .fetch_optional(db)
                .await?
        } else {
            None
        };

        let purchases = sqlx::query_as::<_, Purchase>(
            "SELECT id, product_id, quantity, price_rmb, exchange_rate, total_cost_mga, \
             purchase_date, created_at, updated_at \
             FROM purchases WHERE product_id = $1 ORDER BY purchase_date DESC",
        )
        .bind(id)
        .fetch_all(db)
        .await?;

        let sales = sqlx::query_as::<_, Sale>(
            "SELECT id, product_id, quantity, price_mga, total_revenue, sale_date, \
             created_at, updated_at \
             FROM sales WHERE product_id = $1 ORDER BY sale_date DESC",
        )
        .bind(id)
        .fetch_all(db)
        .await?;

        Ok(ProductDetail {
            product,
            category,
            sub_category,
            purchases,
            sales,
        })
    }

    #[instrument(skip(db, cache, dto), fields(product.name = %dto.name, db.operation = "INSERT", db.table = "products"))]
    pub async fn create_product(
        db: &PgPool,
        cache: &MemoryCache,
        dto: CreateProductDto,
    ) -> Result<Product, AppError> {
        Self::ensure_category_exists(db, dto.category_id).await?;
        if let Some(sub_category_id) = dto.sub_category_id {
            Self::ensure_sub_category_exists(db, sub_category_id).await?;
        }

        let query = format!(
            "INSERT INTO products (name, description, category_id, sub_category_id, color, \
             storage, model, battery, sim_type, condition, ram, processor, screen_size, graphics) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(&dto.name)
            .bind(&dto.description)
            .bind(dto.category_id)
            .bind(dto.sub_category_id)
            .bind(&dto.color)
            .bind(&dto.storage)
            .bind(&dto.model)
            .bind(&dto.battery)
            .bind(&dto.sim_type)
            .bind(&dto.condition)
            .bind(&dto.ram)
            .bind(&dto.processor)
            .bind(&dto.screen_size)
            .bind(&dto.graphics)
            .fetch_one(db)
            .await?;

        invalidate::products(cache).await;
        // Category trees and subcategory rows embed product counts.
        invalidate::categories(cache).await;

        info!(product.id = %product.id, "Product created");

        Ok(product)
    }

    #[instrument(skip(db, cache, dto), fields(product.id = %id, db.operation = "UPDATE", db.table = "products"))]
    pub async fn update_product(
        db: &PgPool,
        cache: &MemoryCache,
        id: Uuid,
        dto: UpdateProductDto,
    ) -> Result<Product, AppError> {
        if let Some(category_id) = dto.category_id {
            Self::ensure_category_exists(db, category_id).await?;
        }
        if let Some(sub_category_id) = dto.sub_category_id {
            Self::ensure_sub_category_exists(db, sub_category_id).await?;
        }

        // Absent fields keep their stored value; COALESCE merges in SQL so
        // the row is read and written in one statement.
        let query = format!(
            "UPDATE products SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                category_id = COALESCE($4, category_id), \
                sub_category_id = COALESCE($5, sub_category_id), \
                color = COALESCE($6, color), \
                storage = COALESCE($7, storage), \
                model = COALESCE($8, model), \
                battery = COALESCE($9, battery), \
                sim_type = COALESCE($10, sim_type), \
                condition = COALESCE($11, condition), \
                ram = COALESCE($12, ram), \
                processor = COALESCE($13, processor), \
                screen_size = COALESCE($14, screen_size), \
                graphics = COALESCE($15, graphics), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(&dto.name)
            .bind(&dto.description)
            .bind(dto.category_id)
            .bind(dto.sub_category_id)
            .bind(&dto.color)
            .bind(&dto.storage)
            .bind(&dto.model)
            .bind(&dto.battery)
            .bind(&dto.sim_type)
            .bind(&dto.condition)
            .bind(&dto.ram)
            .bind(&dto.processor)
            .bind(&dto.screen_size)
            .bind(&dto.graphics)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("Product not found"))?;

        invalidate::products(cache).await;
        invalidate::categories(cache).await;

        info!(product.id = %product.id, "Product updated");

        Ok(product)
    }

    #[instrument(skip(db, cache), fields(product.id = %id, db.operation = "DELETE", db.table = "products"))]
    pub async fn delete_product(
        db: &PgPool,
        cache: &MemoryCache,
        id: Uuid,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Product not found"));
        }

        invalidate::products(cache).await;
        invalidate::categories(cache).await;
        // Purchase and sale rows cascade away with the product.
        invalidate::purchases(cache).await;
        invalidate::sales(cache).await;

        info!(product.id = %id, "Product deleted");

        Ok(())
    }

    #[instrument(skip(db), fields(product.id = %id, db.operation = "SELECT", db.table = "purchases,sales"))]
    pub async fn get_profit_report(db: &PgPool, id: Uuid) -> Result<ProfitReport, AppError> {
        let product = Self::fetch_product(db, id).await?;

        let (total_cost, total_purchased) = sqlx::query_as::<_, (f64, i64)>(
            "SELECT COALESCE(SUM(total_cost_mga), 0)::DOUBLE PRECISION, \
                    COALESCE(SUM(quantity), 0)::BIGINT \
             FROM purchases WHERE product_id = $1",
        )
        .bind(id)
        .fetch_one(db)
        .await?;

        let (total_revenue, total_sold) = sqlx::query_as::<_, (f64, i64)>(
            "SELECT COALESCE(SUM(total_revenue), 0)::DOUBLE PRECISION, \
                    COALESCE(SUM(quantity), 0)::BIGINT \
             FROM sales WHERE product_id = $1",
        )
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(ProfitReport {
            product_id: product.id,
            product_name: product.name,
            total_cost,
            total_revenue,
            profit: total_revenue - total_cost,
            total_purchased,
            total_sold,
            stock: total_purchased - total_sold,
        })
    }

    /// Resolves category and subcategory refs for a page of products with
    /// two bulk lookups instead of one query per row.
    async fn attach_refs(
        db: &PgPool,
        products: Vec<Product>,
    ) -> Result<Vec<ProductWithRefs>, AppError> {
        let category_ids: Vec<Uuid> = products
            .iter()
            .map(|p| p.category_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let sub_category_ids: Vec<Uuid> = products
            .iter()
            .filter_map(|p| p.sub_category_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let categories: HashMap<Uuid, String> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            sqlx::query_as::<_, EntityRef>("SELECT id, name FROM categories WHERE id = ANY($1)")
                .bind(&category_ids)
                .fetch_all(db)
                .await?
                .into_iter()
                .map(|r| (r.id, r.name))
                .collect()
        };

        let sub_categories: HashMap<Uuid, String> = if sub_category_ids.is_empty() {
            HashMap::new()
        } else {
            sqlx::query_as::<_, EntityRef>(
                "SELECT id, name FROM sub_categories WHERE id = ANY($1)",
            )
            .bind(&sub_category_ids)
            .fetch_all(db)
            .await?
            .into_iter()
            .map(|r| (r.id, r.name))
            .collect()
        };

        let rows = products
            .into_iter()
            .map(|product| {
                let category = categories.get(&product.category_id).map(|name| EntityRef {
                    id: product.category_id,
                    name: name.clone(),
                });
                let sub_category = product.sub_category_id.and_then(|id| {
                    sub_categories.get(&id).map(|name| EntityRef {
                        id,
                        name: name.clone(),
                    })
                });
                ProductWithRefs {
                    product,
                    category,
                    sub_category,
                }
            })
            .collect();

        Ok(rows)
    }

    async fn fetch_product(db: &PgPool, id: Uuid) -> Result<Product, AppError> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");

        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("Product not found"))
    }

    async fn ensure_category_exists(db: &PgPool, category_id: Uuid) -> Result<(), AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(category_id)
                .fetch_one(db)
                .await?;

        if !exists {
            return Err(AppError::not_found("Category not found"));
        }

        Ok(())
    }

    async fn ensure_sub_category_exists(
        db: &PgPool,
        sub_category_id: Uuid,
    ) -> Result<(), AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM sub_categories WHERE id = $1)",
        )
        .bind(sub_category_id)
        .fetch_one(db)
        .await?;

        if !exists {
            return Err(AppError::not_found("Subcategory not found"));
        }

        Ok(())
    }
}
