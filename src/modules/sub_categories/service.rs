use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use stockbay_cache::{MemoryCache, invalidate, keys};

use crate::modules::sub_categories::model::{
    CreateSubCategoryDto, SubCategory, SubCategoryFilterParams, SubCategoryWithContext,
    UpdateSubCategoryDto,
};
use crate::utils::errors::AppError;

const CONTEXT_QUERY: &str = r#"SELECT
        sc.id,
        sc.name,
        sc.description,
        sc.category_id,
        c.name AS category_name,
        COUNT(p.id) AS product_count,
        sc.created_at,
        sc.updated_at
       FROM sub_categories sc
       INNER JOIN categories c ON c.id = sc.category_id
       LEFT JOIN products p ON p.sub_category_id = sc.id"#;

pub struct SubCategoryService;

impl SubCategoryService {
    #[instrument(skip(db, cache, filters), fields(db.operation = "SELECT", db.table = "sub_categories"))]
    pub async fn get_sub_categories(
        db: &PgPool,
        cache: &MemoryCache,
        filters: SubCategoryFilterParams,
    ) -> Result<Vec<SubCategoryWithContext>, AppError> {
        let mut key_params: Vec<(&str, String)> = Vec::new();
        if let Some(category_id) = &filters.category_id {
            key_params.push(("categoryId", category_id.to_string()));
        }
        let cache_key = keys::generate(keys::prefixes::SUB_CATEGORIES, &key_params);

        if let Some(rows) = cache.get::<Vec<SubCategoryWithContext>>(&cache_key).await {
            debug!("Subcategory list served from cache");
            return Ok(rows);
        }

        let mut query = String::from(CONTEXT_QUERY);
        if filters.category_id.is_some() {
            query.push_str(" WHERE sc.category_id = $1");
        }
        query.push_str(" GROUP BY sc.id, c.name ORDER BY sc.name ASC");

        let mut sql = sqlx::query_as::<_, SubCategoryWithContext>(&query);
        if let Some(category_id) = filters.category_id {
            sql = sql.bind(category_id);
        }
        let rows = sql.fetch_all(db).await?;

        if let Err(e) = cache.set(&cache_key, &rows).await {
            warn!(error = %e, "Failed to cache subcategory list");
        }

        Ok(rows)
    }

    #[instrument(skip(db), fields(sub_category.id = %id, db.operation = "SELECT", db.table = "sub_categories"))]
    pub async fn get_sub_category(
        db: &PgPool,
        id: Uuid,
    ) -> Result<SubCategoryWithContext, AppError> {
        let query = format!("{CONTEXT_QUERY} WHERE sc.id = $1 GROUP BY sc.id, c.name");

        let row = sqlx::query_as::<_, SubCategoryWithContext>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("Subcategory not found"))?;

        Ok(row)
    }

    #[instrument(skip(db, cache, dto), fields(sub_category.name = %dto.name, category.id = %dto.category_id, db.operation = "INSERT", db.table = "sub_categories"))]
    pub async fn create_sub_category(
        db: &PgPool,
        cache: &MemoryCache,
        dto: CreateSubCategoryDto,
    ) -> Result<SubCategory, AppError> {
        Self::ensure_category_exists(db, dto.category_id).await?;

        let sub_category = sqlx::query_as::<_, SubCategory>(
            "INSERT INTO sub_categories (name, description, category_id)
             VALUES ($1, $2, $3)
             RETURNING id, name, description, category_id, created_at, updated_at",
        )
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(dto.category_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                warn!(
                    sub_category.name = %dto.name,
                    category.id = %dto.category_id,
                    "Attempted to create duplicate subcategory in category"
                );
                return AppError::already_exists(
                    "A subcategory with this name already exists in this category",
                );
            }
            AppError::from(e)
        })?;

        invalidate::sub_categories(cache).await;

        info!(sub_category.id = %sub_category.id, "Subcategory created");

        Ok(sub_category)
    }

    #[instrument(skip(db, cache, dto), fields(sub_category.id = %id, db.operation = "UPDATE", db.table = "sub_categories"))]
    pub async fn update_sub_category(
        db: &PgPool,
        cache: &MemoryCache,
        id: Uuid,
        dto: UpdateSubCategoryDto,
    ) -> Result<SubCategory, AppError> {
        let existing = sqlx::query_as::<_, SubCategory>(
            "SELECT id, name, description, category_id, created_at, updated_at
             FROM sub_categories
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Subcategory not found"))?;

        if let Some(category_id) = dto.category_id
            && category_id != existing.category_id
        {
            Self::ensure_category_exists(db, category_id).await?;
        }

        let name = dto.name.unwrap_or(existing.name);
        let description = if dto.description.is_some() {
            dto.description
        } else {
            existing.description
        };
        let category_id = dto.category_id.unwrap_or(existing.category_id);

        let sub_category = sqlx::query_as::<_, SubCategory>(
            "UPDATE sub_categories
             SET name = $2, description = $3, category_id = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING id, name, description, category_id, created_at, updated_at",
        )
        .bind(id)
        .bind(&name)
        .bind(&description)
        .bind(category_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::already_exists(
                    "A subcategory with this name already exists in this category",
                );
            }
            AppError::from(e)
        })?;

        invalidate::sub_categories(cache).await;

        info!(sub_category.id = %sub_category.id, "Subcategory updated");

        Ok(sub_category)
    }

    #[instrument(skip(db, cache), fields(sub_category.id = %id, db.operation = "DELETE", db.table = "sub_categories"))]
    pub async fn delete_sub_category(
        db: &PgPool,
        cache: &MemoryCache,
        id: Uuid,
    ) -> Result<(), AppError> {
        let product_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE sub_category_id = $1",
        )
        .bind(id)
        .fetch_one(db)
        .await?;

        if product_count > 0 {
            warn!(
                sub_category.id = %id,
                product_count = %product_count,
                "Refused to delete subcategory with products"
            );
            return Err(
                AppError::validation("Cannot delete a subcategory that still has products")
                    .with_details(serde_json::json!({ "productCount": product_count })),
            );
        }

        let result = sqlx::query("DELETE FROM sub_categories WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Subcategory not found"));
        }

        invalidate::sub_categories(cache).await;

        info!(sub_category.id = %id, "Subcategory deleted");

        Ok(())
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
}
