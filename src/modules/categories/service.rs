use std::collections::HashMap;

use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use stockbay_cache::{MemoryCache, invalidate, keys};

use crate::modules::categories::model::{
    Category, CategoryWithChildren, CreateCategoryDto, SubCategorySummary, UpdateCategoryDto,
};
use crate::utils::errors::AppError;

#[derive(sqlx::FromRow)]
struct SubCategoryRow {
    id: Uuid,
    category_id: Uuid,
    name: String,
    description: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ProductCountRow {
    category_id: Uuid,
    count: i64,
}

pub struct CategoryService;

impl CategoryService {
    #[instrument(skip(db, cache), fields(db.operation = "SELECT", db.table = "categories"))]
    pub async fn get_categories(
        db: &PgPool,
        cache: &MemoryCache,
    ) -> Result<Vec<CategoryWithChildren>, AppError> {
        let cache_key = keys::generate(keys::prefixes::CATEGORIES, &[]);

        if let Some(categories) = cache.get::<Vec<CategoryWithChildren>>(&cache_key).await {
            debug!("Category tree served from cache");
            return Ok(categories);
        }

        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, field_config, created_at, updated_at
             FROM categories
             ORDER BY name ASC",
        )
        .fetch_all(db)
        .await?;

        // Children and counts arrive in two bulk queries and are stitched
        // together here, instead of one query per category.
        let sub_rows = sqlx::query_as::<_, SubCategoryRow>(
            "SELECT id, category_id, name, description FROM sub_categories ORDER BY name ASC",
        )
        .fetch_all(db)
        .await?;

        let count_rows = sqlx::query_as::<_, ProductCountRow>(
            "SELECT category_id, COUNT(*) AS count FROM products GROUP BY category_id",
        )
        .fetch_all(db)
        .await?;

        let mut children: HashMap<Uuid, Vec<SubCategorySummary>> = HashMap::new();
        for row in sub_rows {
            children
                .entry(row.category_id)
                .or_default()
                .push(SubCategorySummary {
                    id: row.id,
                    name: row.name,
                    description: row.description,
                });
        }

        let counts: HashMap<Uuid, i64> = count_rows
            .into_iter()
            .map(|row| (row.category_id, row.count))
            .collect();

        let trees: Vec<CategoryWithChildren> = categories
            .into_iter()
            .map(|category| {
                let sub_categories = children.remove(&category.id).unwrap_or_default();
                let product_count = counts.get(&category.id).copied().unwrap_or(0);
                CategoryWithChildren::from_parts(category, sub_categories, product_count)
            })
            .collect();

        if let Err(e) = cache.set(&cache_key, &trees).await {
            warn!(error = %e, "Failed to cache category tree");
        }

        Ok(trees)
    }

    #[instrument(skip(db), fields(category.id = %id, db.operation = "SELECT", db.table = "categories"))]
    pub async fn get_category(db: &PgPool, id: Uuid) -> Result<CategoryWithChildren, AppError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, field_config, created_at, updated_at
             FROM categories
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Category not found"))?;

        let sub_categories = sqlx::query_as::<_, SubCategoryRow>(
            "SELECT id, category_id, name, description
             FROM sub_categories
             WHERE category_id = $1
             ORDER BY name ASC",
        )
        .bind(id)
        .fetch_all(db)
        .await?
        .into_iter()
        .map(|row| SubCategorySummary {
            id: row.id,
            name: row.name,
            description: row.description,
        })
        .collect();

        let product_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE category_id = $1")
                .bind(id)
                .fetch_one(db)
                .await?;

        Ok(CategoryWithChildren::from_parts(
            category,
            sub_categories,
            product_count,
        ))
    }

    #[instrument(skip(db, cache, dto), fields(category.name = %dto.name, db.operation = "INSERT", db.table = "categories"))]
    pub async fn create_category(
        db: &PgPool,
        cache: &MemoryCache,
        dto: CreateCategoryDto,
    ) -> Result<Category, AppError> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, description, field_config)
             VALUES ($1, $2, $3)
             RETURNING id, name, description, field_config, created_at, updated_at",
        )
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(&dto.field_config)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                warn!(category.name = %dto.name, "Attempted to create category with existing name");
                return AppError::already_exists("A category with this name already exists");
            }
            AppError::from(e)
        })?;

        invalidate::categories(cache).await;

        info!(category.id = %category.id, category.name = %category.name, "Category created");

        Ok(category)
    }

    #[instrument(skip(db, cache, dto), fields(category.id = %id, db.operation = "UPDATE", db.table = "categories"))]
    pub async fn update_category(
        db: &PgPool,
        cache: &MemoryCache,
        id: Uuid,
        dto: UpdateCategoryDto,
    ) -> Result<Category, AppError> {
        let existing = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, field_config, created_at, updated_at
             FROM categories
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Category not found"))?;

        let name = dto.name.unwrap_or(existing.name);
        let description = if dto.description.is_some() {
            dto.description
        } else {
            existing.description
        };
        let field_config = if dto.field_config.is_some() {
            dto.field_config
        } else {
            existing.field_config
        };

        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories
             SET name = $2, description = $3, field_config = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING id, name, description, field_config, created_at, updated_at",
        )
        .bind(id)
        .bind(&name)
        .bind(&description)
        .bind(&field_config)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::already_exists("A category with this name already exists");
            }
            AppError::from(e)
        })?;

        invalidate::categories(cache).await;

        info!(category.id = %category.id, "Category updated");

        Ok(category)
    }

    #[instrument(skip(db, cache), fields(category.id = %id, db.operation = "DELETE", db.table = "categories"))]
    pub async fn delete_category(
        db: &PgPool,
        cache: &MemoryCache,
        id: Uuid,
    ) -> Result<(), AppError> {
        let product_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE category_id = $1")
                .bind(id)
                .fetch_one(db)
                .await?;

        let sub_category_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sub_categories WHERE category_id = $1",
        )
        .bind(id)
        .fetch_one(db)
        .await?;

        if product_count > 0 || sub_category_count > 0 {
            warn!(
                category.id = %id,
                product_count = %product_count,
                sub_category_count = %sub_category_count,
                "Refused to delete category with children"
            );
            return Err(AppError::validation(
                "Cannot delete a category that still has products or subcategories",
            )
            .with_details(serde_json::json!({
                "productCount": product_count,
                "subCategoryCount": sub_category_count,
            })));
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Category not found"));
        }

        invalidate::categories(cache).await;

        info!(category.id = %id, "Category deleted");

        Ok(())
    }
}
