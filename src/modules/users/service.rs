use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use stockbay_cache::{MemoryCache, invalidate, keys};

use crate::modules::users::model::{CreateUserDto, UpdateUserDto, User};
use crate::utils::errors::AppError;
use crate::utils::password::hash_password;

pub struct UserService;

impl UserService {
    #[instrument(skip(db, cache), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn get_users(db: &PgPool, cache: &MemoryCache) -> Result<Vec<User>, AppError> {
        let cache_key = keys::generate(keys::prefixes::USERS, &[]);

        if let Some(users) = cache.get::<Vec<User>>(&cache_key).await {
            debug!("Users list served from cache");
            return Ok(users);
        }

        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, created_at, updated_at
             FROM users
             ORDER BY created_at DESC",
        )
        .fetch_all(db)
        .await?;

        if let Err(e) = cache.set(&cache_key, &users).await {
            warn!(error = %e, "Failed to cache users list");
        }

        Ok(users)
    }

    #[instrument(skip(db, cache, dto), fields(user.email = %dto.email, db.operation = "INSERT", db.table = "users"))]
    pub async fn create_user(
        db: &PgPool,
        cache: &MemoryCache,
        dto: CreateUserDto,
    ) -> Result<User, AppError> {
        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password, role)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, email, role, created_at, updated_at",
        )
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(dto.role)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                warn!(user.email = %dto.email, "Attempted to create user with existing email");
                return AppError::already_exists("A user with this email already exists");
            }
            AppError::from(e)
        })?;

        invalidate::users(cache).await;

        info!(user.id = %user.id, user.role = %user.role.as_str(), "User created");

        Ok(user)
    }

    #[instrument(skip(db), fields(user.id = %id, db.operation = "SELECT", db.table = "users"))]
    pub async fn get_user(db: &PgPool, id: Uuid) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

        Ok(user)
    }

    #[instrument(skip(db, cache, dto), fields(user.id = %id, db.operation = "UPDATE", db.table = "users"))]
    pub async fn update_user(
        db: &PgPool,
        cache: &MemoryCache,
        id: Uuid,
        dto: UpdateUserDto,
    ) -> Result<User, AppError> {
        let existing = Self::get_user(db, id).await?;

        let name = dto.name.unwrap_or(existing.name);
        let email = dto.email.unwrap_or(existing.email);
        let role = dto.role.unwrap_or(existing.role);
        let hashed_password = match &dto.password {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let user = sqlx::query_as::<_, User>(
            "UPDATE users
             SET name = $2, email = $3, role = $4,
                 password = COALESCE($5, password),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING id, name, email, role, created_at, updated_at",
        )
        .bind(id)
        .bind(&name)
        .bind(&email)
        .bind(role)
        .bind(&hashed_password)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                warn!(user.id = %id, "Attempted to update user to an existing email");
                return AppError::already_exists("A user with this email already exists");
            }
            AppError::from(e)
        })?;

        invalidate::users(cache).await;

        info!(user.id = %user.id, "User updated");

        Ok(user)
    }

    #[instrument(skip(db, cache), fields(user.id = %id, db.operation = "DELETE", db.table = "users"))]
    pub async fn delete_user(
        db: &PgPool,
        cache: &MemoryCache,
        id: Uuid,
        current_user_id: Uuid,
    ) -> Result<(), AppError> {
        if id == current_user_id {
            warn!(user.id = %id, "User attempted to delete their own account");
            return Err(AppError::validation("You cannot delete your own account"));
        }

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User not found"));
        }

        invalidate::users(cache).await;

        info!(user.id = %id, "User deleted");

        Ok(())
    }
}
