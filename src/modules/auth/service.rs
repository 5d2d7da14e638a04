use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::modules::users::model::{Role, User};
use crate::utils::errors::AppError;
use crate::utils::jwt::create_token;
use crate::utils::password::{hash_password, verify_password};

use super::model::{AuthResponse, LoginRequest, RegisterRequestDto};

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, jwt_config, dto), fields(user.email = %dto.email, db.operation = "INSERT", db.table = "users"))]
    pub async fn register(
        db: &PgPool,
        jwt_config: &JwtConfig,
        dto: RegisterRequestDto,
    ) -> Result<AuthResponse, AppError> {
        let hashed_password = hash_password(&dto.password)?;

        // The unique index on email decides duplicates, so two concurrent
        // registrations cannot both succeed.
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
                warn!(user.email = %dto.email, "Registration attempt with existing email");
                return AppError::already_exists("A user with this email already exists");
            }
            AppError::from(e)
        })?;

        let token = create_token(user.id, &user.email, user.role, false, jwt_config)?;

        info!(user.id = %user.id, "User registered");

        Ok(AuthResponse { user, token })
    }

    #[instrument(skip(db, jwt_config, dto), fields(user.email = %dto.email, db.operation = "SELECT", db.table = "users"))]
    pub async fn login(
        db: &PgPool,
        jwt_config: &JwtConfig,
        dto: LoginRequest,
    ) -> Result<AuthResponse, AppError> {
        #[derive(sqlx::FromRow)]
        struct UserWithPassword {
            id: Uuid,
            name: String,
            email: String,
            password: String,
            role: Role,
            created_at: chrono::DateTime<chrono::Utc>,
            updated_at: chrono::DateTime<chrono::Utc>,
        }

        // Unknown email and wrong password produce the same message.
        let row = sqlx::query_as::<_, UserWithPassword>(
            "SELECT id, name, email, password, role, created_at, updated_at
             FROM users
             WHERE email = $1",
        )
        .bind(&dto.email)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| {
            warn!(user.email = %dto.email, "Login attempt for unknown email");
            AppError::unauthorized("Invalid email or password")
        })?;

        let is_valid = verify_password(&dto.password, &row.password)?;
        if !is_valid {
            warn!(user.id = %row.id, "Login attempt with wrong password");
            return Err(AppError::unauthorized("Invalid email or password"));
        }

        let token = create_token(row.id, &row.email, row.role, dto.remember_me, jwt_config)?;

        let user = User {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };

        info!(user.id = %user.id, extended = %dto.remember_me, "User logged in");

        Ok(AuthResponse { user, token })
    }

    /// Re-reads the caller's row so the response reflects the current role,
    /// not the one frozen into the token.
    #[instrument(skip(db), fields(user.id = %user_id, db.operation = "SELECT", db.table = "users"))]
    pub async fn me(db: &PgPool, user_id: Uuid) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

        Ok(user)
    }
}
