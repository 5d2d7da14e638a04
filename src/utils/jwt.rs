use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::modules::auth::model::Claims;
use crate::modules::users::model::Role;
use crate::utils::errors::AppError;

/// Signs a session token for the given user.
///
/// `extended` selects the long-lived expiry (the login form's "remember me");
/// otherwise the standard one-day lifetime applies. Fails closed when no
/// signing secret is configured.
pub fn create_token(
    user_id: Uuid,
    email: &str,
    role: Role,
    extended: bool,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let Some(secret) = jwt_config.secret.as_deref() else {
        return Err(AppError::internal("JWT signing secret is not configured"));
    };

    let lifetime = if extended {
        jwt_config.extended_expiry
    } else {
        jwt_config.expiry
    };

    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role,
        exp: (now + lifetime) as usize,
        iat: now as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("Failed to create token: {}", e)))
}

/// Validates signature and expiry; every failure mode collapses into a
/// single UNAUTHORIZED error so callers never see library error types.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    let Some(secret) = jwt_config.secret.as_deref() else {
        return Err(AppError::unauthorized("Invalid or expired token"));
    };

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token"))
}
