use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::warn;

use crate::modules::auth::model::Claims;
use crate::modules::users::model::Role;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_token;

/// Extractor that validates the bearer token and provides the caller's
/// verified claims. Every denial is logged with the request method and path
/// before the UNAUTHORIZED error propagates.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Get the user ID as UUID
    pub fn user_id(&self) -> Result<uuid::Uuid, AppError> {
        uuid::Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))
    }

    /// Get the user's email
    pub fn email(&self) -> &str {
        &self.0.email
    }

    /// Get the user's role
    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.0.role, Role::Admin)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let Some(auth_header) = auth_header else {
            warn!(
                method = %parts.method,
                path = %parts.uri.path(),
                "Rejected request without authorization header"
            );
            return Err(AppError::unauthorized("Missing authorization header"));
        };

        let Some(token) = auth_header.strip_prefix("Bearer ") else {
            warn!(
                method = %parts.method,
                path = %parts.uri.path(),
                "Rejected malformed authorization header"
            );
            return Err(AppError::unauthorized(
                "Invalid authorization header format",
            ));
        };

        match verify_token(token, &state.jwt_config) {
            Ok(claims) => Ok(AuthUser(claims)),
            Err(err) => {
                warn!(
                    method = %parts.method,
                    path = %parts.uri.path(),
                    "Rejected invalid or expired token"
                );
                Err(err)
            }
        }
    }
}
