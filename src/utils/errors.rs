use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Stable machine-readable codes carried by every error response.
///
/// The set is closed: adding a code means deciding its HTTP status here,
/// and the compiler walks every match that needs updating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    ValidationError,
    NotFound,
    AlreadyExists,
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::AlreadyExists => StatusCode::CONFLICT,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classifies a status produced outside the error type (framework
    /// rejections, unknown routes) so those responses still carry a code.
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ErrorCode::Unauthorized,
            StatusCode::FORBIDDEN => ErrorCode::Forbidden,
            StatusCode::NOT_FOUND => ErrorCode::NotFound,
            StatusCode::CONFLICT => ErrorCode::AlreadyExists,
            s if s.is_client_error() => ErrorCode::ValidationError,
            _ => ErrorCode::InternalError,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::AlreadyExists => "ALREADY_EXISTS",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    /// True for codes whose messages must be suppressed outside development.
    pub fn is_internal(&self) -> bool {
        matches!(self, ErrorCode::DatabaseError | ErrorCode::InternalError)
    }
}

/// Application error: a taxonomy code, a human-readable message, and
/// optional structured details (offending field, child counts, ...).
#[derive(Debug)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<Value>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AlreadyExists, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {}

/// Translation of data-store failures into the taxonomy.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::not_found("Record not found"),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                let mut error =
                    AppError::already_exists("A record with these values already exists");
                if let Some(constraint) = db_err.constraint() {
                    error = error.with_details(json!({ "constraint": constraint }));
                }
                error
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                let mut error = AppError::validation("Referenced record does not exist");
                if let Some(constraint) = db_err.constraint() {
                    error = error.with_details(json!({ "constraint": constraint }));
                }
                error
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => AppError::database("Database connection failed"),
            other => AppError::database(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).ok();
        AppError {
            code: ErrorCode::ValidationError,
            message: format_validation_errors(&errors),
            details,
        }
    }
}

/// Flattens validator output into a stable, readable one-line message.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, field_errors)| {
            let messages: Vec<String> = field_errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("{field} is invalid"))
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

/// Error metadata stashed in response extensions so the envelope middleware
/// can log and reshape the response without re-parsing its body.
#[derive(Debug, Clone)]
pub struct ErrorMeta {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<Value>,
}

/// The uniform error envelope: `{ "error": { ... } }`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorBody {
    pub fn new(
        code: ErrorCode,
        message: impl Into<String>,
        details: Option<Value>,
        path: Option<String>,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code,
                message: message.into(),
                details,
                timestamp: Utc::now(),
                path,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.code.status();
        let body = ErrorBody::new(self.code, self.message.clone(), self.details.clone(), None);
        let meta = ErrorMeta {
            code: self.code,
            message: self.message,
            details: self.details,
        };

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(meta);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_maps_to_its_fixed_status() {
        assert_eq!(ErrorCode::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::ValidationError.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::AlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::DatabaseError.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::InternalError.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn codes_serialize_as_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::ValidationError).unwrap();
        assert_eq!(json, "\"VALIDATION_ERROR\"");
        let json = serde_json::to_string(&ErrorCode::AlreadyExists).unwrap();
        assert_eq!(json, "\"ALREADY_EXISTS\"");
    }

    #[test]
    fn from_status_classifies_unknown_client_errors_as_validation() {
        assert_eq!(
            ErrorCode::from_status(StatusCode::METHOD_NOT_ALLOWED),
            ErrorCode::ValidationError
        );
        assert_eq!(
            ErrorCode::from_status(StatusCode::NOT_FOUND),
            ErrorCode::NotFound
        );
        assert_eq!(
            ErrorCode::from_status(StatusCode::BAD_GATEWAY),
            ErrorCode::InternalError
        );
    }

    #[test]
    fn row_not_found_translates_to_not_found() {
        let error = AppError::from(sqlx::Error::RowNotFound);
        assert_eq!(error.code, ErrorCode::NotFound);
    }

    #[test]
    fn validation_errors_translate_with_field_message() {
        use validator::Validate;

        #[derive(Validate)]
        struct Dto {
            #[validate(email(message = "must be a valid email"))]
            email: String,
        }

        let dto = Dto {
            email: "nope".to_string(),
        };
        let error = AppError::from(dto.validate().unwrap_err());

        assert_eq!(error.code, ErrorCode::ValidationError);
        assert!(error.message.contains("email"));
        assert!(error.details.is_some());
    }

    #[test]
    fn with_details_attaches_structured_payload() {
        let error = AppError::validation("Cannot delete category with products")
            .with_details(json!({ "productCount": 3 }));
        assert_eq!(error.details.unwrap()["productCount"], 3);
    }

    #[test]
    fn envelope_skips_absent_optional_fields() {
        let body = ErrorBody::new(ErrorCode::NotFound, "User not found", None, None);
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["error"]["code"], "NOT_FOUND");
        assert_eq!(value["error"]["message"], "User not found");
        assert!(value["error"].get("details").is_none());
        assert!(value["error"].get("path").is_none());
        assert!(value["error"].get("timestamp").is_some());
    }

    #[test]
    fn envelope_carries_path_when_known() {
        let body = ErrorBody::new(
            ErrorCode::Forbidden,
            "Admin access required",
            None,
            Some("/api/users".to_string()),
        );
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["error"]["path"], "/api/users");
    }

    #[test]
    fn into_response_sets_status_and_meta() {
        let response = AppError::not_found("User not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let meta = response.extensions().get::<ErrorMeta>().unwrap();
        assert_eq!(meta.code, ErrorCode::NotFound);
        assert_eq!(meta.message, "User not found");
    }
}
