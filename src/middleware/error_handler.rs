//! Central error envelope middleware.

use axum::{
    Json,
    body::to_bytes,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::state::AppState;
use crate::utils::errors::{ErrorBody, ErrorCode, ErrorMeta};

/// Error bodies are short; anything larger is truncated to this bound
/// before being folded into the envelope.
const MAX_BUFFERED_ERROR_BODY: usize = 64 * 1024;

/// Reshapes every error response into the uniform envelope
/// `{ "error": { code, message, details?, timestamp, path? } }` and logs it.
///
/// Handler errors arrive with [`ErrorMeta`] attached by `AppError`'s
/// `IntoResponse`. Responses produced outside the error type (unknown
/// routes, extractor rejections, method mismatches) are classified by
/// status and their body text becomes the message. Outside development
/// mode, internal error messages are replaced with a generic message and
/// their details dropped; client errors pass through unchanged.
pub async fn error_envelope(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    let response = next.run(req).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let meta = match response.extensions().get::<ErrorMeta>().cloned() {
        Some(meta) => meta,
        None => {
            let code = ErrorCode::from_status(status);
            let bytes = to_bytes(response.into_body(), MAX_BUFFERED_ERROR_BODY)
                .await
                .unwrap_or_default();
            let text = String::from_utf8_lossy(&bytes).trim().to_string();
            let message = if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            } else {
                text
            };
            ErrorMeta {
                code,
                message,
                details: None,
            }
        }
    };

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            code = %meta.code.as_str(),
            message = %meta.message,
            "Request failed"
        );
    } else {
        warn!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            code = %meta.code.as_str(),
            message = %meta.message,
            "Request rejected"
        );
    }

    let (message, details) = if state.runtime.is_production() && meta.code.is_internal() {
        ("An internal error occurred".to_string(), None)
    } else {
        (meta.message, meta.details)
    };

    let body = ErrorBody::new(meta.code, message, details, Some(path));
    (status, Json(body)).into_response()
}
