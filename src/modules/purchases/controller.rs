use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::purchases::model::{
    CreatePurchaseDto, Purchase, PurchaseFilterParams, PurchaseWithProduct, UpdatePurchaseDto,
};
use crate::modules::purchases::service::PurchaseService;
use crate::state::AppState;
use crate::utils::errors::{AppError, ErrorBody};
use crate::utils::pagination::PaginatedResponse;
use crate::validator::ValidatedJson;

/// List purchases with filtering and pagination
#[utoipa::path(
    get,
    path = "/api/purchases",
    params(
        ("productId" = Option<Uuid>, Query, description = "Only purchases of this product"),
        ("page" = Option<i64>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<i64>, Query, description = "Rows per page, 1-100"),
        ("sortBy" = Option<String>, Query, description = "purchaseDate | createdAt | totalCostMGA | quantity"),
        ("sortOrder" = Option<String>, Query, description = "asc | desc")
    ),
    responses(
        (status = 200, description = "Paginated purchases with product refs", body = PaginatedResponse<PurchaseWithProduct>),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    ),
    tag = "Purchases",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, filters))]
pub async fn get_purchases(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(filters): Query<PurchaseFilterParams>,
) -> Result<Json<PaginatedResponse<PurchaseWithProduct>>, AppError> {
    let response = PurchaseService::get_purchases(&state.db, &state.cache, filters).await?;
    Ok(Json(response))
}

/// Record a purchase
#[utoipa::path(
    post,
    path = "/api/purchases",
    request_body = CreatePurchaseDto,
    responses(
        (status = 201, description = "Purchase recorded with server-computed total", body = Purchase),
        (status = 400, description = "Validation error or no active exchange rate", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody)
    ),
    tag = "Purchases",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, dto))]
pub async fn create_purchase(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreatePurchaseDto>,
) -> Result<(StatusCode, Json<Purchase>), AppError> {
    let purchase = PurchaseService::create_purchase(&state.db, &state.cache, dto).await?;
    Ok((StatusCode::CREATED, Json(purchase)))
}

/// Fetch a purchase
#[utoipa::path(
    get,
    path = "/api/purchases/{id}",
    params(("id" = Uuid, Path, description = "Purchase ID")),
    responses(
        (status = 200, description = "Purchase with product ref", body = PurchaseWithProduct),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Purchase not found", body = ErrorBody)
    ),
    tag = "Purchases",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_purchase(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PurchaseWithProduct>, AppError> {
    let purchase = PurchaseService::get_purchase(&state.db, id).await?;
    Ok(Json(purchase))
}

/// Update a purchase
#[utoipa::path(
    put,
    path = "/api/purchases/{id}",
    params(("id" = Uuid, Path, description = "Purchase ID")),
    request_body = UpdatePurchaseDto,
    responses(
        (status = 200, description = "Purchase updated, total recomputed", body = Purchase),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Purchase or product not found", body = ErrorBody)
    ),
    tag = "Purchases",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, dto))]
pub async fn update_purchase(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdatePurchaseDto>,
) -> Result<Json<Purchase>, AppError> {
    let purchase = PurchaseService::update_purchase(&state.db, &state.cache, id, dto).await?;
    Ok(Json(purchase))
}

/// Delete a purchase
#[utoipa::path(
    delete,
    path = "/api/purchases/{id}",
    params(("id" = Uuid, Path, description = "Purchase ID")),
    responses(
        (status = 204, description = "Purchase deleted"),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Purchase not found", body = ErrorBody)
    ),
    tag = "Purchases",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn delete_purchase(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    PurchaseService::delete_purchase(&state.db, &state.cache, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
