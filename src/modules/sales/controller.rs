use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::sales::model::{
    CreateSaleDto, Sale, SaleFilterParams, SaleWithProduct, UpdateSaleDto,
};
use crate::modules::sales::service::SaleService;
use crate::state::AppState;
use crate::utils::errors::{AppError, ErrorBody};
use crate::utils::pagination::PaginatedResponse;
use crate::validator::ValidatedJson;

/// List sales with filtering and pagination
#[utoipa::path(
    get,
    path = "/api/sales",
    params(
        ("productId" = Option<Uuid>, Query, description = "Only sales of this product"),
        ("page" = Option<i64>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<i64>, Query, description = "Rows per page, 1-100"),
        ("sortBy" = Option<String>, Query, description = "saleDate | createdAt | totalRevenue | quantity"),
        ("sortOrder" = Option<String>, Query, description = "asc | desc")
    ),
    responses(
        (status = 200, description = "Paginated sales with product refs", body = PaginatedResponse<SaleWithProduct>),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    ),
    tag = "Sales",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, filters))]
pub async fn get_sales(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(filters): Query<SaleFilterParams>,
) -> Result<Json<PaginatedResponse<SaleWithProduct>>, AppError> {
    let response = SaleService::get_sales(&state.db, &state.cache, filters).await?;
    Ok(Json(response))
}

/// Record a sale
#[utoipa::path(
    post,
    path = "/api/sales",
    request_body = CreateSaleDto,
    responses(
        (status = 201, description = "Sale recorded with server-computed total", body = Sale),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody)
    ),
    tag = "Sales",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, dto))]
pub async fn create_sale(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateSaleDto>,
) -> Result<(StatusCode, Json<Sale>), AppError> {
    let sale = SaleService::create_sale(&state.db, &state.cache, dto).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// Fetch a sale
#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    params(("id" = Uuid, Path, description = "Sale ID")),
    responses(
        (status = 200, description = "Sale with product ref", body = SaleWithProduct),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Sale not found", body = ErrorBody)
    ),
    tag = "Sales",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_sale(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SaleWithProduct>, AppError> {
    let sale = SaleService::get_sale(&state.db, id).await?;
    Ok(Json(sale))
}

/// Update a sale
#[utoipa::path(
    put,
    path = "/api/sales/{id}",
    params(("id" = Uuid, Path, description = "Sale ID")),
    request_body = UpdateSaleDto,
    responses(
        (status = 200, description = "Sale updated, total recomputed", body = Sale),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Sale or product not found", body = ErrorBody)
    ),
    tag = "Sales",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, dto))]
pub async fn update_sale(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateSaleDto>,
) -> Result<Json<Sale>, AppError> {
    let sale = SaleService::update_sale(&state.db, &state.cache, id, dto).await?;
    Ok(Json(sale))
}

/// Delete a sale
#[utoipa::path(
    delete,
    path = "/api/sales/{id}",
    params(("id" = Uuid, Path, description = "Sale ID")),
    responses(
        (status = 204, description = "Sale deleted"),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Sale not found", body = ErrorBody)
    ),
    tag = "Sales",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn delete_sale(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    SaleService::delete_sale(&state.db, &state.cache, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
