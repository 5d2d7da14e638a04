use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::orders::model::{CreateOrderDto, Order, OrderFilterParams, UpdateOrderDto};
use crate::modules::orders::service::OrderService;
use crate::state::AppState;
use crate::utils::errors::{AppError, ErrorBody};
use crate::utils::pagination::PaginatedResponse;
use crate::validator::ValidatedJson;

/// List orders with filtering and pagination
#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("status" = Option<String>, Query, description = "pending | processing | completed | cancelled"),
        ("page" = Option<i64>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<i64>, Query, description = "Rows per page, 1-100"),
        ("sortBy" = Option<String>, Query, description = "orderDate | createdAt | totalCostMGA | status"),
        ("sortOrder" = Option<String>, Query, description = "asc | desc")
    ),
    responses(
        (status = 200, description = "Paginated orders", body = PaginatedResponse<Order>),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    ),
    tag = "Orders",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, filters))]
pub async fn get_orders(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(filters): Query<OrderFilterParams>,
) -> Result<Json<PaginatedResponse<Order>>, AppError> {
    let response = OrderService::get_orders(&state.db, &state.cache, filters).await?;
    Ok(Json(response))
}

/// Create an order
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderDto,
    responses(
        (status = 201, description = "Order created with server-computed total", body = Order),
        (status = 400, description = "Validation error or no active exchange rate", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    ),
    tag = "Orders",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, dto))]
pub async fn create_order(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateOrderDto>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = OrderService::create_order(&state.db, &state.cache, dto).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Fetch an order
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order details", body = Order),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Order not found", body = ErrorBody)
    ),
    tag = "Orders",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_order(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = OrderService::get_order(&state.db, id).await?;
    Ok(Json(order))
}

/// Update an order
#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderDto,
    responses(
        (status = 200, description = "Order updated, total recomputed", body = Order),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Order not found", body = ErrorBody)
    ),
    tag = "Orders",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, dto))]
pub async fn update_order(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateOrderDto>,
) -> Result<Json<Order>, AppError> {
    let order = OrderService::update_order(&state.db, &state.cache, id, dto).await?;
    Ok(Json(order))
}

/// Delete an order
#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Order not found", body = ErrorBody)
    ),
    tag = "Orders",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn delete_order(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    OrderService::delete_order(&state.db, &state.cache, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
