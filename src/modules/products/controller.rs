use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::products::model::{
    CreateProductDto, Product, ProductDetail, ProductFilterParams, ProductWithRefs, ProfitReport,
    UpdateProductDto,
};
use crate::modules::products::service::ProductService;
use crate::state::AppState;
use crate::utils::errors::{AppError, ErrorBody};
use crate::utils::pagination::PaginatedResponse;
use crate::validator::ValidatedJson;

/// List products with filtering and pagination
#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("categoryId" = Option<Uuid>, Query, description = "Only products in this category"),
        ("subCategoryId" = Option<Uuid>, Query, description = "Only products in this subcategory"),
        ("search" = Option<String>, Query, description = "Substring match on name or model"),
        ("page" = Option<i64>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<i64>, Query, description = "Rows per page, 1-100"),
        ("sortBy" = Option<String>, Query, description = "name | createdAt | updatedAt"),
        ("sortOrder" = Option<String>, Query, description = "asc | desc")
    ),
    responses(
        (status = 200, description = "Paginated products with category refs", body = PaginatedResponse<ProductWithRefs>),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    ),
    tag = "Products",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, filters))]
pub async fn get_products(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(filters): Query<ProductFilterParams>,
) -> Result<Json<PaginatedResponse<ProductWithRefs>>, AppError> {
    let response = ProductService::get_products(&state.db, &state.cache, filters).await?;
    Ok(Json(response))
}

/// Create a product
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductDto,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Category or subcategory not found", body = ErrorBody)
    ),
    tag = "Products",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, dto))]
pub async fn create_product(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateProductDto>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = ProductService::create_product(&state.db, &state.cache, dto).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Fetch a product with its purchase and sale history
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product with purchases and sales, newest first", body = ProductDetail),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody)
    ),
    tag = "Products",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_product(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductDetail>, AppError> {
    let detail = ProductService::get_product(&state.db, id).await?;
    Ok(Json(detail))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductDto,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Product, category, or subcategory not found", body = ErrorBody)
    ),
    tag = "Products",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, dto))]
pub async fn update_product(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateProductDto>,
) -> Result<Json<Product>, AppError> {
    let product = ProductService::update_product(&state.db, &state.cache, id, dto).await?;
    Ok(Json(product))
}

/// Delete a product and its purchase/sale history
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody)
    ),
    tag = "Products",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn delete_product(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ProductService::delete_product(&state.db, &state.cache, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Profit summary for a product
#[utoipa::path(
    get,
    path = "/api/products/{id}/profit",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Aggregated cost, revenue, profit, and stock", body = ProfitReport),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody)
    ),
    tag = "Products",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_profit_report(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfitReport>, AppError> {
    let report = ProductService::get_profit_report(&state.db, id).await?;
    Ok(Json(report))
}
