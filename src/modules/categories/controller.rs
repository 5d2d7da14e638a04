use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::categories::model::{
    Category, CategoryWithChildren, CreateCategoryDto, UpdateCategoryDto,
};
use crate::modules::categories::service::CategoryService;
use crate::state::AppState;
use crate::utils::errors::{AppError, ErrorBody};
use crate::validator::ValidatedJson;

/// List all categories with their subcategories and product counts
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Category tree, name-ordered", body = Vec<CategoryWithChildren>),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    ),
    tag = "Categories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_categories(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<CategoryWithChildren>>, AppError> {
    let categories = CategoryService::get_categories(&state.db, &state.cache).await?;
    Ok(Json(categories))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 409, description = "Category name already exists", body = ErrorBody)
    ),
    tag = "Categories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, dto))]
pub async fn create_category(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = CategoryService::create_category(&state.db, &state.cache, dto).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Fetch a category with its subcategories and product count
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category details", body = CategoryWithChildren),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Category not found", body = ErrorBody)
    ),
    tag = "Categories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_category(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryWithChildren>, AppError> {
    let category = CategoryService::get_category(&state.db, id).await?;
    Ok(Json(category))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Category not found", body = ErrorBody),
        (status = 409, description = "Category name already exists", body = ErrorBody)
    ),
    tag = "Categories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, dto))]
pub async fn update_category(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateCategoryDto>,
) -> Result<Json<Category>, AppError> {
    let category = CategoryService::update_category(&state.db, &state.cache, id, dto).await?;
    Ok(Json(category))
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, description = "Category still has products or subcategories", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Category not found", body = ErrorBody)
    ),
    tag = "Categories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn delete_category(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    CategoryService::delete_category(&state.db, &state.cache, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
