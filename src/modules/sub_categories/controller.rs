use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::sub_categories::model::{
    CreateSubCategoryDto, SubCategory, SubCategoryFilterParams, SubCategoryWithContext,
    UpdateSubCategoryDto,
};
use crate::modules::sub_categories::service::SubCategoryService;
use crate::state::AppState;
use crate::utils::errors::{AppError, ErrorBody};
use crate::validator::ValidatedJson;

/// List subcategories with parent name and product count
#[utoipa::path(
    get,
    path = "/api/subcategories",
    params(("categoryId" = Option<Uuid>, Query, description = "Only subcategories of this category")),
    responses(
        (status = 200, description = "Subcategories, name-ordered", body = Vec<SubCategoryWithContext>),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    ),
    tag = "Subcategories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, filters))]
pub async fn get_sub_categories(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(filters): Query<SubCategoryFilterParams>,
) -> Result<Json<Vec<SubCategoryWithContext>>, AppError> {
    let rows = SubCategoryService::get_sub_categories(&state.db, &state.cache, filters).await?;
    Ok(Json(rows))
}

/// Create a subcategory
#[utoipa::path(
    post,
    path = "/api/subcategories",
    request_body = CreateSubCategoryDto,
    responses(
        (status = 201, description = "Subcategory created", body = SubCategory),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Parent category not found", body = ErrorBody),
        (status = 409, description = "Name already used in this category", body = ErrorBody)
    ),
    tag = "Subcategories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, dto))]
pub async fn create_sub_category(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateSubCategoryDto>,
) -> Result<(StatusCode, Json<SubCategory>), AppError> {
    let sub_category =
        SubCategoryService::create_sub_category(&state.db, &state.cache, dto).await?;
    Ok((StatusCode::CREATED, Json(sub_category)))
}

/// Fetch a subcategory
#[utoipa::path(
    get,
    path = "/api/subcategories/{id}",
    params(("id" = Uuid, Path, description = "Subcategory ID")),
    responses(
        (status = 200, description = "Subcategory details", body = SubCategoryWithContext),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Subcategory not found", body = ErrorBody)
    ),
    tag = "Subcategories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_sub_category(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SubCategoryWithContext>, AppError> {
    let sub_category = SubCategoryService::get_sub_category(&state.db, id).await?;
    Ok(Json(sub_category))
}

/// Update a subcategory
#[utoipa::path(
    put,
    path = "/api/subcategories/{id}",
    params(("id" = Uuid, Path, description = "Subcategory ID")),
    request_body = UpdateSubCategoryDto,
    responses(
        (status = 200, description = "Subcategory updated", body = SubCategory),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Subcategory or target category not found", body = ErrorBody),
        (status = 409, description = "Name already used in this category", body = ErrorBody)
    ),
    tag = "Subcategories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, dto))]
pub async fn update_sub_category(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateSubCategoryDto>,
) -> Result<Json<SubCategory>, AppError> {
    let sub_category =
        SubCategoryService::update_sub_category(&state.db, &state.cache, id, dto).await?;
    Ok(Json(sub_category))
}

/// Delete a subcategory
#[utoipa::path(
    delete,
    path = "/api/subcategories/{id}",
    params(("id" = Uuid, Path, description = "Subcategory ID")),
    responses(
        (status = 204, description = "Subcategory deleted"),
        (status = 400, description = "Subcategory still has products", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Subcategory not found", body = ErrorBody)
    ),
    tag = "Subcategories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn delete_sub_category(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    SubCategoryService::delete_sub_category(&state.db, &state.cache, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
