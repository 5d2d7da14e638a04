use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::exchange_rates::model::{
    CreateExchangeRateDto, ExchangeRate, UpdateExchangeRateDto,
};
use crate::modules::exchange_rates::service::ExchangeRateService;
use crate::state::AppState;
use crate::utils::errors::{AppError, ErrorBody};
use crate::validator::ValidatedJson;

/// List exchange rates, newest first
#[utoipa::path(
    get,
    path = "/api/exchange-rates",
    responses(
        (status = 200, description = "All exchange rates", body = Vec<ExchangeRate>),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    ),
    tag = "Exchange Rates",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_exchange_rates(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<ExchangeRate>>, AppError> {
    let rates = ExchangeRateService::get_exchange_rates(&state.db, &state.cache).await?;
    Ok(Json(rates))
}

/// Fetch the active exchange rate
#[utoipa::path(
    get,
    path = "/api/exchange-rates/active",
    responses(
        (status = 200, description = "The active rate", body = ExchangeRate),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "No active rate", body = ErrorBody)
    ),
    tag = "Exchange Rates",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_active_rate(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<ExchangeRate>, AppError> {
    let rate = ExchangeRateService::get_active_rate(&state.db).await?;
    Ok(Json(rate))
}

/// Create an exchange rate
#[utoipa::path(
    post,
    path = "/api/exchange-rates",
    request_body = CreateExchangeRateDto,
    responses(
        (status = 201, description = "Exchange rate created", body = ExchangeRate),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    ),
    tag = "Exchange Rates",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, dto))]
pub async fn create_exchange_rate(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateExchangeRateDto>,
) -> Result<(StatusCode, Json<ExchangeRate>), AppError> {
    let rate = ExchangeRateService::create_exchange_rate(&state.db, &state.cache, dto).await?;
    Ok((StatusCode::CREATED, Json(rate)))
}

/// Update an exchange rate
#[utoipa::path(
    put,
    path = "/api/exchange-rates/{id}",
    params(("id" = Uuid, Path, description = "Exchange rate ID")),
    request_body = UpdateExchangeRateDto,
    responses(
        (status = 200, description = "Exchange rate updated", body = ExchangeRate),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Exchange rate not found", body = ErrorBody)
    ),
    tag = "Exchange Rates",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, dto))]
pub async fn update_exchange_rate(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateExchangeRateDto>,
) -> Result<Json<ExchangeRate>, AppError> {
    let rate = ExchangeRateService::update_exchange_rate(&state.db, &state.cache, id, dto).await?;
    Ok(Json(rate))
}

/// Delete an exchange rate
#[utoipa::path(
    delete,
    path = "/api/exchange-rates/{id}",
    params(("id" = Uuid, Path, description = "Exchange rate ID")),
    responses(
        (status = 204, description = "Exchange rate deleted"),
        (status = 400, description = "Rate is active", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Exchange rate not found", body = ErrorBody)
    ),
    tag = "Exchange Rates",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn delete_exchange_rate(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ExchangeRateService::delete_exchange_rate(&state.db, &state.cache, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
