use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::middleware::error_handler::error_envelope;
use crate::middleware::role::require_admin;
use crate::modules::auth::router::init_auth_router;
use crate::modules::categories::router::init_categories_router;
use crate::modules::exchange_rates::router::init_exchange_rates_router;
use crate::modules::orders::router::init_orders_router;
use crate::modules::products::router::init_products_router;
use crate::modules::purchases::router::init_purchases_router;
use crate::modules::sales::router::init_sales_router;
use crate::modules::sub_categories::router::init_sub_categories_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest(
            "/api",
            Router::new()
                .nest("/auth", init_auth_router())
                .nest(
                    "/users",
                    init_users_router()
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
                )
                .nest("/categories", init_categories_router())
                .nest("/subcategories", init_sub_categories_router())
                .nest("/products", init_products_router())
                .nest("/purchases", init_purchases_router())
                .nest("/sales", init_sales_router())
                .nest("/exchange-rates", init_exchange_rates_router())
                .nest("/orders", init_orders_router()),
        )
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            error_envelope,
        ))
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(logging_middleware))
}
