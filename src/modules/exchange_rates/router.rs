use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

use super::controller::{
    create_exchange_rate, delete_exchange_rate, get_active_rate, get_exchange_rates,
    update_exchange_rate,
};

pub fn init_exchange_rates_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_exchange_rates).post(create_exchange_rate))
        .route("/active", get(get_active_rate))
        .route(
            "/{id}",
            put(update_exchange_rate).delete(delete_exchange_rate),
        )
}
