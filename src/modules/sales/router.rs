use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{create_sale, delete_sale, get_sale, get_sales, update_sale};

pub fn init_sales_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_sales).post(create_sale))
        .route("/{id}", get(get_sale).put(update_sale).delete(delete_sale))
}
