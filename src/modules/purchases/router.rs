use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_purchase, delete_purchase, get_purchase, get_purchases, update_purchase,
};

pub fn init_purchases_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_purchases).post(create_purchase))
        .route(
            "/{id}",
            get(get_purchase)
                .put(update_purchase)
                .delete(delete_purchase),
        )
}
