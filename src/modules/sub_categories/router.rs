use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_sub_category, delete_sub_category, get_sub_categories, get_sub_category,
    update_sub_category,
};

pub fn init_sub_categories_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_sub_categories).post(create_sub_category))
        .route(
            "/{id}",
            get(get_sub_category)
                .put(update_sub_category)
                .delete(delete_sub_category),
        )
}
