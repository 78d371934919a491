pub mod handlers;

use axum::routing::{get, post};
use axum::Router;

use crate::api::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/saved", get(handlers::list_saved_ids))
        .route("/saved/prompts", get(handlers::list_saved_prompts))
        .route(
            "/saved/{id}",
            post(handlers::save_id).delete(handlers::remove_id),
        )
}
