pub mod handlers;

use axum::routing::{get, put};
use axum::Router;

use crate::api::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/prompts",
            get(handlers::list_prompts).post(handlers::create_prompt),
        )
        .route("/promptbyids", get(handlers::prompts_by_ids))
        .route("/prompt/{id}", get(handlers::get_prompt))
        .route("/prompt/{id}/metadata", put(handlers::update_metadata))
        .route("/categories", get(handlers::list_categories))
}
