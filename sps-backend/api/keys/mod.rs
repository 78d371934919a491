pub mod handlers;

use axum::routing::{delete, get};
use axum::Router;

use crate::api::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/keys", get(handlers::list_keys).post(handlers::create_key))
        .route("/keys/{id}", delete(handlers::delete_key))
}
