pub mod keys;
pub mod middleware;
pub mod prompts;
mod routes;
pub mod saved;

use std::sync::Arc;

use axum::Json;
use axum::Router;
use hyper::StatusCode;
use serde_json::{Value, json};

use crate::gateway::{GatewayError, PromptGateway};
use crate::storage::{ApiKeyStore, SavedPromptIds};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn PromptGateway>,
    pub saved_ids: SavedPromptIds,
    pub api_keys: ApiKeyStore,
}

pub fn create_app(state: AppState) -> Router {
    routes::build_router(state)
}

pub(crate) type ApiError = (StatusCode, Json<Value>);

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

/// Map a gateway failure onto the front end's `{error}` responses.
pub(crate) fn gateway_error(e: GatewayError, context: &str) -> ApiError {
    match e {
        GatewayError::NotFound(id) => {
            error_response(StatusCode::NOT_FOUND, format!("prompt not found: {id}"))
        }
        other => {
            tracing::error!(error = %other, "{context}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, context)
        }
    }
}
