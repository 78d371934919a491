//! "My Prompts": the locally kept list of prompt ids.
//!
//! - GET /api/saved: kept ids, in insertion order
//! - GET /api/saved/prompts: kept prompts resolved against the service
//! - POST /api/saved/{id}: keep an id
//! - DELETE /api/saved/{id}: forget an id

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::api::{error_response, AppState};

pub(crate) async fn list_saved_ids(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "ids": state.saved_ids.list() }))
}

pub(crate) async fn list_saved_prompts(State(state): State<AppState>) -> impl IntoResponse {
    let ids = state.saved_ids.list();
    if ids.is_empty() {
        return Json(json!([])).into_response();
    }

    match state.gateway.retrieve_many(&ids).await {
        Ok(prompts) => Json(prompts).into_response(),
        Err(e) => {
            tracing::error!(error = %e, count = ids.len(), "failed to resolve saved prompts");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch prompts")
                .into_response()
        }
    }
}

pub(crate) async fn save_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    state.saved_ids.add(&id);
    Json(json!({ "ids": state.saved_ids.list() }))
}

pub(crate) async fn remove_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    state.saved_ids.remove(&id);
    Json(json!({ "ids": state.saved_ids.list() }))
}
