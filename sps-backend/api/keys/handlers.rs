//! Dashboard API keys. Keys are placeholders generated locally; the hosted
//! service does not know about them.
//!
//! - GET /api/keys: stored keys
//! - POST /api/keys: `{ "name": "..." }`, generate and store a key
//! - DELETE /api/keys/{id}: delete by id

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::api::{error_response, AppState};
use crate::storage::api_keys::KeyCreateError;

pub(crate) async fn list_keys(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.api_keys.list())
}

#[derive(Deserialize)]
pub(crate) struct CreateKeyBody {
    #[serde(default)]
    name: String,
}

pub(crate) async fn create_key(
    State(state): State<AppState>,
    Json(body): Json<CreateKeyBody>,
) -> impl IntoResponse {
    match state.api_keys.generate(&body.name) {
        Ok(key) => (StatusCode::CREATED, Json(json!(key))).into_response(),
        Err(e @ KeyCreateError::BlankName) => {
            error_response(StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e @ KeyCreateError::DuplicateName(_)) => {
            error_response(StatusCode::CONFLICT, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to generate API key");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub(crate) async fn delete_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    state.api_keys.remove(&id);
    Json(json!({ "deleted": id }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};

    use crate::api::test_support::spawn_app;
    use crate::gateway::mock::MockGateway;
    use crate::storage::ApiKey;

    #[tokio::test]
    async fn test_create_list_delete() {
        let app = spawn_app(Arc::new(MockGateway::default())).await;

        let resp = app
            .client
            .post(app.url("/api/keys"))
            .json(&json!({ "name": "prod" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let created: ApiKey = resp.json().await.unwrap();
        assert!(created.key.starts_with("sk_"));

        let keys: Vec<ApiKey> = app.client.get(app.url("/api/keys")).send().await.unwrap().json().await.unwrap();
        assert_eq!(keys, vec![created.clone()]);

        let resp = app
            .client
            .delete(app.url(&format!("/api/keys/{}", created.id)))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert!(app.state.api_keys.list().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let app = spawn_app(Arc::new(MockGateway::default())).await;

        for expected in [201, 409] {
            let resp = app
                .client
                .post(app.url("/api/keys"))
                .json(&json!({ "name": "prod" }))
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), expected);
        }
        assert_eq!(app.state.api_keys.list().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let app = spawn_app(Arc::new(MockGateway::default())).await;
        let resp = app
            .client
            .post(app.url("/api/keys"))
            .json(&json!({ "name": "  " }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "API key name is required");
    }
}
