//! Prompt endpoints backing the public list, the prompt page and the
//! dashboard create/edit forms.
//!
//! - GET /api/prompts?offset&limit&category: one page of prompts
//! - POST /api/prompts: validate form, create, keep id
//! - GET /api/promptbyids?ids=a,b,c: batch fetch by id
//! - GET /api/prompt/{id}: single prompt with metadata
//! - PUT /api/prompt/{id}/metadata: replace metadata
//! - GET /api/categories: distinct categories

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::api::{error_response, gateway_error, AppState};
use crate::prompts::validation::CreatePromptForm;
use crate::prompts::{
    PromptListParams, PromptMetadata, PromptRetrieveParams, PromptUpdateMetadataParams,
    DEFAULT_LIST_LIMIT,
};

/// Raw query values; an empty or unparsable number falls back to its default.
#[derive(Deserialize)]
pub(crate) struct ListQuery {
    offset: Option<String>,
    limit: Option<String>,
    category: Option<String>,
}

fn parse_or(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

pub(crate) async fn list_prompts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let params = PromptListParams::new(
        parse_or(query.offset.as_deref(), 0),
        parse_or(query.limit.as_deref(), DEFAULT_LIST_LIMIT),
        query.category,
    );

    match state.gateway.list(&params).await {
        Ok(prompts) => Json(prompts).into_response(),
        Err(e) => gateway_error(e, "Failed to fetch prompts").into_response(),
    }
}

#[derive(Deserialize)]
pub(crate) struct IdsQuery {
    ids: Option<String>,
}

/// Split a comma-separated id list, dropping blanks.
fn parse_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

pub(crate) async fn prompts_by_ids(
    State(state): State<AppState>,
    Query(query): Query<IdsQuery>,
) -> impl IntoResponse {
    let Some(raw) = query.ids.filter(|ids| !ids.is_empty()) else {
        tracing::info!("no ids provided in promptbyids request");
        return error_response(StatusCode::BAD_REQUEST, "No IDs provided").into_response();
    };

    let ids = parse_ids(&raw);
    if ids.is_empty() {
        return Json(json!([])).into_response();
    }

    match state.gateway.retrieve_many(&ids).await {
        Ok(prompts) => {
            tracing::info!(count = prompts.len(), "fetched prompts by ids");
            Json(prompts).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, ids = ?ids, "error fetching prompts by ids");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch prompts")
                .into_response()
        }
    }
}

pub(crate) async fn get_prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state
        .gateway
        .retrieve(&id, PromptRetrieveParams::default())
        .await
    {
        Ok(prompt) => Json(prompt).into_response(),
        Err(e) => gateway_error(e, "Failed to load prompt").into_response(),
    }
}

/// Validate the create form, create the prompt, and record its id as one
/// of the user's prompts.
pub(crate) async fn create_prompt(
    State(state): State<AppState>,
    Json(form): Json<CreatePromptForm>,
) -> impl IntoResponse {
    let params = match form.validate() {
        Ok(params) => params,
        Err(errors) => {
            tracing::info!(fields = %errors, "rejected create form");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "errors": errors.into_map() })),
            )
                .into_response();
        }
    };

    match state.gateway.create(&params).await {
        Ok(id) => {
            state.saved_ids.add(&id);
            (StatusCode::CREATED, Json(json!({ "id": id }))).into_response()
        }
        Err(e) => gateway_error(e, "Failed to create prompt").into_response(),
    }
}

pub(crate) async fn update_metadata(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(metadata): Json<PromptMetadata>,
) -> impl IntoResponse {
    let params = PromptUpdateMetadataParams::from_metadata(id.clone(), metadata);
    match state.gateway.update_metadata(&params).await {
        Ok(()) => {
            tracing::info!(id = %id, "updated prompt metadata");
            Json(json!({ "id": id })).into_response()
        }
        Err(e) => gateway_error(e, "Failed to update prompt metadata").into_response(),
    }
}

pub(crate) async fn list_categories(State(state): State<AppState>) -> impl IntoResponse {
    match state.gateway.categories().await {
        Ok(categories) => Json(categories).into_response(),
        Err(e) => gateway_error(e, "Failed to fetch categories").into_response(),
    }
}
