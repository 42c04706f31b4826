use std::sync::Arc;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use nt_core::NewsDigest;
use serde_json::{json, Value};
use crate::error::ApiError;
use crate::AppState;

const TEXTS_REQUIRED: &str = "texts must be an array of strings";

pub async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

pub async fn news(State(state): State<Arc<AppState>>) -> Result<Json<NewsDigest>, ApiError> {
    Ok(Json(state.articles().await?))
}

pub async fn topics(State(state): State<Arc<AppState>>) -> Result<Json<NewsDigest>, ApiError> {
    Ok(Json(state.topics().await?))
}

pub async fn embed(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body.map_err(|_| ApiError::invalid_input(TEXTS_REQUIRED))?;
    let texts = texts_from(&body).ok_or_else(|| ApiError::invalid_input(TEXTS_REQUIRED))?;

    let embeddings = state.pipeline.embedder().embed_all(&texts).await?;
    Ok(Json(json!({ "embeddings": embeddings })))
}

fn texts_from(body: &Value) -> Option<Vec<String>> {
    body.get("texts")?
        .as_array()?
        .iter()
        .map(|t| t.as_str().map(str::to_string))
        .collect()
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
