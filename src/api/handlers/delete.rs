//! Delete-by-URL: POST /api/delete

use super::AppState;
use crate::api::ApiError;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub url: Option<String>,
}

#[instrument(skip(state, headers))]
pub async fn delete_blob(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<Value>, ApiError> {
    state.admin.require(&headers)?;

    let url = request
        .url
        .filter(|u| !u.is_empty())
        .ok_or(ApiError::MissingUrl)?;

    state.store.delete(&url).await?;
    info!("Deleted blob {}", url);
    Ok(Json(json!({ "success": true })))
}
