//! Reveal-page copy: GET/POST /api/config
//!
//! The copy lives as `config.json` in the blob store and is passed through
//! verbatim in both directions; the server only supplies defaults while
//! nothing has been saved yet.

use super::AppState;
use crate::api::ApiError;
use crate::storage::StorageError;
use crate::types::{SiteConfig, CONFIG_PATHNAME};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Cache-busting headers: the admin panel must always see its latest save.
fn no_cache_headers() -> [(&'static str, &'static str); 3] {
    [
        (
            "Cache-Control",
            "no-store, no-cache, must-revalidate, proxy-revalidate",
        ),
        ("Pragma", "no-cache"),
        ("Expires", "0"),
    ]
}

#[instrument(skip(state))]
pub async fn get_site_config(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let value = match state.store.get(CONFIG_PATHNAME).await {
        Ok(blob) => match serde_json::from_slice::<Value>(&blob.data) {
            Ok(value) => value,
            Err(e) => {
                warn!("Stored config.json is not valid JSON ({}), serving defaults", e);
                default_config_value()?
            }
        },
        Err(StorageError::NotFound(_)) => default_config_value()?,
        Err(e) => return Err(e.into()),
    };

    Ok((no_cache_headers(), Json(value)).into_response())
}

fn default_config_value() -> Result<Value, ApiError> {
    serde_json::to_value(SiteConfig::default()).map_err(|e| ApiError::Internal(e.to_string()))
}

#[instrument(skip(state, headers, body))]
pub async fn save_site_config(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    state.admin.require(&headers)?;

    // Login probe from the admin panel: authenticate without writing.
    if body.get("_ping").and_then(Value::as_bool).unwrap_or(false) {
        return Ok(Json(json!({ "success": true })));
    }

    let data = serde_json::to_vec(&body).map_err(|e| ApiError::Internal(e.to_string()))?;
    let stored = state
        .store
        .put(CONFIG_PATHNAME, &data, "application/json")
        .await
        .map_err(|e| ApiError::StorageWriteFailed(e.to_string()))?;

    info!("Saved site config ({} bytes)", data.len());
    Ok(Json(json!({ "success": true, "url": stored.url })))
}
