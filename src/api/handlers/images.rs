//! Captcha image listing: GET /api/images

use super::AppState;
use crate::api::ApiError;
use crate::types::CONFIG_PATHNAME;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

/// One image entry as the captcha grid consumes it.
#[derive(Debug, Serialize)]
pub struct ImageEntry {
    pub url: String,
    pub pathname: String,
}

#[derive(Debug, Serialize)]
pub struct ImageListing {
    pub targets: Vec<ImageEntry>,
    pub distractors: Vec<ImageEntry>,
}

/// Partition stored objects into targets and distractors by key prefix.
#[instrument(skip(state))]
pub async fn list_images(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ImageListing>, ApiError> {
    let blobs = state.store.list().await?;

    let mut targets = Vec::new();
    let mut distractors = Vec::new();
    for blob in blobs {
        // config.json is not an image, and audio uploads never belong in the grid
        if blob.pathname == CONFIG_PATHNAME || blob.pathname.starts_with("audio/") {
            continue;
        }
        let entry = ImageEntry {
            url: blob.url,
            pathname: blob.pathname,
        };
        if entry.pathname.starts_with("target/") {
            targets.push(entry);
        } else {
            distractors.push(entry);
        }
    }

    Ok(Json(ImageListing {
        targets,
        distractors,
    }))
}
