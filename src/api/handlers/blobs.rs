//! Public object serving: GET /blobs/{pathname}
//!
//! The publicly-readable-URL half of the blob store contract when the
//! filesystem backend is in use; S3 deployments serve objects straight from
//! the bucket and never hit this route.

use super::AppState;
use crate::api::ApiError;
use crate::multipart::DEFAULT_CONTENT_TYPE;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::instrument;

#[instrument(skip(state))]
pub async fn serve_blob(
    State(state): State<Arc<AppState>>,
    Path(pathname): Path<String>,
) -> Result<Response, ApiError> {
    let object = state.store.get(&pathname).await?;
    let content_type = object
        .content_type
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    Ok((
        [(header::CONTENT_TYPE, content_type)],
        object.data,
    )
        .into_response())
}
