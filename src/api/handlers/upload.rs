//! Multipart upload handler: POST /api/upload
//!
//! The full pipeline: admin gate, boundary extraction, hand-rolled multipart
//! decode, then role-qualified routing into the blob store.

use super::AppState;
use crate::api::ApiError;
use crate::multipart;
use crate::types::UploadResult;
use crate::upload;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Role fallback header sent by the admin panel alongside the form body.
pub const UPLOAD_ROLE_HEADER: &str = "x-upload-role";

#[instrument(skip(state, headers, body))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResult>, ApiError> {
    state.admin.require(&headers)?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let boundary = multipart::parse_boundary(content_type).ok_or(ApiError::MissingBoundary)?;

    let parts = multipart::decode(&body, &boundary);
    debug!(
        "Decoded {} part(s) from {} body bytes",
        parts.len(),
        body.len()
    );

    let fallback_role = headers
        .get(UPLOAD_ROLE_HEADER)
        .and_then(|v| v.to_str().ok());

    let result = upload::handle_upload(state.store.as_ref(), &parts, fallback_role).await?;
    Ok(Json(result))
}
