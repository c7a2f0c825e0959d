//! API request handlers
//!
//! Split into submodules by endpoint family:
//! - `upload` — multipart ingestion behind POST /api/upload
//! - `images` — captcha image listing
//! - `site_config` — reveal-page copy read/write
//! - `delete` — delete-by-URL
//! - `blobs` — public object serving
//! - `status` — health check

mod blobs;
mod delete;
mod images;
mod site_config;
mod status;
mod upload;

use super::auth::AdminCredential;
use crate::storage::BlobStore;
use std::sync::Arc;

pub use blobs::serve_blob;
pub use delete::delete_blob;
pub use images::{list_images, ImageEntry, ImageListing};
pub use site_config::{get_site_config, save_site_config};
pub use status::{health_check, HealthResponse};
pub use upload::{upload_file, UPLOAD_ROLE_HEADER};

/// Application state shared across handlers
pub struct AppState {
    pub store: Arc<dyn BlobStore>,
    pub admin: AdminCredential,
}
