//! Core types shared across the upload pipeline, blob store, and API layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pathname of the reveal-page copy object in the blob store.
pub const CONFIG_PATHNAME: &str = "config.json";

/// Public identity of a newly stored object, returned to the admin panel
/// after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub url: String,
    pub role: String,
    pub pathname: String,
}

/// Result of a [`crate::storage::BlobStore::put`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub url: String,
    pub pathname: String,
}

/// One object as reported by [`crate::storage::BlobStore::list`].
#[derive(Debug, Clone, Serialize)]
pub struct BlobInfo {
    pub url: String,
    pub pathname: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// A fetched object with the content type it was stored under.
#[derive(Debug, Clone)]
pub struct BlobObject {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

/// Reveal-page copy shown after the captcha is solved.
///
/// Stored as `config.json` in the blob store and passed through the API
/// verbatim; these defaults only apply before the first save.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteConfig {
    pub title: String,
    pub hero_text: String,
    pub body_text: String,
    pub letter_text: String,
    pub signature: String,
    pub music_url: String,
    pub target_name: String,
    pub sender_name: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "You Got It!".to_string(),
            hero_text: "You successfully identified the love of my life! ❤️".to_string(),
            body_text: "Just like you found yourself in those photos, I found my happiness \
                        in you. Happy Valentine's Day! 🌹"
                .to_string(),
            letter_text: "You mean everything to me.".to_string(),
            signature: "— Forever yours 💌".to_string(),
            music_url: String::new(),
            target_name: "the HANDSOME ANGEL".to_string(),
            sender_name: "Eric".to_string(),
        }
    }
}
