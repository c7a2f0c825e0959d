//! Upload routing: select the file part, resolve its role, write to the store.

use crate::multipart::Part;
use crate::storage::{BlobStore, StorageError};
use crate::types::UploadResult;
use chrono::Utc;
use std::fmt;
use thiserror::Error;
use tracing::info;

/// Classification of an upload, doubling as its storage-key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// A photo of the person the captcha is about.
    Target,
    /// A decoy photo shown alongside targets.
    Distractor,
    /// Background music for the reveal page.
    Audio,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Target => "target",
            Role::Distractor => "distractor",
            Role::Audio => "audio",
        }
    }

    /// Parse a declared role. Unknown values are rejected, never defaulted.
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "target" => Some(Role::Target),
            "distractor" => Some(Role::Distractor),
            "audio" => Some(Role::Audio),
            _ => None,
        }
    }

    /// Content types the admin panel may upload under this role.
    pub fn allowed_content_types(&self) -> &'static [&'static str] {
        match self {
            Role::Audio => &["audio/mpeg", "audio/mp3", "audio/wav"],
            Role::Target | Role::Distractor => &["image/jpeg", "image/png", "image/webp"],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from the upload routing stage.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file provided")]
    NoFileProvided,

    #[error("Invalid upload role: {0}")]
    InvalidRole(String),

    #[error("Content type {content_type} is not allowed for role {role}")]
    UnsupportedContentType { role: Role, content_type: String },

    #[error("Storage write failed: {0}")]
    Storage(#[from] StorageError),
}

/// First part carrying a non-empty filename.
pub fn select_file_part(parts: &[Part]) -> Option<&Part> {
    parts.iter().find(|p| p.is_file())
}

/// Resolve the upload role.
///
/// An explicit `role` form field wins, then the caller-supplied fallback
/// (the `x-upload-role` request header), then [`Role::Distractor`]. A role
/// that is declared but not in the allow-list is an error, not a default.
pub fn resolve_role(parts: &[Part], fallback: Option<&str>) -> Result<Role, UploadError> {
    let declared = parts
        .iter()
        .find(|p| p.name.as_deref() == Some("role") && !p.is_file())
        .and_then(|p| p.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| fallback.map(str::trim).filter(|s| !s.is_empty()));

    match declared {
        None => Ok(Role::Distractor),
        Some(value) => {
            Role::parse(value).ok_or_else(|| UploadError::InvalidRole(value.to_string()))
        }
    }
}

/// Derive the storage key for an upload.
///
/// The millisecond prefix only avoids key collisions between repeated uploads
/// of identically named files; it carries no ordering guarantee.
pub fn storage_key(role: Role, filename: &str) -> String {
    format!("{}/{}-{}", role.as_str(), Utc::now().timestamp_millis(), filename)
}

/// Route decoded parts to the blob store.
///
/// All validation happens before the store is touched: either exactly one
/// object is written or none is.
pub async fn handle_upload(
    store: &dyn BlobStore,
    parts: &[Part],
    fallback_role: Option<&str>,
) -> Result<UploadResult, UploadError> {
    let file = select_file_part(parts).ok_or(UploadError::NoFileProvided)?;
    let role = resolve_role(parts, fallback_role)?;

    if !role
        .allowed_content_types()
        .contains(&file.content_type.as_str())
    {
        return Err(UploadError::UnsupportedContentType {
            role,
            content_type: file.content_type.clone(),
        });
    }

    let filename = file.filename.as_deref().unwrap_or_default();
    let key = storage_key(role, filename);
    let stored = store.put(&key, &file.data, &file.content_type).await?;

    info!(
        "Stored {} upload as {} ({} bytes, {})",
        role,
        stored.pathname,
        file.data.len(),
        file.content_type
    );

    Ok(UploadResult {
        url: stored.url,
        role: role.as_str().to_string(),
        pathname: stored.pathname,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BlobInfo, BlobObject, StoredBlob};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every put; panics are avoided so tests can assert on state.
    #[derive(Default)]
    struct RecordingStore {
        puts: Mutex<Vec<(String, Vec<u8>, String)>>,
        fail_puts: bool,
    }

    #[async_trait]
    impl BlobStore for RecordingStore {
        async fn put(
            &self,
            pathname: &str,
            data: &[u8],
            content_type: &str,
        ) -> Result<StoredBlob, StorageError> {
            if self.fail_puts {
                return Err(StorageError::Other("backend unavailable".to_string()));
            }
            self.puts.lock().unwrap().push((
                pathname.to_string(),
                data.to_vec(),
                content_type.to_string(),
            ));
            Ok(StoredBlob {
                url: format!("http://store.test/blobs/{pathname}"),
                pathname: pathname.to_string(),
            })
        }

        async fn get(&self, pathname: &str) -> Result<BlobObject, StorageError> {
            Err(StorageError::NotFound(pathname.to_string()))
        }

        async fn list(&self) -> Result<Vec<BlobInfo>, StorageError> {
            Ok(Vec::new())
        }

        async fn delete(&self, _url: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn file_part(filename: &str, content_type: &str, data: &[u8]) -> Part {
        Part {
            name: Some("file".to_string()),
            filename: Some(filename.to_string()),
            content_type: content_type.to_string(),
            data: data.to_vec(),
        }
    }

    fn role_part(value: &str) -> Part {
        Part {
            name: Some("role".to_string()),
            filename: None,
            content_type: crate::multipart::DEFAULT_CONTENT_TYPE.to_string(),
            data: value.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_role_parse_and_allow_lists() {
        assert_eq!(Role::parse("target"), Some(Role::Target));
        assert_eq!(Role::parse("distractor"), Some(Role::Distractor));
        assert_eq!(Role::parse("audio"), Some(Role::Audio));
        assert_eq!(Role::parse("banner"), None);

        assert!(Role::Target.allowed_content_types().contains(&"image/jpeg"));
        assert!(Role::Audio.allowed_content_types().contains(&"audio/mpeg"));
        assert!(!Role::Audio.allowed_content_types().contains(&"image/png"));
    }

    #[test]
    fn test_resolve_role_prefers_form_field_over_header() {
        let parts = vec![role_part(" audio "), file_part("s.mp3", "audio/mpeg", b"x")];
        let role = resolve_role(&parts, Some("target")).unwrap();
        assert_eq!(role, Role::Audio);
    }

    #[test]
    fn test_resolve_role_falls_back_to_header_then_distractor() {
        let parts = vec![file_part("a.jpg", "image/jpeg", b"x")];
        assert_eq!(resolve_role(&parts, Some("target")).unwrap(), Role::Target);
        assert_eq!(resolve_role(&parts, Some("  ")).unwrap(), Role::Distractor);
        assert_eq!(resolve_role(&parts, None).unwrap(), Role::Distractor);
    }

    #[test]
    fn test_resolve_role_rejects_unknown_declared_role() {
        let parts = vec![role_part("banner"), file_part("a.jpg", "image/jpeg", b"x")];
        assert!(matches!(
            resolve_role(&parts, None),
            Err(UploadError::InvalidRole(r)) if r == "banner"
        ));
        // Header-declared roles get the same treatment.
        assert!(matches!(
            resolve_role(&[file_part("a.jpg", "image/jpeg", b"x")], Some("banner")),
            Err(UploadError::InvalidRole(_))
        ));
    }

    #[test]
    fn test_storage_key_shape() {
        let key = storage_key(Role::Target, "cat.jpg");
        let rest = key.strip_prefix("target/").expect("role prefix");
        let (millis, filename) = rest.split_once('-').expect("millis separator");
        assert!(!millis.is_empty());
        assert!(millis.bytes().all(|b| b.is_ascii_digit()));
        assert_eq!(filename, "cat.jpg");
    }

    #[tokio::test]
    async fn test_handle_upload_writes_role_qualified_key() {
        let store = RecordingStore::default();
        let parts = vec![
            role_part("target"),
            file_part("cat.jpg", "image/jpeg", b"jpegbytes"),
        ];

        let result = handle_upload(&store, &parts, None).await.unwrap();
        assert_eq!(result.role, "target");
        assert!(result.pathname.starts_with("target/"));
        assert!(result.pathname.ends_with("-cat.jpg"));
        assert!(result.url.ends_with(&result.pathname));

        let puts = store.puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].0, result.pathname);
        assert_eq!(puts[0].1, b"jpegbytes");
        assert_eq!(puts[0].2, "image/jpeg");
    }

    #[tokio::test]
    async fn test_handle_upload_no_file_part_never_touches_store() {
        let store = RecordingStore::default();
        let parts = vec![role_part("target")];

        let err = handle_upload(&store, &parts, None).await.unwrap_err();
        assert!(matches!(err, UploadError::NoFileProvided));
        assert!(store.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_handle_upload_invalid_role_rejected_before_store() {
        let store = RecordingStore::default();
        let parts = vec![
            role_part("wallpaper"),
            file_part("cat.jpg", "image/jpeg", b"x"),
        ];

        let err = handle_upload(&store, &parts, None).await.unwrap_err();
        assert!(matches!(err, UploadError::InvalidRole(_)));
        assert!(store.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_handle_upload_enforces_content_type_allow_list() {
        let store = RecordingStore::default();
        let parts = vec![
            role_part("audio"),
            file_part("song.mp3", "image/png", b"not audio"),
        ];

        let err = handle_upload(&store, &parts, None).await.unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedContentType { .. }));
        assert!(store.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_handle_upload_surfaces_store_failure() {
        let store = RecordingStore {
            fail_puts: true,
            ..Default::default()
        };
        let parts = vec![file_part("a.jpg", "image/jpeg", b"x")];

        let err = handle_upload(&store, &parts, None).await.unwrap_err();
        assert!(matches!(err, UploadError::Storage(_)));
    }

    #[tokio::test]
    async fn test_handle_upload_picks_first_file_part() {
        let store = RecordingStore::default();
        let parts = vec![
            file_part("first.png", "image/png", b"one"),
            file_part("second.png", "image/png", b"two"),
        ];

        let result = handle_upload(&store, &parts, None).await.unwrap();
        assert!(result.pathname.ends_with("-first.png"));
        assert_eq!(store.puts.lock().unwrap().len(), 1);
    }
}
