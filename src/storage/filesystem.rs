//! Filesystem blob store with sidecar JSON metadata
//!
//! Storage layout:
//! ```text
//! {root}/{pathname}        # object bytes
//! {root}/{pathname}.meta   # sidecar JSON: content type, size, upload time
//! ```
//!
//! Public URLs point at this service's own `/blobs/{pathname}` route, which is
//! what makes filesystem-backed objects "publicly readable" in the blob store
//! sense. Writes go through a hidden temp file and a rename so a crashed
//! upload never leaves a half-written object visible.

use super::traits::{BlobStore, StorageError};
use crate::types::{BlobInfo, BlobObject, StoredBlob};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument, warn};

const META_SUFFIX: &str = ".meta";

/// Sidecar metadata written next to each object.
#[derive(Debug, Serialize, Deserialize)]
struct SidecarMeta {
    content_type: String,
    size: u64,
    uploaded_at: DateTime<Utc>,
}

/// Filesystem blob store rooted at a data directory.
pub struct FilesystemStore {
    root: PathBuf,
    public_base_url: String,
}

impl FilesystemStore {
    /// Create a new filesystem store, ensuring the root directory exists.
    ///
    /// `public_base_url` is the externally reachable base of this service
    /// (e.g. `http://127.0.0.1:8080`); minted URLs are
    /// `{public_base_url}/blobs/{pathname}`.
    pub async fn new(root: PathBuf, public_base_url: String) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Reject pathnames that would escape the root or collide with the
    /// sidecar/temp naming scheme.
    fn checked_path(&self, pathname: &str) -> Result<PathBuf, StorageError> {
        let invalid = pathname.is_empty()
            || pathname.contains('\0')
            || pathname.contains('\\')
            || pathname.ends_with(META_SUFFIX)
            || pathname
                .split('/')
                .any(|seg| seg.is_empty() || seg == ".." || seg.starts_with('.'));
        if invalid {
            return Err(StorageError::InvalidPathname(pathname.to_string()));
        }
        Ok(self.root.join(pathname))
    }

    fn url_for(&self, pathname: &str) -> String {
        let encoded: Vec<String> = pathname
            .split('/')
            .map(|seg| urlencoding::encode(seg).into_owned())
            .collect();
        format!("{}/blobs/{}", self.public_base_url, encoded.join("/"))
    }

    /// Pathname addressed by a public URL minted by this store.
    fn pathname_for(&self, url: &str) -> Result<String, StorageError> {
        let prefix = format!("{}/blobs/", self.public_base_url);
        let encoded = url
            .strip_prefix(&prefix)
            .ok_or_else(|| StorageError::ForeignUrl(url.to_string()))?;
        let segments: Result<Vec<String>, _> = encoded
            .split('/')
            .map(|seg| urlencoding::decode(seg).map(|s| s.into_owned()))
            .collect();
        segments
            .map(|segs| segs.join("/"))
            .map_err(|_| StorageError::ForeignUrl(url.to_string()))
    }

    /// Write bytes to `path` atomically via a hidden temp file in the same
    /// directory. Dot-prefixed names are invisible to `list`.
    async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StorageError> {
        let parent = path.parent().ok_or_else(|| {
            StorageError::Other(format!("path has no parent: {}", path.display()))
        })?;
        fs::create_dir_all(parent).await?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::Other(format!("invalid path: {}", path.display())))?;
        let tmp = parent.join(format!(".tmp-{file_name}"));

        fs::write(&tmp, data).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Recursively collect object pathnames under `dir`, skipping sidecar and
    /// hidden files.
    fn collect_objects<'a>(
        root: &'a Path,
        dir: &'a Path,
        out: &'a mut Vec<String>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), StorageError>> + Send + 'a>>
    {
        Box::pin(async move {
            let mut entries = fs::read_dir(dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let ft = entry.file_type().await?;
                if ft.is_dir() {
                    Self::collect_objects(root, &path, out).await?;
                    continue;
                }
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if name.starts_with('.') || name.ends_with(META_SUFFIX) {
                    continue;
                }
                if let Ok(relative) = path.strip_prefix(root) {
                    let pathname: Vec<&str> = relative
                        .components()
                        .filter_map(|c| c.as_os_str().to_str())
                        .collect();
                    out.push(pathname.join("/"));
                }
            }
            Ok(())
        })
    }

    async fn read_sidecar(&self, pathname: &str) -> Option<SidecarMeta> {
        let meta_path = self.root.join(format!("{pathname}{META_SUFFIX}"));
        let bytes = fs::read(&meta_path).await.ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(meta) => Some(meta),
            Err(e) => {
                warn!("Unreadable sidecar for {}: {}", pathname, e);
                None
            }
        }
    }
}

#[async_trait]
impl BlobStore for FilesystemStore {
    #[instrument(skip(self, data))]
    async fn put(
        &self,
        pathname: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<StoredBlob, StorageError> {
        let path = self.checked_path(pathname)?;

        let meta = SidecarMeta {
            content_type: content_type.to_string(),
            size: data.len() as u64,
            uploaded_at: Utc::now(),
        };

        Self::write_atomic(&path, data).await?;
        let meta_path = self.root.join(format!("{pathname}{META_SUFFIX}"));
        Self::write_atomic(&meta_path, &serde_json::to_vec(&meta)?).await?;

        debug!("Wrote {} ({} bytes)", pathname, data.len());
        Ok(StoredBlob {
            url: self.url_for(pathname),
            pathname: pathname.to_string(),
        })
    }

    #[instrument(skip(self))]
    async fn get(&self, pathname: &str) -> Result<BlobObject, StorageError> {
        let path = self.checked_path(pathname)?;
        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(pathname.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let content_type = self.read_sidecar(pathname).await.map(|m| m.content_type);
        Ok(BlobObject { data, content_type })
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<BlobInfo>, StorageError> {
        let mut pathnames = Vec::new();
        Self::collect_objects(&self.root, &self.root, &mut pathnames).await?;
        pathnames.sort();

        let mut blobs = Vec::with_capacity(pathnames.len());
        for pathname in pathnames {
            let (size, uploaded_at) = match self.read_sidecar(&pathname).await {
                Some(meta) => (meta.size, meta.uploaded_at),
                // Sidecar lost or predates this store: fall back to fs metadata.
                None => {
                    let md = fs::metadata(self.root.join(&pathname)).await?;
                    let modified = md
                        .modified()
                        .map(DateTime::<Utc>::from)
                        .unwrap_or_else(|_| Utc::now());
                    (md.len(), modified)
                }
            };
            blobs.push(BlobInfo {
                url: self.url_for(&pathname),
                pathname,
                size,
                uploaded_at,
            });
        }
        Ok(blobs)
    }

    #[instrument(skip(self))]
    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let pathname = self.pathname_for(url)?;
        let path = self.checked_path(&pathname)?;

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(pathname));
            }
            Err(e) => return Err(e.into()),
        }

        let meta_path = self.root.join(format!("{pathname}{META_SUFFIX}"));
        match fs::remove_file(&meta_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        debug!("Deleted {}", pathname);
        Ok(())
    }
}
