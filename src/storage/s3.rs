//! S3-compatible blob store backend using the AWS SDK
//!
//! Objects live in a single bucket that deployments make publicly readable;
//! minted URLs are derived from the endpoint (path-style) or the standard AWS
//! virtual-host form, unless an explicit public base URL overrides both.

use super::traits::{BlobStore, StorageError};
use crate::config::BackendConfig;
use crate::types::{BlobInfo, BlobObject, StoredBlob};
use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

/// S3 blob store backend
pub struct S3Store {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3Store {
    /// Create a new S3 store from configuration.
    ///
    /// `public_base_url` overrides the derived object URL base when set
    /// (useful behind a CDN or when the bucket is fronted by a custom domain).
    pub async fn new(
        config: &BackendConfig,
        public_base_url: Option<String>,
    ) -> Result<Self, StorageError> {
        let BackendConfig::S3 {
            endpoint,
            bucket,
            region,
            force_path_style,
            access_key_id,
            secret_access_key,
        } = config
        else {
            return Err(StorageError::Other(
                "S3Store requires S3 configuration".to_string(),
            ));
        };

        // Require explicit credentials — never fall back to the default AWS
        // credential chain (env vars, ~/.aws/credentials, instance metadata).
        let credentials = match (access_key_id, secret_access_key) {
            (Some(key_id), Some(secret)) => {
                Credentials::new(key_id, secret, None, None, "photogate-config")
            }
            _ => {
                return Err(StorageError::Other(
                    "S3 backend requires explicit credentials: set PHOTOGATE_S3_ACCESS_KEY_ID and PHOTOGATE_S3_SECRET_ACCESS_KEY".to_string(),
                ));
            }
        };

        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(region.clone()))
            .credentials_provider(credentials)
            .force_path_style(*force_path_style);

        if let Some(ep) = endpoint {
            builder = builder.endpoint_url(ep);
        }

        let public_base_url = public_base_url
            .unwrap_or_else(|| derive_public_base_url(endpoint.as_deref(), bucket, region))
            .trim_end_matches('/')
            .to_string();

        debug!("S3Store initialized (bucket: {})", bucket);
        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: bucket.clone(),
            public_base_url,
        })
    }

    fn url_for(&self, pathname: &str) -> String {
        join_object_url(&self.public_base_url, pathname)
    }

    /// Pathname addressed by a public URL minted by this store.
    fn pathname_for(&self, url: &str) -> Result<String, StorageError> {
        strip_object_url(&self.public_base_url, url)
            .ok_or_else(|| StorageError::ForeignUrl(url.to_string()))
    }

    /// Map an SDK error to a StorageError, detecting missing keys.
    fn classify_sdk_error(pathname: &str, e: &impl std::fmt::Debug, context: &str) -> StorageError {
        let debug_str = format!("{:?}", e);
        if debug_str.contains("NoSuchKey") {
            return StorageError::NotFound(pathname.to_string());
        }
        StorageError::S3(format!("{} failed: {:?}", context, e))
    }
}

/// Default public URL base for a bucket.
fn derive_public_base_url(endpoint: Option<&str>, bucket: &str, region: &str) -> String {
    match endpoint {
        // Path-style against the configured endpoint (MinIO, LocalStack, ...)
        Some(ep) => format!("{}/{}", ep.trim_end_matches('/'), bucket),
        None => format!("https://{}.s3.{}.amazonaws.com", bucket, region),
    }
}

/// `{base}/{pathname}` with each segment percent-encoded.
fn join_object_url(base: &str, pathname: &str) -> String {
    let encoded: Vec<String> = pathname
        .split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect();
    format!("{}/{}", base, encoded.join("/"))
}

/// Inverse of [`join_object_url`]; `None` when the URL has a different base.
fn strip_object_url(base: &str, url: &str) -> Option<String> {
    let encoded = url.strip_prefix(base)?.strip_prefix('/')?;
    let segments: Result<Vec<String>, _> = encoded
        .split('/')
        .map(|seg| urlencoding::decode(seg).map(|s| s.into_owned()))
        .collect();
    segments.ok().map(|segs| segs.join("/"))
}

#[async_trait]
impl BlobStore for S3Store {
    #[instrument(skip(self, data))]
    async fn put(
        &self,
        pathname: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<StoredBlob, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(pathname)
            .body(ByteStream::from(data.to_vec()))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| Self::classify_sdk_error(pathname, &e, "PutObject"))?;

        debug!("Wrote s3://{}/{} ({} bytes)", self.bucket, pathname, data.len());
        Ok(StoredBlob {
            url: self.url_for(pathname),
            pathname: pathname.to_string(),
        })
    }

    #[instrument(skip(self))]
    async fn get(&self, pathname: &str) -> Result<BlobObject, StorageError> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(pathname)
            .send()
            .await
            .map_err(|e| Self::classify_sdk_error(pathname, &e, "GetObject"))?;

        let content_type = resp.content_type().map(str::to_string);
        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| StorageError::S3(format!("GetObject body read failed: {e}")))?
            .into_bytes()
            .to_vec();

        Ok(BlobObject { data, content_type })
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<BlobInfo>, StorageError> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .into_paginator()
            .send();

        let mut blobs = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| Self::classify_sdk_error("", &e, "ListObjectsV2"))?;
            for object in page.contents() {
                let Some(key) = object.key() else { continue };
                let uploaded_at = object
                    .last_modified()
                    .and_then(|dt| DateTime::<Utc>::from_timestamp(dt.secs(), dt.subsec_nanos()))
                    .unwrap_or_else(Utc::now);
                blobs.push(BlobInfo {
                    url: self.url_for(key),
                    pathname: key.to_string(),
                    size: object.size().unwrap_or_default().max(0) as u64,
                    uploaded_at,
                });
            }
        }
        blobs.sort_by(|a, b| a.pathname.cmp(&b.pathname));
        Ok(blobs)
    }

    #[instrument(skip(self))]
    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let pathname = self.pathname_for(url)?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&pathname)
            .send()
            .await
            .map_err(|e| Self::classify_sdk_error(&pathname, &e, "DeleteObject"))?;
        debug!("Deleted s3://{}/{}", self.bucket, pathname);
        Ok(())
    }
}
