//! Admin authentication: a shared secret on the `x-admin-password` header
//!
//! Modeled as an injected credential capability held in app state rather than
//! a process-global, so handlers stay testable without environment coupling.
//! Comparison is constant-time and the secret is zeroed on drop.

use super::errors::ApiError;
use axum::http::HeaderMap;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Header carrying the admin shared secret.
pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

/// Verifier for the admin shared secret.
#[derive(Clone)]
pub struct AdminCredential {
    secret: Arc<Zeroizing<String>>,
}

impl AdminCredential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Arc::new(Zeroizing::new(secret.into())),
        }
    }

    /// Constant-time comparison against the configured secret.
    pub fn verify(&self, provided: &str) -> bool {
        let secret = self.secret.as_bytes();
        let provided = provided.as_bytes();
        if secret.len() != provided.len() {
            return false;
        }
        secret.ct_eq(provided).into()
    }

    /// Gate an admin request on the `x-admin-password` header.
    pub fn require(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let provided = headers
            .get(ADMIN_PASSWORD_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if provided.is_empty() || !self.verify(provided) {
            return Err(ApiError::Unauthorized);
        }
        Ok(())
    }
}
