//! Configuration for the photogate server

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address to listen on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Blob store backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Admin shared secret checked on the `x-admin-password` header.
    /// Set via PHOTOGATE_ADMIN_PASSWORD (or legacy ADMIN_PASSWORD) env var,
    /// or auto-generated on startup.
    #[serde(default)]
    pub admin_password: Option<String>,

    /// Maximum accepted upload body size in bytes
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,

    /// Externally reachable base URL of this service. Used to mint public
    /// blob URLs for the filesystem backend (and to override S3-derived URLs).
    /// Defaults to `http://{listen_addr}`.
    #[serde(default)]
    pub public_base_url: Option<String>,

    /// Log level filter string.
    /// Set via config file or PHOTOGATE_LOG_LEVEL env var. Overridden by RUST_LOG.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Blob store backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Filesystem backend for local use/development
    Filesystem {
        /// Directory for blob storage
        path: PathBuf,
    },

    /// S3-compatible backend for production use
    S3 {
        /// S3 endpoint URL (for MinIO, LocalStack, or custom S3-compatible services)
        /// If not specified, uses the AWS default endpoint
        #[serde(default)]
        endpoint: Option<String>,

        /// Bucket holding all blobs; must be publicly readable
        bucket: String,

        /// AWS region
        #[serde(default = "default_region")]
        region: String,

        /// Use path-style URLs (required for MinIO, LocalStack)
        #[serde(default = "default_force_path_style")]
        force_path_style: bool,

        /// Access key ID (explicit credentials required)
        #[serde(default)]
        access_key_id: Option<String>,

        /// Secret access key (explicit credentials required)
        #[serde(default)]
        secret_access_key: Option<String>,
    },
}

// Default value functions for serde
fn default_listen_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().unwrap()
}

fn default_max_upload_size() -> u64 {
    25 * 1024 * 1024 // 25MB — resized photos plus a reveal-page song
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_force_path_style() -> bool {
    true
}

fn default_log_level() -> String {
    "photogate=debug,tower_http=debug".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Filesystem {
            path: PathBuf::from("./data"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            backend: BackendConfig::default(),
            admin_password: None,
            max_upload_size: default_max_upload_size(),
            public_base_url: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("PHOTOGATE_LISTEN_ADDR") {
            if let Ok(parsed) = addr.parse() {
                config.listen_addr = parsed;
            }
        }

        // S3 backend when a bucket is configured, filesystem otherwise
        if let Ok(bucket) = std::env::var("PHOTOGATE_S3_BUCKET") {
            config.backend = BackendConfig::S3 {
                endpoint: std::env::var("PHOTOGATE_S3_ENDPOINT").ok(),
                bucket,
                region: std::env::var("PHOTOGATE_S3_REGION")
                    .unwrap_or_else(|_| default_region()),
                force_path_style: std::env::var("PHOTOGATE_S3_PATH_STYLE")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(true),
                access_key_id: std::env::var("PHOTOGATE_S3_ACCESS_KEY_ID").ok(),
                secret_access_key: std::env::var("PHOTOGATE_S3_SECRET_ACCESS_KEY").ok(),
            };
        } else if let Ok(dir) = std::env::var("PHOTOGATE_DATA_DIR") {
            config.backend = BackendConfig::Filesystem {
                path: PathBuf::from(dir),
            };
        }

        if let Ok(size) = std::env::var("PHOTOGATE_MAX_UPLOAD_SIZE") {
            if let Ok(parsed) = size.parse() {
                config.max_upload_size = parsed;
            }
        }

        config.admin_password = std::env::var("PHOTOGATE_ADMIN_PASSWORD")
            .or_else(|_| std::env::var("ADMIN_PASSWORD"))
            .ok();

        config.public_base_url = std::env::var("PHOTOGATE_PUBLIC_BASE_URL").ok();

        if let Ok(level) = std::env::var("PHOTOGATE_LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Load configuration from file if it exists, otherwise from environment
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("PHOTOGATE_CONFIG") {
            if let Ok(config) = Self::from_file(&path) {
                return config;
            }
        }

        for path in &["photogate.toml", "/etc/photogate/config.toml"] {
            if std::path::Path::new(path).exists() {
                if let Ok(config) = Self::from_file(path) {
                    return config;
                }
            }
        }

        Self::from_env()
    }

    /// Ensure an admin password is set, generating one when it is not.
    ///
    /// The generated password is printed to stderr and never persisted, so an
    /// unset deployment gets a fresh secret on every start.
    pub fn ensure_admin_password(&mut self) -> String {
        if let Some(ref password) = self.admin_password {
            return password.clone();
        }

        use rand::Rng;
        let mut rng = rand::thread_rng();
        let password: String = (0..16)
            .map(|_| {
                let idx = rng.gen_range(0..62);
                match idx {
                    0..=9 => (b'0' + idx) as char,
                    10..=35 => (b'a' + idx - 10) as char,
                    _ => (b'A' + idx - 36) as char,
                }
            })
            .collect();

        eprintln!();
        eprintln!("╔══════════════════════════════════════════════════════════╗");
        eprintln!("║  ADMIN PASSWORD (generated — save this!)                ║");
        eprintln!("║                                                          ║");
        eprintln!("║  Password: {:<45}║", password);
        eprintln!("║                                                          ║");
        eprintln!("║  Set PHOTOGATE_ADMIN_PASSWORD to skip auto-generation.  ║");
        eprintln!("╚══════════════════════════════════════════════════════════╝");
        eprintln!();

        self.admin_password = Some(password.clone());
        password
    }

    /// Base URL under which this service is reachable from the outside.
    pub fn public_base_url_or_default(&self) -> String {
        self.public_base_url
            .clone()
            .unwrap_or_else(|| format!("http://{}", self.listen_addr))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
