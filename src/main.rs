//! photogate — photo-identification gift gate over a generic blob store

use clap::Parser;
use photogate::api::{handlers::AppState, router, AdminCredential};
use photogate::config::{BackendConfig, Config};
use photogate::storage::{BlobStore, FilesystemStore, S3Store};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// photogate - photo-identification gift gate
#[derive(Parser, Debug)]
#[command(name = "photogate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Listen address (overrides config)
    #[arg(short, long, value_name = "ADDR")]
    listen: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose {
        "photogate=trace,tower_http=trace"
    } else {
        "photogate=debug,tower_http=debug"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from file if specified, otherwise use default loading
    let mut config = if let Some(ref path) = cli.config {
        Config::from_file(path)?
    } else {
        Config::load()
    };

    // CLI overrides
    if let Some(ref addr) = cli.listen {
        config.listen_addr = addr.parse()?;
    }

    let admin_password = config.ensure_admin_password();

    info!("Starting photogate server");
    info!("  Listen address: {}", config.listen_addr);

    match &config.backend {
        BackendConfig::Filesystem { path } => {
            info!("  Backend: Filesystem");
            info!("  Data directory: {:?}", path);
        }
        BackendConfig::S3 {
            endpoint,
            bucket,
            region,
            ..
        } => {
            info!("  Backend: S3");
            info!("  Bucket: {}", bucket);
            info!("  Region: {}", region);
            if let Some(ep) = endpoint {
                info!("  Endpoint: {}", ep);
            }
        }
    }

    info!(
        "  Max upload size: {} MB",
        config.max_upload_size / 1024 / 1024
    );
    if config.public_base_url.is_none() {
        warn!(
            "  No public_base_url configured — minting blob URLs from the listen address ({})",
            config.public_base_url_or_default()
        );
    }

    let store: Arc<dyn BlobStore> = match &config.backend {
        BackendConfig::Filesystem { path } => Arc::new(
            FilesystemStore::new(path.clone(), config.public_base_url_or_default()).await?,
        ),
        BackendConfig::S3 { .. } => {
            Arc::new(S3Store::new(&config.backend, config.public_base_url.clone()).await?)
        }
    };

    let state = Arc::new(AppState {
        store,
        admin: AdminCredential::new(admin_password),
    });
    let app = router(state, config.max_upload_size);

    // Start server with graceful shutdown
    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!("photogate listening on http://{}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Handle shutdown signals (SIGINT, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
