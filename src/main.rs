//! Platform entry point: load configuration, wire the admin services and
//! serve the REST surface until shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;

use metaplane::http::{admin_router, AppState};
use metaplane::observability::{logging, metrics};
use metaplane::ops::AdminServices;
use metaplane::platform::{self, PlatformConfig};
use metaplane::store::{ConfigStoreConnector, FileConfigStore, InMemoryConfigStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional config file path as the first argument; defaults apply
    // when absent.
    let config = match std::env::args().nth(1) {
        Some(path) => platform::load_config(&PathBuf::from(path))?,
        None => PlatformConfig::default(),
    };

    logging::init_logging(&config.observability.log_filter);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        store_provider = %config.store.provider,
        "metaplane platform starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let default_store: Arc<dyn ConfigStoreConnector> = match config.store.provider.as_str() {
        "memory" => Arc::new(InMemoryConfigStore::new()),
        _ => Arc::new(FileConfigStore::new(PathBuf::from(&config.store.root_dir))),
    };
    let admin = Arc::new(AdminServices::with_defaults(default_store));

    let state = AppState {
        admin,
        api_key: Arc::from(config.admin.api_key.as_str()),
    };
    let app = admin_router(state);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for admin requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install shutdown handler");
    }
    tracing::info!("Shutdown signal received");
}
