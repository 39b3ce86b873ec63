pub mod analytics; // Dashboard aggregation + revision-keyed cache
pub mod api; // REST router over the mock store
pub mod auth; // Mock authentication
pub mod backend; // Store / REST client seam
pub mod catalog; // Read-only drug reference
pub mod client; // reqwest client for /api/v1
pub mod config;
pub mod db;
pub mod integrity; // Referential checks across collections
pub mod listing; // List-screen search, filter, sort
pub mod models;
pub mod store; // Mock Data Store

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::ApiContext;
use crate::auth::AuthService;
use crate::config::{AuthLatency, SeedPolicy, StoreOptions};
use crate::db::{KeyValueStorage, MemoryStorage, SqliteStorage};
use crate::store::{MockStore, SeedData, StoreError};

/// Failures that stop `run()`.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Invalid bind address: {0}")]
    BindAddr(#[from] std::net::AddrParseError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Install the global `fmt` subscriber. `RUST_LOG` wins over the default
/// filter. Later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}

/// Serve the mock backend on `MEDAI_BIND_ADDR` until Ctrl-C.
///
/// Records persist in `~/MedAI/medai.db`, seeded with the demo data on first
/// start. Without a usable home directory everything lives in memory.
pub async fn run() -> Result<(), RunError> {
    init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let addr = config::bind_addr()?;
    let storage = open_storage();

    let options = StoreOptions {
        seed_policy: SeedPolicy::IfAbsent,
        ..StoreOptions::instant()
    };
    let store = MockStore::open(storage.clone(), SeedData::demo(), options)?;
    let auth = AuthService::new(storage, AuthLatency::none())?;
    let ctx = ApiContext::new(Arc::new(store), Arc::new(auth));

    let mut server = api::start_api_server(ctx, addr).await?;
    tracing::info!(base_url = %server.session.base_url(), "Serving");

    tokio::signal::ctrl_c().await?;
    server.shutdown();
    server.stopped().await;
    Ok(())
}

/// SQLite under the app data directory, or memory when that is unavailable.
fn open_storage() -> Arc<dyn KeyValueStorage> {
    let Some(path) = config::storage_path() else {
        tracing::warn!("No home directory, keeping records in memory");
        return Arc::new(MemoryStorage::new());
    };
    if let Some(dir) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(dir) {
            tracing::warn!(dir = %dir.display(), "Cannot create data directory: {e}");
            return Arc::new(MemoryStorage::new());
        }
    }
    match SqliteStorage::open(&path) {
        Ok(storage) => {
            tracing::info!(path = %path.display(), "Opened record storage");
            Arc::new(storage)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "Cannot open storage, using memory: {e}");
            Arc::new(MemoryStorage::new())
        }
    }
}
