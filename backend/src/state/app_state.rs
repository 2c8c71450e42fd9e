// Application state
// Owns the storage handle for the lifetime of the server

use crate::config::{Config, DatabaseConfig, StorageBackend, DEFAULT_QUERY_LIMIT};
use crate::db::{ChatStore, MemoryStore, MongoStore, StoreError};
use std::sync::Arc;
use tracing::info;

/// State shared by all request handlers
///
/// Cloning is cheap: the store is reference counted and is released once
/// through [`AppState::shutdown`] when the server stops.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend
    pub store: Arc<dyn ChatStore>,
    /// Maximum number of records returned by a list endpoint
    pub query_limit: i64,
}

impl AppState {
    /// Wrap an existing store
    pub fn new(store: Arc<dyn ChatStore>, query_limit: i64) -> Self {
        Self {
            store,
            query_limit: query_limit.clamp(1, DEFAULT_QUERY_LIMIT),
        }
    }

    /// State over a fresh in-memory store with the default query limit
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), DEFAULT_QUERY_LIMIT)
    }

    /// Open the store selected by the configuration
    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        let store = connect_store(&config.database).await?;
        Ok(Self::new(store, config.server.query_limit))
    }

    /// Release the storage handle
    pub async fn shutdown(&self) {
        self.store.shutdown().await;
    }
}

/// Open the configured storage backend
pub async fn connect_store(config: &DatabaseConfig) -> Result<Arc<dyn ChatStore>, StoreError> {
    match config.backend {
        StorageBackend::Mongo => Ok(Arc::new(MongoStore::connect(config).await?)),
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
