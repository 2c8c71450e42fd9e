//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default and maximum number of records returned by a list operation
pub const DEFAULT_QUERY_LIMIT: i64 = 1000;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Storage configuration
    pub database: DatabaseConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
    /// Maximum number of records returned by a list endpoint (1..=1000)
    pub query_limit: i64,
}

/// Which storage backend to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// MongoDB via `MONGO_URI`
    Mongo,
    /// Process memory, lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("Unknown storage backend: {}", other)),
        }
    }
}

/// Storage configuration
#[derive(Clone)]
pub struct DatabaseConfig {
    /// Selected backend
    pub backend: StorageBackend,
    /// MongoDB connection string
    pub uri: String,
    /// Database name
    pub database: String,
    /// Server selection and connect timeout
    pub timeout: Duration,
}

// The URI may embed credentials, so it never reaches the logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("backend", &self.backend)
            .field("uri", &"<redacted>")
            .field("database", &self.database)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    ///
    /// Fails only when `STORAGE_BACKEND` names an unknown backend.
    pub fn from_env() -> Result<Self, String> {
        let backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::Mongo,
        };

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8000),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                query_limit: env::var("QUERY_LIMIT")
                    .ok()
                    .and_then(|l| l.parse::<i64>().ok())
                    .unwrap_or(DEFAULT_QUERY_LIMIT)
                    .clamp(1, DEFAULT_QUERY_LIMIT),
            },
            database: DatabaseConfig {
                backend,
                uri: env::var("MONGO_URI")
                    .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
                database: env::var("MONGO_DATABASE").unwrap_or_else(|_| "chatdb".to_string()),
                timeout: Duration::from_secs(
                    env::var("MONGO_TIMEOUT_SECS")
                        .ok()
                        .and_then(|t| t.parse().ok())
                        .unwrap_or(3),
                ),
            },
        })
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
