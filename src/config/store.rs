//! Product store configuration

use serde::{Deserialize, Serialize};

/// Configuration for the SQLite-backed product store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum pool connections
    pub max_connections: u32,
    /// Pool acquire timeout (seconds)
    pub acquire_timeout_secs: u64,
    /// Bound on how long a reconnect attempt may take (seconds)
    pub reconnect_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://dealbot.db?mode=rwc".to_string(),
            max_connections: 5,
            acquire_timeout_secs: 5,
            reconnect_timeout_secs: 10,
        }
    }
}
