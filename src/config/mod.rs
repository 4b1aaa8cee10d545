//! Configuration for dealbot

mod logging;
mod maintenance;
mod scraping;
mod store;

pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use maintenance::MaintenanceConfig;
pub use scraping::ScrapingConfig;
pub use store::StoreConfig;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for the dealbot process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Product store configuration
    #[serde(default)]
    pub store: StoreConfig,
    /// Scraping and URL resolution configuration
    #[serde(default)]
    pub scraping: ScrapingConfig,
    /// Periodic maintenance configuration
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    ///
    /// A missing file is not an error: every section has working defaults,
    /// so the process can start from an empty directory.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| {
                anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
            })?;
            toml::from_str(&content).map_err(|e| {
                anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
            })?
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together so the user
    /// can fix everything in one pass.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.store.database_url.is_empty() {
            errors.push("store database_url must not be empty".to_string());
        }
        if self.store.max_connections == 0 {
            errors.push("store max_connections must be positive".to_string());
        }

        if self.scraping.marketplace_domains.is_empty() {
            errors.push("scraping marketplace_domains must not be empty".to_string());
        }
        if self.scraping.max_retries == 0 {
            errors.push("scraping max_retries must be positive".to_string());
        }
        if self.scraping.fetch_delay_min_ms > self.scraping.fetch_delay_max_ms {
            errors.push("scraping fetch_delay_min_ms must be <= fetch_delay_max_ms".to_string());
        }
        if self.scraping.retry_backoff_min_secs > self.scraping.retry_backoff_max_secs {
            errors.push(
                "scraping retry_backoff_min_secs must be <= retry_backoff_max_secs".to_string(),
            );
        }
        if self.scraping.request_timeout_secs == 0 {
            errors.push("scraping request_timeout_secs must be positive".to_string());
        }

        if self.maintenance.interval_secs == 0 {
            errors.push("maintenance interval_secs must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            ))
        }
    }
}
