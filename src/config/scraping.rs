//! Scraping and URL resolution configuration

use serde::{Deserialize, Serialize};

/// Configuration for the URL resolver and page extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Marketplace hosts accepted as product-page URLs
    pub marketplace_domains: Vec<String>,
    /// Short-link hosts that must be expanded before validation
    pub shortlink_domains: Vec<String>,
    /// Base URL used to absolutize relative product links
    pub marketplace_base_url: String,
    /// Affiliate tag appended to product URLs when absent
    pub affiliate_tag: String,
    /// Currency symbol prefixed to normalized prices
    pub currency_symbol: String,
    /// Total fetch attempts per extraction
    pub max_retries: u32,
    /// Minimum pre-fetch delay (milliseconds)
    pub fetch_delay_min_ms: u64,
    /// Maximum pre-fetch delay (milliseconds)
    pub fetch_delay_max_ms: u64,
    /// Lower bound of the per-attempt backoff (seconds, scaled by attempt number)
    pub retry_backoff_min_secs: u64,
    /// Upper bound of the per-attempt backoff (seconds, scaled by attempt number)
    pub retry_backoff_max_secs: u64,
    /// Request timeout (seconds)
    pub request_timeout_secs: u64,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            marketplace_domains: vec!["amazon.in".to_string(), "www.amazon.in".to_string()],
            shortlink_domains: vec!["amzn.to".to_string()],
            marketplace_base_url: "https://www.amazon.in".to_string(),
            affiliate_tag: "krunalweb20-21".to_string(),
            currency_symbol: "₹".to_string(),
            max_retries: 3,
            fetch_delay_min_ms: 2000,
            fetch_delay_max_ms: 4000,
            retry_backoff_min_secs: 3,
            retry_backoff_max_secs: 6,
            request_timeout_secs: 30,
        }
    }
}
