//! Per-attempt HTTP sessions for product-page fetches.

use std::time::Duration;

use tracing::debug;
use url::Url;

use super::extractor::ExtractError;
use super::headers;
use crate::config::ScrapingConfig;

/// One fetch session. Each extraction attempt builds a fresh session with
/// fresh randomized headers so repeated attempts do not share a
/// fingerprint; cookies persist only within the attempt.
pub struct FetchSession {
    client: reqwest::Client,
}

impl FetchSession {
    pub fn new(config: &ScrapingConfig) -> Result<Self, ExtractError> {
        let client = reqwest::Client::builder()
            .default_headers(headers::random_headers())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(10))
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch a page body; any non-2xx status is a failed attempt.
    pub async fn fetch(&self, url: &Url) -> Result<String, ExtractError> {
        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();
        debug!(status = %status, url = %url, "Fetched product page");

        if !status.is_success() {
            return Err(ExtractError::BadStatus(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}
