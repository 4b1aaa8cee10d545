//! Amazon product URL validation and canonicalization.
//!
//! Accepts marketplace and short-link hosts only. Short links are
//! expanded by following redirects; when the terminal URL is an
//! intermediate marketing page the product link is recovered from the
//! page itself. A URL without a product-id marker after expansion is
//! rejected before any extraction work happens.

use std::sync::LazyLock;
use std::time::Duration;

use regex_lite::Regex;
use scraper::Html;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use super::{headers, selectors};
use crate::config::ScrapingConfig;

static ASIN_IN_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/dp/([A-Z0-9]{10})").unwrap());

/// Errors from URL validation and expansion
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("not a recognized product URL: {0}")]
    InvalidUrl(String),
}

/// A validated product URL with its extracted identity.
#[derive(Debug, Clone)]
pub struct ResolvedUrl {
    pub url: Url,
    /// 10-character product id, used by callers for de-duplication.
    pub asin: Option<String>,
}

/// Validates and canonicalizes admin-supplied product references.
pub struct UrlResolver {
    config: ScrapingConfig,
}

impl UrlResolver {
    pub fn new(config: ScrapingConfig) -> Self {
        Self { config }
    }

    /// Resolve a raw link to its canonical product-page form.
    ///
    /// Expansion failures fall back to the raw URL; the marker check
    /// afterwards decides whether anything usable remains.
    pub async fn resolve(&self, raw: &str) -> Result<ResolvedUrl, ResolveError> {
        let url =
            Url::parse(raw.trim()).map_err(|_| ResolveError::InvalidUrl(raw.to_string()))?;
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();

        if !self.is_marketplace_host(&host) && !self.is_shortlink_host(&host) {
            return Err(ResolveError::InvalidUrl(raw.to_string()));
        }

        let expanded = if self.is_shortlink_host(&host) {
            match self.expand(&url).await {
                Ok(terminal) => terminal,
                Err(e) => {
                    warn!(url = %url, error = %e, "Short link expansion failed");
                    url
                }
            }
        } else {
            url
        };

        if !has_product_marker(&expanded) {
            return Err(ResolveError::InvalidUrl(expanded.to_string()));
        }

        let asin = extract_asin(&expanded);
        debug!(url = %expanded, asin = asin.as_deref().unwrap_or("-"), "Resolved product URL");
        Ok(ResolvedUrl { url: expanded, asin })
    }

    fn is_marketplace_host(&self, host: &str) -> bool {
        self.config
            .marketplace_domains
            .iter()
            .any(|d| host == d.as_str())
    }

    fn is_shortlink_host(&self, host: &str) -> bool {
        self.config
            .shortlink_domains
            .iter()
            .any(|d| host == d.as_str())
    }

    /// Follow redirects to the terminal URL; when that lands on a
    /// marketing/campaign page, recover the product link from the page
    /// body instead.
    async fn expand(&self, url: &Url) -> anyhow::Result<Url> {
        let client = reqwest::Client::builder()
            .default_headers(headers::random_headers())
            .timeout(Duration::from_secs(self.config.request_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        let response = client.head(url.as_str()).send().await?;
        let mut terminal = response.url().clone();

        if terminal.as_str().contains("mission") || terminal.as_str().contains("campaign") {
            let body = client.get(url.as_str()).send().await?.text().await?;
            if let Some(link) = product_link_from_page(&body, &self.config.marketplace_base_url) {
                terminal = link;
            }
        }

        debug!(expanded = %terminal, "Expanded short link");
        Ok(terminal)
    }
}

/// Whether a URL's path or query carries a product-id marker.
pub fn has_product_marker(url: &Url) -> bool {
    let path = url.path();
    if path.contains("/dp/") || path.contains("/gp/product/") {
        return true;
    }
    url.query()
        .is_some_and(|q| q.contains("dp/") || q.contains("gp/product/") || q.contains("asin="))
}

/// Extract the 10-character product id: path segment first, then the
/// `asin` query parameter.
pub fn extract_asin(url: &Url) -> Option<String> {
    if let Some(captures) = ASIN_IN_PATH.captures(url.path()) {
        return captures.get(1).map(|m| m.as_str().to_string());
    }
    url.query_pairs()
        .find(|(key, _)| key == "asin")
        .map(|(_, value)| value.into_owned())
}

/// Recover a direct product link from an intermediate page, in fixed
/// priority order: canonical link tag, social-metadata URL tag, then any
/// anchor carrying a product-id marker.
pub fn product_link_from_page(html: &str, base: &str) -> Option<Url> {
    let document = Html::parse_document(html);

    if let Some(element) = document.select(&selectors::CANONICAL_LINK).next() {
        if let Some(href) = element.value().attr("href") {
            if href.contains("dp/") {
                if let Ok(url) = Url::parse(href) {
                    return Some(url);
                }
            }
        }
    }

    if let Some(element) = document.select(&selectors::OG_URL).next() {
        if let Some(content) = element.value().attr("content") {
            if content.contains("dp/") {
                if let Ok(url) = Url::parse(content) {
                    return Some(url);
                }
            }
        }
    }

    for anchor in document.select(&selectors::ANCHORS) {
        if let Some(href) = anchor.value().attr("href") {
            if href.contains("/dp/") {
                if let Ok(url) = Url::parse(href) {
                    return Some(url);
                }
                if let Ok(base) = Url::parse(base) {
                    if let Ok(url) = base.join(href) {
                        return Some(url);
                    }
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScrapingConfig;

    fn resolver() -> UrlResolver {
        UrlResolver::new(ScrapingConfig::default())
    }

    #[tokio::test]
    async fn accepts_direct_product_url() {
        let resolved = resolver()
            .resolve("https://www.amazon.in/dp/B0BQJ8LN38?th=1")
            .await
            .unwrap();
        assert!(resolved.url.path().contains("/dp/"));
        assert_eq!(resolved.asin.as_deref(), Some("B0BQJ8LN38"));
    }

    #[tokio::test]
    async fn accepts_gp_product_url() {
        let resolved = resolver()
            .resolve("https://www.amazon.in/gp/product/B0BQJ8LN38")
            .await
            .unwrap();
        assert!(resolved.url.path().contains("/gp/product/"));
        // No /dp/ segment and no asin parameter, so no id is recovered.
        assert_eq!(resolved.asin, None);
    }

    #[tokio::test]
    async fn rejects_foreign_host() {
        let err = resolver()
            .resolve("https://example.com/dp/B0BQJ8LN38")
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn rejects_marketplace_url_without_marker() {
        let err = resolver()
            .resolve("https://www.amazon.in/deals")
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn rejects_unparsable_input() {
        assert!(resolver().resolve("not a url").await.is_err());
    }

    #[test]
    fn asin_prefers_path_over_query() {
        let url = Url::parse("https://www.amazon.in/dp/B0ABCDEF12?asin=B099999999").unwrap();
        assert_eq!(extract_asin(&url).as_deref(), Some("B0ABCDEF12"));

        let url = Url::parse("https://www.amazon.in/gp/product/x?asin=B099999999").unwrap();
        assert_eq!(extract_asin(&url).as_deref(), Some("B099999999"));
    }

    #[test]
    fn marker_detection_covers_path_and_query() {
        let with_marker = Url::parse("https://www.amazon.in/gp/product/B0BQJ8LN38").unwrap();
        assert!(has_product_marker(&with_marker));

        let without = Url::parse("https://www.amazon.in/gp/help/customer").unwrap();
        assert!(!has_product_marker(&without));
    }

    #[test]
    fn page_link_priority_is_canonical_then_meta_then_anchor() {
        let html = r#"
            <html><head>
                <link rel="canonical" href="https://www.amazon.in/dp/B0CANONICAL"/>
                <meta property="og:url" content="https://www.amazon.in/dp/B0METAURL00"/>
            </head><body>
                <a href="/dp/B0ANCHOR000">deal</a>
            </body></html>
        "#;
        let link = product_link_from_page(html, "https://www.amazon.in").unwrap();
        assert!(link.as_str().contains("B0CANONICAL"));

        let html_meta = r#"
            <html><head>
                <meta property="og:url" content="https://www.amazon.in/dp/B0METAURL00"/>
            </head><body><a href="/dp/B0ANCHOR000">deal</a></body></html>
        "#;
        let link = product_link_from_page(html_meta, "https://www.amazon.in").unwrap();
        assert!(link.as_str().contains("B0METAURL00"));

        let html_anchor = r#"<html><body><a href="/dp/B0ANCHOR000">deal</a></body></html>"#;
        let link = product_link_from_page(html_anchor, "https://www.amazon.in").unwrap();
        assert_eq!(link.as_str(), "https://www.amazon.in/dp/B0ANCHOR000");
    }

    #[test]
    fn page_without_product_link_yields_none() {
        let html = r#"<html><body><a href="/gp/help">help</a></body></html>"#;
        assert!(product_link_from_page(html, "https://www.amazon.in").is_none());
    }
}
