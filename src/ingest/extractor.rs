//! Product field extraction with ordered selector fallback chains.
//!
//! Fetching is delegated to [`FetchSession`]; everything after the body
//! arrives is synchronous and pure, so the parsing paths are testable
//! against fixture HTML without a network.

use std::sync::LazyLock;
use std::time::Duration;

use rand::Rng;
use regex_lite::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::warn;
use url::Url;

use super::fetcher::FetchSession;
use super::selectors;
use crate::config::ScrapingConfig;
use crate::store::models::ProductFields;

static FIRST_DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+\.?\d*)").unwrap());
static COUNT_WITH_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:,\d+)*)").unwrap());
static LOW_RES_SIZE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_(SY|SX)\d+_").unwrap());

/// Errors from page extraction
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("page returned status {0}")]
    BadStatus(u16),
    #[error("essential product fields missing (title or price)")]
    MissingEssentials,
    #[error("all {attempts} attempts failed, last error: {last_error}")]
    AttemptsExhausted { attempts: u32, last_error: String },
}

/// Fetches product pages and pulls structured fields out of them.
pub struct PageExtractor {
    config: ScrapingConfig,
}

impl PageExtractor {
    pub fn new(config: ScrapingConfig) -> Self {
        Self { config }
    }

    /// Extract product fields from a resolved product URL, with retry.
    ///
    /// Each attempt sleeps a randomized pre-fetch delay, builds a fresh
    /// session with fresh headers, and fails on any non-2xx response or
    /// missing essential field. Between attempts the backoff window grows
    /// with the attempt number. A partial product is never returned.
    pub async fn extract(&self, url: &Url) -> Result<ProductFields, ExtractError> {
        let url = self.with_affiliate_tag(url);
        let mut last_error = String::new();

        for attempt in 1..=self.config.max_retries {
            let delay = {
                let mut rng = rand::thread_rng();
                rng.gen_range(self.config.fetch_delay_min_ms..=self.config.fetch_delay_max_ms)
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;

            match self.attempt(&url).await {
                Ok(fields) => return Ok(fields),
                Err(e) => {
                    warn!(attempt, error = %e, url = %url, "Extraction attempt failed");
                    last_error = e.to_string();
                }
            }

            if attempt < self.config.max_retries {
                let scale = u64::from(attempt);
                let backoff = {
                    let mut rng = rand::thread_rng();
                    rng.gen_range(
                        self.config.retry_backoff_min_secs * scale
                            ..=self.config.retry_backoff_max_secs * scale,
                    )
                };
                tokio::time::sleep(Duration::from_secs(backoff)).await;
            }
        }

        Err(ExtractError::AttemptsExhausted {
            attempts: self.config.max_retries,
            last_error,
        })
    }

    async fn attempt(&self, url: &Url) -> Result<ProductFields, ExtractError> {
        let session = FetchSession::new(&self.config)?;
        let body = session.fetch(url).await?;
        extract_fields(&body, url, &self.config)
    }

    /// Append the configured affiliate tag when the URL has none.
    fn with_affiliate_tag(&self, url: &Url) -> Url {
        if url.query_pairs().any(|(key, _)| key == "tag") {
            return url.clone();
        }
        let mut tagged = url.clone();
        tagged
            .query_pairs_mut()
            .append_pair("tag", &self.config.affiliate_tag);
        tagged
    }
}

/// Pull structured fields from a fetched page body.
///
/// Missing title or price is an extraction failure; everything else is
/// optional and simply omitted when absent.
pub fn extract_fields(
    html: &str,
    url: &Url,
    config: &ScrapingConfig,
) -> Result<ProductFields, ExtractError> {
    let document = Html::parse_document(html);

    let title = first_text(&document, &selectors::TITLE).ok_or(ExtractError::MissingEssentials)?;

    let price = first_text(&document, &selectors::PRICE)
        .and_then(|raw| clean_price(&raw, &config.currency_symbol))
        .ok_or(ExtractError::MissingEssentials)?;

    let original_price = first_text(&document, &selectors::ORIGINAL_PRICE)
        .and_then(|raw| clean_price(&raw, &config.currency_symbol));

    let discount = original_price
        .as_deref()
        .and_then(|original| discount_percent(&price, original));

    let rating = first_text(&document, &selectors::RATING).and_then(|text| first_decimal(&text));

    let reviews = first_text(&document, &selectors::REVIEWS).and_then(|text| first_count(&text));

    let description = extract_description(&document);
    let features = extract_features(&document);
    let image_url = extract_image_url(&document, url);

    Ok(ProductFields {
        title: Some(title),
        price: Some(price),
        original_price,
        discount,
        rating,
        reviews,
        description,
        features,
        image_url,
        link: Some(url.to_string()),
    })
}

/// First selector in the chain whose first match has non-empty text.
fn first_text(document: &Html, chain: &[Selector]) -> Option<String> {
    for selector in chain {
        if let Some(element) = document.select(selector).next() {
            let text = element_text(&element);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Strip everything but digits and the decimal point, then re-prefix the
/// currency symbol. Text without any digit yields nothing.
fn clean_price(raw: &str, currency_symbol: &str) -> Option<String> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if !digits.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!("{currency_symbol}{digits}"))
}

/// Integer discount percentage from a formatted price pair, or nothing
/// when either amount fails to parse. Never zero unless computed.
fn discount_percent(current: &str, original: &str) -> Option<String> {
    let current = parse_amount(current)?;
    let original = parse_amount(original)?;
    if original <= 0.0 {
        return None;
    }
    let percent = ((original - current) / original * 100.0).round() as i64;
    Some(format!("{percent}%"))
}

fn parse_amount(formatted: &str) -> Option<f64> {
    let digits: String = formatted
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().ok()
}

/// First decimal number in the text, e.g. "4.3 out of 5 stars" -> "4.3".
fn first_decimal(text: &str) -> Option<String> {
    FIRST_DECIMAL
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// First separator-grouped count in the text, e.g. "12,543 ratings".
fn first_count(text: &str) -> Option<String> {
    COUNT_WITH_SEPARATORS
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// First two matches of the first productive description chain, joined.
fn extract_description(document: &Html) -> Option<String> {
    for selector in selectors::DESCRIPTION.iter() {
        let joined = document
            .select(selector)
            .take(2)
            .map(|element| element_text(&element))
            .collect::<Vec<_>>()
            .join(" ");
        let joined = joined.trim().to_string();
        if !joined.is_empty() {
            return Some(joined);
        }
    }
    None
}

/// Up to four feature bullets from the first productive chain; trivially
/// short entries are dropped.
fn extract_features(document: &Html) -> Vec<String> {
    for selector in selectors::FEATURES.iter() {
        let features: Vec<String> = document
            .select(selector)
            .take(4)
            .map(|element| element_text(&element))
            .filter(|text| text.len() > 5)
            .collect();
        if !features.is_empty() {
            return features;
        }
    }
    Vec::new()
}

/// Best image URL: explicit high-res attribute, then the largest entry of
/// the dynamic-image JSON blob, then `src` with low-resolution size
/// tokens upgraded. The result is absolutized and forced to HTTPS.
fn extract_image_url(document: &Html, page_url: &Url) -> Option<String> {
    for selector in selectors::IMAGE.iter() {
        for element in document.select(selector) {
            if let Some(candidate) = image_candidate(&element) {
                if let Some(absolute) = absolutize_https(&candidate, page_url) {
                    return Some(absolute);
                }
            }
        }
    }
    None
}

fn image_candidate(element: &ElementRef) -> Option<String> {
    if let Some(hires) = element.value().attr("data-old-hires") {
        if !hires.is_empty() {
            return Some(hires.to_string());
        }
    }
    if let Some(blob) = element.value().attr("data-a-dynamic-image") {
        if let Some(best) = best_dynamic_image(blob) {
            return Some(best);
        }
    }
    if let Some(src) = element.value().attr("src") {
        if !src.is_empty() {
            return Some(upgrade_resolution(src));
        }
    }
    None
}

/// The dynamic-image blob maps URL -> [width, height]; pick the entry
/// with the largest declared width.
fn best_dynamic_image(json_blob: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(json_blob).ok()?;
    let entries = value.as_object()?;

    let mut best: Option<(&String, f64)> = None;
    for (url, dimensions) in entries {
        let width = dimensions
            .get(0)
            .and_then(|dimension| dimension.as_f64())
            .unwrap_or(0.0);
        if best.is_none_or(|(_, best_width)| width > best_width) {
            best = Some((url, width));
        }
    }
    best.map(|(url, _)| url.clone())
}

/// Swap known low-resolution size tokens for a larger one.
fn upgrade_resolution(src: &str) -> String {
    if src.contains("_SL160_") {
        src.replace("_SL160_", "_SL500_")
    } else if src.contains("_SY") || src.contains("_SX") {
        LOW_RES_SIZE_TOKEN.replace_all(src, "_SL500_").into_owned()
    } else {
        src.to_string()
    }
}

fn absolutize_https(candidate: &str, page_url: &Url) -> Option<String> {
    let mut url = page_url.join(candidate).ok()?;
    if url.scheme() == "http" {
        url.set_scheme("https").ok()?;
    }
    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScrapingConfig;

    const PRODUCT_PAGE: &str = r#"
        <html><body>
            <span id="productTitle"> Wipro Smart LED Bulb </span>
            <span class="a-price"><span class="a-offscreen">₹499.00</span></span>
            <span class="a-text-strike">₹998.00</span>
            <span data-hook="rating-out-of-text">4.3 out of 5</span>
            <span id="acrCustomerReviewText">12,543 ratings</span>
            <div id="feature-bullets">
                <span class="a-list-item">Works with Alexa and Google Assistant</span>
                <span class="a-list-item">16 million colours, dimmable</span>
                <span class="a-list-item">No hub required for setup</span>
                <span class="a-list-item">2 year warranty included</span>
                <span class="a-list-item">Fifth bullet never picked</span>
            </div>
            <img id="landingImage"
                 src="//m.media-amazon.com/images/I/61abc._SL160_.jpg"/>
        </body></html>
    "#;

    fn config() -> ScrapingConfig {
        ScrapingConfig::default()
    }

    fn page_url() -> Url {
        Url::parse("https://www.amazon.in/dp/B0BQJ8LN38?tag=krunalweb20-21").unwrap()
    }

    #[test]
    fn extracts_all_fields_from_product_page() {
        let fields = extract_fields(PRODUCT_PAGE, &page_url(), &config()).unwrap();
        assert_eq!(fields.title.as_deref(), Some("Wipro Smart LED Bulb"));
        assert_eq!(fields.price.as_deref(), Some("₹499.00"));
        assert_eq!(fields.original_price.as_deref(), Some("₹998.00"));
        assert_eq!(fields.discount.as_deref(), Some("50%"));
        assert_eq!(fields.rating.as_deref(), Some("4.3"));
        assert_eq!(fields.reviews.as_deref(), Some("12,543"));
        assert_eq!(fields.features.len(), 4);
        assert!(fields.description.is_some());
        assert_eq!(
            fields.image_url.as_deref(),
            Some("https://m.media-amazon.com/images/I/61abc._SL500_.jpg")
        );
        assert_eq!(fields.link.as_deref(), Some(page_url().as_str()));
    }

    #[test]
    fn missing_title_is_an_extraction_failure() {
        let html = r#"<html><body><span class="a-offscreen">₹499</span></body></html>"#;
        let err = extract_fields(html, &page_url(), &config()).unwrap_err();
        assert!(matches!(err, ExtractError::MissingEssentials));
    }

    #[test]
    fn missing_price_is_an_extraction_failure() {
        let html = r#"<html><body><span id="productTitle">Bulb</span></body></html>"#;
        let err = extract_fields(html, &page_url(), &config()).unwrap_err();
        assert!(matches!(err, ExtractError::MissingEssentials));
    }

    #[test]
    fn title_falls_back_through_the_chain() {
        let html = r#"
            <html><body>
                <h1 class="product-title">Fallback Title</h1>
                <span class="a-price"><span class="a-offscreen">₹100</span></span>
            </body></html>
        "#;
        let fields = extract_fields(html, &page_url(), &config()).unwrap();
        assert_eq!(fields.title.as_deref(), Some("Fallback Title"));
    }

    #[test]
    fn discount_is_omitted_without_original_price() {
        let html = r#"
            <html><body>
                <span id="productTitle">Bulb</span>
                <span class="a-price"><span class="a-offscreen">₹100.00</span></span>
            </body></html>
        "#;
        let fields = extract_fields(html, &page_url(), &config()).unwrap();
        assert_eq!(fields.discount, None);
        assert_eq!(fields.original_price, None);
    }

    #[test]
    fn discount_computation_rounds_to_integer_percent() {
        assert_eq!(discount_percent("₹100", "₹200").as_deref(), Some("50%"));
        assert_eq!(discount_percent("₹66.50", "₹99.90").as_deref(), Some("33%"));
        assert_eq!(discount_percent("₹100", "₹0"), None);
        assert_eq!(discount_percent("₹100", "free"), None);
    }

    #[test]
    fn price_cleaning_strips_noise() {
        assert_eq!(clean_price("  ₹1,299.00 ", "₹").as_deref(), Some("₹1299.00"));
        assert_eq!(clean_price("1,299", "₹").as_deref(), Some("₹1299"));
        assert_eq!(clean_price("out of stock", "₹"), None);
    }

    #[test]
    fn rating_parsing_tolerates_garbage() {
        assert_eq!(first_decimal("4.3 out of 5 stars").as_deref(), Some("4.3"));
        assert_eq!(first_decimal("no rating here"), None);
    }

    #[test]
    fn dynamic_image_blob_picks_largest_width() {
        let blob = r#"{
            "https://m.media-amazon.com/images/I/small.jpg": [160, 160],
            "https://m.media-amazon.com/images/I/large.jpg": [1500, 1500],
            "https://m.media-amazon.com/images/I/mid.jpg": [500, 500]
        }"#;
        assert_eq!(
            best_dynamic_image(blob).as_deref(),
            Some("https://m.media-amazon.com/images/I/large.jpg")
        );
        assert_eq!(best_dynamic_image("not json"), None);
    }

    #[test]
    fn hires_attribute_beats_dynamic_blob_and_src() {
        let html = r#"
            <html><body>
                <span id="productTitle">Bulb</span>
                <span class="a-price"><span class="a-offscreen">₹100</span></span>
                <img id="landingImage"
                     data-old-hires="https://m.media-amazon.com/images/I/hires.jpg"
                     data-a-dynamic-image='{"https://m.media-amazon.com/images/I/dyn.jpg":[1000,1000]}'
                     src="https://m.media-amazon.com/images/I/src._SL160_.jpg"/>
            </body></html>
        "#;
        let fields = extract_fields(html, &page_url(), &config()).unwrap();
        assert_eq!(
            fields.image_url.as_deref(),
            Some("https://m.media-amazon.com/images/I/hires.jpg")
        );
    }

    #[test]
    fn low_res_tokens_are_upgraded() {
        assert_eq!(
            upgrade_resolution("https://x/img._SL160_.jpg"),
            "https://x/img._SL500_.jpg"
        );
        assert_eq!(
            upgrade_resolution("https://x/img._SY300_.jpg"),
            "https://x/img._SL500_.jpg"
        );
        assert_eq!(
            upgrade_resolution("https://x/img._SX450_.jpg"),
            "https://x/img._SL500_.jpg"
        );
        assert_eq!(upgrade_resolution("https://x/img.jpg"), "https://x/img.jpg");
    }

    #[test]
    fn image_urls_are_forced_to_https() {
        let url = page_url();
        assert_eq!(
            absolutize_https("http://m.media-amazon.com/i.jpg", &url).as_deref(),
            Some("https://m.media-amazon.com/i.jpg")
        );
        assert_eq!(
            absolutize_https("/images/i.jpg", &url).as_deref(),
            Some("https://www.amazon.in/images/i.jpg")
        );
    }

    #[test]
    fn affiliate_tag_is_appended_once() {
        let extractor = PageExtractor::new(config());
        let bare = Url::parse("https://www.amazon.in/dp/B0BQJ8LN38").unwrap();
        let tagged = extractor.with_affiliate_tag(&bare);
        assert!(tagged.as_str().contains("tag=krunalweb20-21"));

        let already = Url::parse("https://www.amazon.in/dp/B0BQJ8LN38?tag=other-20").unwrap();
        let kept = extractor.with_affiliate_tag(&already);
        assert_eq!(kept.as_str(), already.as_str());
    }
}
