#![allow(dead_code)]
//! Shared helpers for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use dealbot::config::{ScrapingConfig, StoreConfig};
use dealbot::store::models::ProductFields;
use dealbot::store::ProductStore;

/// In-memory store. A single pool connection keeps every operation on the
/// same SQLite instance.
pub async fn memory_store() -> ProductStore {
    ProductStore::connect(&memory_store_config())
        .await
        .expect("in-memory store")
}

pub fn memory_store_config() -> StoreConfig {
    StoreConfig {
        database_url: "sqlite::memory:".to_string(),
        max_connections: 1,
        acquire_timeout_secs: 5,
        reconnect_timeout_secs: 5,
    }
}

/// Scraping config with zeroed delays pointed at a loopback test server.
pub fn fast_scraping_config(addr: SocketAddr) -> ScrapingConfig {
    ScrapingConfig {
        marketplace_domains: vec!["127.0.0.1".to_string()],
        shortlink_domains: Vec::new(),
        marketplace_base_url: format!("http://{addr}"),
        affiliate_tag: "test-21".to_string(),
        currency_symbol: "₹".to_string(),
        max_retries: 3,
        fetch_delay_min_ms: 0,
        fetch_delay_max_ms: 0,
        retry_backoff_min_secs: 0,
        retry_backoff_max_secs: 0,
        request_timeout_secs: 5,
    }
}

/// Minimal scraped product used by store tests.
pub fn sample_fields(title: &str) -> ProductFields {
    ProductFields {
        title: Some(title.to_string()),
        price: Some("₹499".to_string()),
        ..Default::default()
    }
}

/// Serve a canned HTTP response on a loopback port. Returns the bound
/// address and a counter of connections handled; every fetch attempt
/// builds a fresh client, so attempts and connections match one to one.
pub async fn spawn_page_server(
    status_line: &'static str,
    body: String,
) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test server");
    let addr = listener.local_addr().expect("test server addr");
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_for_server = hits.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            hits_for_server.fetch_add(1, Ordering::SeqCst);
            let body = body.clone();
            tokio::spawn(async move {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;
                let response = format!(
                    "HTTP/1.1 {status_line}\r\n\
                     Content-Type: text/html; charset=utf-8\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, hits)
}

/// A representative product page for end-to-end ingestion.
pub const BULB_PAGE: &str = r#"
<html><head><title>Wipro Smart LED Bulb</title></head><body>
    <span id="productTitle"> Wipro Smart LED Bulb </span>
    <span class="a-price"><span class="a-offscreen">₹499.00</span></span>
    <span class="a-text-strike">₹998.00</span>
    <span data-hook="rating-out-of-text">4.3 out of 5</span>
    <span id="acrCustomerReviewText">12,543 ratings</span>
    <div id="feature-bullets">
        <span class="a-list-item">Works with Alexa and Google Assistant</span>
        <span class="a-list-item">16 million colours, dimmable</span>
    </div>
    <img id="landingImage" src="https://m.media-amazon.com/images/I/61abc._SL160_.jpg"/>
</body></html>
"#;
