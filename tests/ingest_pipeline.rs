//! End-to-end ingestion tests against a loopback page server.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use dealbot::catalog::CatalogCache;
use dealbot::error::IngestError;
use dealbot::ingest::IngestPipeline;

use common::{fast_scraping_config, memory_store, spawn_page_server, BULB_PAGE};

#[tokio::test]
async fn end_to_end_ingestion_populates_store_and_cache() {
    let (addr, _hits) = spawn_page_server("200 OK", BULB_PAGE.to_string()).await;
    let store = Arc::new(memory_store().await);
    let cache = Arc::new(CatalogCache::new());
    let pipeline = IngestPipeline::new(fast_scraping_config(addr), store.clone(), cache.clone());

    let url = format!("http://{addr}/dp/B0BQJ8LN38");
    let report = pipeline.ingest(&url, "home").await.unwrap();
    assert_eq!(report.category, "Home");
    assert_eq!(report.asin.as_deref(), Some("B0BQJ8LN38"));

    let products = store.get_products_by_category("Home").await.unwrap();
    assert_eq!(products.len(), 1);
    let product = &products[0];
    assert!(!product.id.is_empty());
    assert_eq!(product.title, "Wipro Smart LED Bulb");
    assert_eq!(product.price, "₹499.00");
    assert_eq!(product.original_price.as_deref(), Some("₹998.00"));
    assert_eq!(product.discount.as_deref(), Some("50%"));
    assert_eq!(product.rating.as_deref(), Some("4.3"));
    assert_eq!(product.reviews.as_deref(), Some("12,543"));
    assert_eq!(product.features.len(), 2);
    assert_eq!(
        product.image_url.as_deref(),
        Some("https://m.media-amazon.com/images/I/61abc._SL500_.jpg")
    );
    // The stored link carries the affiliate tag appended by the extractor.
    assert!(product.link.as_deref().unwrap().contains("tag=test-21"));

    let cached = cache.get("Home").unwrap();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].id, product.id);
}

#[tokio::test]
async fn persistently_failing_page_makes_exactly_three_attempts() {
    let (addr, hits) = spawn_page_server("503 Service Unavailable", "busy".to_string()).await;
    let store = Arc::new(memory_store().await);
    let cache = Arc::new(CatalogCache::new());
    let pipeline = IngestPipeline::new(fast_scraping_config(addr), store.clone(), cache.clone());

    let url = format!("http://{addr}/dp/B0BQJ8LN38");
    let err = pipeline.ingest(&url, "Home").await.unwrap_err();
    assert!(matches!(err, IngestError::ExtractionFailed(_)));
    assert!(err.user_message().contains("try again"));

    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert!(store.get_all_products().await.unwrap().is_empty());
    assert!(cache.get("Home").is_none());
}

#[tokio::test]
async fn page_without_essentials_fails_after_retries() {
    let body = "<html><body><p>Temporarily out of stock</p></body></html>".to_string();
    let (addr, hits) = spawn_page_server("200 OK", body).await;
    let store = Arc::new(memory_store().await);
    let cache = Arc::new(CatalogCache::new());
    let pipeline = IngestPipeline::new(fast_scraping_config(addr), store.clone(), cache.clone());

    let url = format!("http://{addr}/dp/B0BQJ8LN38");
    let err = pipeline.ingest(&url, "Home").await.unwrap_err();
    assert!(matches!(err, IngestError::ExtractionFailed(_)));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert!(store.get_all_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_urls_never_reach_the_network() {
    let (addr, hits) = spawn_page_server("200 OK", BULB_PAGE.to_string()).await;
    let store = Arc::new(memory_store().await);
    let cache = Arc::new(CatalogCache::new());
    let pipeline = IngestPipeline::new(fast_scraping_config(addr), store.clone(), cache.clone());

    let err = pipeline
        .ingest("https://example.com/dp/B0BQJ8LN38", "Home")
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::InvalidUrl(_)));

    let err = pipeline
        .ingest(&format!("http://{addr}/gp/help/customer"), "Home")
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::InvalidUrl(_)));

    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(store.get_all_products().await.unwrap().is_empty());
}
