//! Maintenance task behavior.

mod common;

use std::sync::Arc;
use std::time::Duration;

use dealbot::catalog::CatalogCache;
use dealbot::config::MaintenanceConfig;
use dealbot::maintenance;

use common::{memory_store, sample_fields};

#[tokio::test]
async fn tick_publishes_status_and_reloads_cache() {
    let store = Arc::new(memory_store().await);
    store.add_product(&sample_fields("Bulb"), "Home").await.unwrap();

    let cache = Arc::new(CatalogCache::new());
    assert_eq!(cache.product_count(), 0);

    let config = MaintenanceConfig {
        interval_secs: 1,
        first_delay_secs: 0,
    };
    let (handle, mut status_rx) = maintenance::spawn(store.clone(), cache.clone(), config);

    tokio::time::timeout(Duration::from_secs(5), status_rx.changed())
        .await
        .expect("a tick within the timeout")
        .expect("sender alive");

    let report = status_rx.borrow_and_update().clone().expect("a report");
    assert!(report.db_connected);
    assert!(!report.reconnected);
    assert_eq!(report.products, 1);
    assert_eq!(report.categories, 1);
    assert_eq!(report.total_users, 0);
    assert!(report.summary().contains("Database: connected"));

    // The tick reloaded the cache as the consistency backstop.
    assert_eq!(cache.product_count(), 1);

    handle.abort();
}
