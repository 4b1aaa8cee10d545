//! Recurring maintenance task.
//!
//! Every tick pings the store, reconnects with a bounded timeout when the
//! ping fails, reloads the catalog cache as a consistency backstop, and
//! publishes a status report for whatever operator surface is watching.
//! The task is independently scheduled and never blocks command handling.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::catalog::CatalogCache;
use crate::config::MaintenanceConfig;
use crate::store::{ProductStore, UserStats};

/// Snapshot of process health, published on every maintenance tick.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub uptime: Duration,
    pub db_connected: bool,
    /// Whether this tick had to re-establish the database connection.
    pub reconnected: bool,
    pub products: usize,
    pub categories: usize,
    pub total_users: u64,
    pub active_today: u64,
    pub checked_at: DateTime<Utc>,
}

impl StatusReport {
    /// Multi-line operator summary.
    pub fn summary(&self) -> String {
        let db_status = match (self.db_connected, self.reconnected) {
            (true, false) => "connected".to_string(),
            (true, true) => "reconnected".to_string(),
            (false, _) => "unreachable".to_string(),
        };
        format!(
            "Status report\n\
             Uptime: {}s\n\
             Database: {}\n\
             Products: {}\n\
             Categories: {}\n\
             Total users: {}\n\
             Active today: {}\n\
             Last check: {}",
            self.uptime.as_secs(),
            db_status,
            self.products,
            self.categories,
            self.total_users,
            self.active_today,
            self.checked_at.format("%Y-%m-%d %H:%M:%S"),
        )
    }
}

/// Spawn the recurring maintenance task.
///
/// The first tick is delayed so startup work settles; afterwards ticks
/// run at the configured fixed interval, skipping any that pile up
/// behind a slow database. Returns the join handle and a receiver
/// holding the latest status report.
pub fn spawn(
    store: Arc<ProductStore>,
    cache: Arc<CatalogCache>,
    config: MaintenanceConfig,
) -> (JoinHandle<()>, watch::Receiver<Option<StatusReport>>) {
    let (tx, rx) = watch::channel(None);

    let handle = tokio::spawn(async move {
        let started = Instant::now();
        let first = tokio::time::Instant::now() + Duration::from_secs(config.first_delay_secs);
        let mut interval =
            tokio::time::interval_at(first, Duration::from_secs(config.interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let report = run_tick(&store, &cache, started).await;
            info!(
                db_connected = report.db_connected,
                products = report.products,
                categories = report.categories,
                "Maintenance tick completed"
            );
            // Keep ticking even with no subscribers; the ping and reload
            // side effects matter on their own.
            let _ = tx.send(Some(report));
        }
    });

    (handle, rx)
}

async fn run_tick(store: &ProductStore, cache: &CatalogCache, started: Instant) -> StatusReport {
    let mut reconnected = false;
    let db_connected = match store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Database ping failed; attempting reconnect");
            match store.reconnect().await {
                Ok(()) => {
                    reconnected = true;
                    true
                }
                Err(e) => {
                    warn!(error = %e, "Database reconnect failed");
                    false
                }
            }
        }
    };

    if db_connected {
        if let Err(e) = cache.reload(store).await {
            warn!(error = %e, "Catalog reload failed; keeping previous snapshot");
        }
    }

    let stats = match store.get_user_stats().await {
        Ok(stats) => stats,
        Err(e) => {
            warn!(error = %e, "User stats unavailable");
            UserStats::default()
        }
    };

    StatusReport {
        uptime: started.elapsed(),
        db_connected,
        reconnected,
        products: cache.product_count(),
        categories: cache.category_count(),
        total_users: stats.total_users,
        active_today: stats.active_today,
        checked_at: Utc::now(),
    }
}
