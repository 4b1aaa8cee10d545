//! Catalog and user statistics.

use anyhow::Result;
use tracing::warn;

use super::App;
use crate::store::UserStats;

pub async fn show(app: &App) -> Result<()> {
    let stats = match app.store.get_user_stats().await {
        Ok(stats) => stats,
        Err(e) => {
            warn!(error = %e, "User stats unavailable");
            UserStats::default()
        }
    };

    println!("dealbot statistics");
    println!("==================");
    println!("Products:     {}", app.cache.product_count());
    println!("Categories:   {}", app.cache.category_count());
    println!("Total users:  {}", stats.total_users);
    println!("Active today: {}", stats.active_today);
    Ok(())
}
