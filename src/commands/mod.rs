//! CLI command handlers.
//!
//! The in-repo stand-in for a chat dispatcher: each subcommand maps 1:1
//! onto a pipeline, store, or cache operation and renders the result.
//! Domain failures are printed as their user-facing reason and do not
//! abort the process; only startup/config errors propagate.

pub mod catalog;
pub mod category;
pub mod ingest;
pub mod run;
pub mod stats;
pub mod user;

use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::catalog::CatalogCache;
use crate::config::Config;
use crate::ingest::IngestPipeline;
use crate::store::models::Product;
use crate::store::ProductStore;
use crate::util::truncate_str;

/// Shared application state built once at startup.
pub struct App {
    pub config: Config,
    pub store: Arc<ProductStore>,
    pub cache: Arc<CatalogCache>,
}

impl App {
    /// Connect the store and warm the catalog cache.
    pub async fn init(config: Config) -> Result<Self> {
        let store = Arc::new(ProductStore::connect(&config.store).await?);
        let cache = Arc::new(CatalogCache::new());
        // Browsing stays available on an empty catalog if the first load fails.
        if let Err(e) = cache.reload(&store).await {
            warn!(error = %e, "Initial catalog load failed");
        }
        Ok(Self {
            config,
            store,
            cache,
        })
    }

    pub fn pipeline(&self) -> IngestPipeline {
        IngestPipeline::new(
            self.config.scraping.clone(),
            self.store.clone(),
            self.cache.clone(),
        )
    }
}

/// One product as a short listing line.
pub(crate) fn product_line(index: usize, product: &Product) -> String {
    format!("{}. {}", index + 1, truncate_str(&product.title, 50))
}

/// A product card for terminal output.
pub(crate) fn product_card(product: &Product) -> String {
    let mut lines = vec![product.title.clone()];

    let mut price_line = format!("Price: {}", product.price);
    if let Some(original) = &product.original_price {
        price_line.push_str(&format!("  (M.R.P: {original})"));
    }
    if let Some(discount) = &product.discount {
        price_line.push_str(&format!("  Save {discount}"));
    }
    lines.push(price_line);

    if product.rating.is_some() || product.reviews.is_some() {
        let mut parts = Vec::new();
        if let Some(rating) = &product.rating {
            parts.push(format!("{rating}/5"));
        }
        if let Some(reviews) = &product.reviews {
            parts.push(format!("{reviews} reviews"));
        }
        lines.push(parts.join(" | "));
    }

    if let Some(description) = &product.description {
        lines.push(truncate_str(description, 200));
    } else if !product.features.is_empty() {
        lines.push("Highlights:".to_string());
        for feature in product.features.iter().take(3) {
            lines.push(format!("  - {feature}"));
        }
    }

    if let Some(link) = &product.link {
        lines.push(format!("Buy: {link}"));
    }

    lines.join("\n")
}
