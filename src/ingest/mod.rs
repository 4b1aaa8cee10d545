//! Product ingestion pipeline.
//!
//! Composes the stages an admin-submitted link flows through: URL
//! validation and expansion, page extraction with selector fallback,
//! persistence, and a wholesale catalog reload. Failures are classified
//! by [`IngestError`](crate::error::IngestError) and never leave partial
//! state behind: the cache is only reloaded after the store write applies.

pub mod extractor;
pub mod fetcher;
pub mod headers;
pub mod resolver;
pub mod selectors;

pub use extractor::{ExtractError, PageExtractor};
pub use fetcher::FetchSession;
pub use resolver::{ResolveError, ResolvedUrl, UrlResolver};

use std::sync::Arc;

use tracing::{info, warn};

use crate::catalog::CatalogCache;
use crate::config::ScrapingConfig;
use crate::error::IngestError;
use crate::store::models::ProductFields;
use crate::store::ProductStore;
use crate::util::capitalize;

/// Outcome of a successful ingestion.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub product_id: String,
    pub category: String,
    pub asin: Option<String>,
    pub fields: ProductFields,
}

/// The full ingestion flow, owned once per process and shared by every
/// admin-facing caller.
pub struct IngestPipeline {
    resolver: UrlResolver,
    extractor: PageExtractor,
    store: Arc<ProductStore>,
    cache: Arc<CatalogCache>,
}

impl IngestPipeline {
    pub fn new(
        config: ScrapingConfig,
        store: Arc<ProductStore>,
        cache: Arc<CatalogCache>,
    ) -> Self {
        Self {
            resolver: UrlResolver::new(config.clone()),
            extractor: PageExtractor::new(config),
            store,
            cache,
        }
    }

    /// Ingest one product URL into a category.
    ///
    /// On success the catalog cache reflects the new product. A reload
    /// failure after a successful write is logged and tolerated; the
    /// maintenance timer brings the cache back in sync.
    pub async fn ingest(&self, raw_url: &str, category: &str) -> Result<IngestReport, IngestError> {
        let resolved = self.resolver.resolve(raw_url).await?;
        let fields = self.extractor.extract(&resolved.url).await?;

        let category = capitalize(category);
        let product_id = self.store.add_product(&fields, &category).await?;

        if let Err(e) = self.cache.reload(&self.store).await {
            warn!(error = %e, "Catalog reload after ingest failed; keeping previous snapshot");
        }

        info!(product_id = %product_id, category = %category, "Product ingested");
        Ok(IngestReport {
            product_id,
            category,
            asin: resolved.asin,
            fields,
        })
    }
}
