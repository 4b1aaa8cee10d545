//! In-process catalog cache, rebuilt wholesale from the product store.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::store::models::Product;
use crate::store::{ProductStore, StoreError};

type CatalogMap = HashMap<String, Vec<Product>>;

/// Category-name → product-list mapping shared between command handlers
/// and the reload path.
///
/// Readers clone an `Arc` snapshot; the reload path constructs a complete
/// replacement map before publishing it in a single swap, so a torn or
/// partially updated catalog is never observable. There is no incremental
/// patching: callers reload after every successful store mutation, and the
/// maintenance timer reloads as a consistency backstop.
#[derive(Default)]
pub struct CatalogCache {
    inner: RwLock<Arc<CatalogMap>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the mapping from the store and publish it.
    ///
    /// Categories with no products still appear with an empty list. On a
    /// read failure the previous snapshot is kept and the error is
    /// returned for the caller to log.
    pub async fn reload(&self, store: &ProductStore) -> Result<(), StoreError> {
        let categories = store.get_all_categories().await?;
        let products = store.get_all_products().await?;

        let mut map: CatalogMap = categories
            .into_iter()
            .map(|name| (name, Vec::new()))
            .collect();
        let total = products.len();
        for product in products {
            map.entry(product.category.clone()).or_default().push(product);
        }

        info!(
            products = total,
            categories = map.len(),
            "Catalog cache reloaded"
        );
        *self.inner.write() = Arc::new(map);
        Ok(())
    }

    /// Products for one category; `None` when the category is unknown.
    pub fn get(&self, category: &str) -> Option<Vec<Product>> {
        self.snapshot().get(category).cloned()
    }

    /// Current snapshot of the whole catalog.
    pub fn snapshot(&self) -> Arc<CatalogMap> {
        self.inner.read().clone()
    }

    pub fn category_count(&self) -> usize {
        self.snapshot().len()
    }

    pub fn product_count(&self) -> usize {
        self.snapshot().values().map(Vec::len).sum()
    }
}
