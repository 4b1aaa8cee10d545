//! Admin commands that mutate the product catalog.

use anyhow::Result;
use tracing::warn;

use super::App;
use crate::util::capitalize;

/// Default category suggestions shown before any categories exist.
const STARTER_CATEGORIES: &[&str] = &["Electronics", "Fashion", "Home"];

/// Add a product from a marketplace URL.
///
/// Without a category the command lists what is available and asks to be
/// rerun; extraction work only starts once the destination is known.
pub async fn add(app: &App, url: &str, category: Option<&str>) -> Result<()> {
    let Some(category) = category else {
        let snapshot = app.cache.snapshot();
        let mut names: Vec<String> = snapshot.keys().cloned().collect();
        if names.is_empty() {
            names = STARTER_CATEGORIES.iter().map(|s| s.to_string()).collect();
        }
        names.sort();
        println!("Please specify a category for this product:\n");
        for name in &names {
            println!("  {name}");
        }
        println!("\nUse: dealbot add <url> <category>");
        return Ok(());
    };

    println!("Fetching product details...");
    match app.pipeline().ingest(url, category).await {
        Ok(report) => {
            println!(
                "Product added to {} (id {})",
                report.category, report.product_id
            );
            if let Some(products) = app.cache.get(&report.category) {
                if let Some(product) = products.iter().find(|p| p.id == report.product_id) {
                    println!("\n{}", super::product_card(product));
                }
            }
        }
        Err(e) => println!("{}", e.user_message()),
    }
    Ok(())
}

/// Remove a product addressed by category and 1-based index, the way the
/// listing renders them.
pub async fn remove(app: &App, category: &str, index: usize) -> Result<()> {
    let category = capitalize(category);
    let products = match app.cache.get(&category) {
        Some(products) => products,
        None => {
            println!("Invalid category or product number.");
            return Ok(());
        }
    };
    if index == 0 || index > products.len() {
        println!("Invalid category or product number.");
        return Ok(());
    }

    let product = &products[index - 1];
    if app.store.remove_product(&product.id).await? {
        if let Err(e) = app.cache.reload(&app.store).await {
            warn!(error = %e, "Catalog reload after removal failed");
        }
        println!("Removed: {}", product.title);
    } else {
        println!("Failed to remove product from database.");
    }
    Ok(())
}
