//! Read-only browsing commands over the catalog cache.

use anyhow::Result;

use super::App;
use crate::util::capitalize;

/// List available categories.
pub async fn categories(app: &App) -> Result<()> {
    let snapshot = app.cache.snapshot();
    if snapshot.is_empty() {
        println!("No categories available.");
        return Ok(());
    }
    let mut names: Vec<String> = snapshot.keys().cloned().collect();
    names.sort();
    println!("Available categories:\n");
    for name in names {
        println!("  {name}");
    }
    println!("\nTo view products, use: dealbot products <category>");
    Ok(())
}

/// Show every product in one category.
pub async fn products(app: &App, category: &str) -> Result<()> {
    let category = capitalize(category);
    match app.cache.get(&category) {
        Some(products) if !products.is_empty() => {
            println!("Products in {category}:");
            for product in &products {
                println!("\n{}", super::product_card(product));
            }
        }
        Some(_) => println!("No products in {category} yet."),
        None => {
            println!("Category not found. Use `dealbot categories` to see what's available.")
        }
    }
    Ok(())
}

/// List all products with their ids, grouped by category.
pub async fn list(app: &App) -> Result<()> {
    let snapshot = app.cache.snapshot();
    let total: usize = snapshot.values().map(Vec::len).sum();
    if total == 0 {
        println!("No products available.");
        return Ok(());
    }

    let mut names: Vec<String> = snapshot.keys().cloned().collect();
    names.sort();
    println!("Product list:\n");
    for name in names {
        println!("{name}:");
        for (index, product) in snapshot[&name].iter().enumerate() {
            println!("  {}  [{}]", super::product_line(index, product), product.id);
        }
        println!();
    }
    Ok(())
}
