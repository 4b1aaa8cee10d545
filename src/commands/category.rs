//! Category administration commands.

use anyhow::Result;
use tracing::warn;

use super::App;
use crate::util::capitalize;

/// Create a category explicitly.
pub async fn add(app: &App, name: &str) -> Result<()> {
    let name = capitalize(name);
    if app.store.add_category(&name).await? {
        if let Err(e) = app.cache.reload(&app.store).await {
            warn!(error = %e, "Catalog reload after category add failed");
        }
        println!("Category '{name}' added.");
    } else {
        println!("Category '{name}' already exists.");
    }
    Ok(())
}

/// Remove a category and everything in it.
///
/// When the category still owns products the caller must pass `confirm`;
/// the prompt states exactly what will be deleted.
pub async fn remove(app: &App, name: &str, confirm: bool) -> Result<()> {
    let name = capitalize(name);

    let owned = match app.cache.get(&name) {
        Some(products) => products.len(),
        None => {
            println!("Category '{name}' does not exist.");
            return Ok(());
        }
    };

    if owned > 0 && !confirm {
        println!(
            "Category '{name}' has {owned} products.\n\
             All products in this category will be deleted.\n\
             To confirm, run: dealbot category-remove {name} confirm"
        );
        return Ok(());
    }

    match app.store.remove_category(&name).await? {
        Some(removed) => {
            if let Err(e) = app.cache.reload(&app.store).await {
                warn!(error = %e, "Catalog reload after category removal failed");
            }
            if removed > 0 {
                println!("Category '{name}' and its {removed} products have been removed.");
            } else {
                println!("Category '{name}' removed.");
            }
        }
        None => println!("Category '{name}' does not exist."),
    }
    Ok(())
}
