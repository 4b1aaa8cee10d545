//! User registration, the stand-in for the chat platform's start command.

use anyhow::Result;
use chrono::Utc;

use super::App;

/// Register a user by platform id, or refresh their activity when the id
/// is already known. Re-registration never duplicates the record.
pub async fn register(app: &App, id: i64, name: &str) -> Result<()> {
    let known = app.store.get_user(id).await?.is_some();
    app.store.add_user(id, name, Utc::now()).await?;

    if known {
        println!("Welcome back, {name}!");
    } else {
        println!("Welcome, {name}!");
    }

    let snapshot = app.cache.snapshot();
    if snapshot.is_empty() {
        println!("No deals available yet. Check back soon.");
        return Ok(());
    }
    let mut categories: Vec<String> = snapshot.keys().cloned().collect();
    categories.sort();
    println!("\nBrowse deals with: dealbot products <category>");
    for category in categories {
        println!("  {category}");
    }
    Ok(())
}
