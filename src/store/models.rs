//! Persisted document models for users, categories, and products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One catalog entry, as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned opaque id.
    pub id: String,
    pub title: String,
    /// Formatted currency string, e.g. "₹1,299".
    pub price: String,
    pub original_price: Option<String>,
    /// Integer percentage string, e.g. "50%".
    pub discount: Option<String>,
    pub rating: Option<String>,
    pub reviews: Option<String>,
    pub description: Option<String>,
    pub features: Vec<String>,
    pub image_url: Option<String>,
    /// Canonical product URL with affiliate tag.
    pub link: Option<String>,
    /// Owning category, referenced by name.
    pub category: String,
    pub added_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// Scraped product fields prior to persistence.
///
/// Assembled by the page extractor. `title` and `price` are the essential
/// pair; a product is never persisted without both. Unset fields stay
/// `None` and are omitted from storage rather than stored as placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFields {
    pub title: Option<String>,
    pub price: Option<String>,
    pub original_price: Option<String>,
    pub discount: Option<String>,
    pub rating: Option<String>,
    pub reviews: Option<String>,
    pub description: Option<String>,
    pub features: Vec<String>,
    pub image_url: Option<String>,
    pub link: Option<String>,
}

impl ProductFields {
    /// Whether the essential title/price pair is present and non-empty.
    pub fn has_essentials(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.is_empty())
            && self.price.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// A named partition of products.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A bot end user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub telegram_id: i64,
    pub username: String,
    pub joined_date: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

/// User statistics summary for the status report.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct UserStats {
    pub total_users: u64,
    /// Users active since the start of the current calendar day (local clock).
    pub active_today: u64,
}

/// Raw product row; `features` is stored as a JSON array in a TEXT column.
#[derive(Debug, FromRow)]
pub(crate) struct ProductRow {
    pub id: String,
    pub title: String,
    pub price: String,
    pub original_price: Option<String>,
    pub discount: Option<String>,
    pub rating: Option<String>,
    pub reviews: Option<String>,
    pub description: Option<String>,
    pub features: String,
    pub image_url: Option<String>,
    pub link: Option<String>,
    pub category: String,
    pub added_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        let features = serde_json::from_str(&row.features).unwrap_or_default();
        Self {
            id: row.id,
            title: row.title,
            price: row.price,
            original_price: row.original_price,
            discount: row.discount,
            rating: row.rating,
            reviews: row.reviews,
            description: row.description,
            features,
            image_url: row.image_url,
            link: row.link,
            category: row.category,
            added_date: row.added_date,
            last_updated: row.last_updated,
        }
    }
}
