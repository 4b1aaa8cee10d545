//! SQLite-backed product store.
//!
//! Three collections (users, categories, products) with
//! application-managed referential cleanup: removing a category deletes
//! its products in the same transaction. Category names are
//! case-normalized at every boundary. Read operations propagate errors;
//! the fail-open policy for browsing lives at the callers that need it
//! (catalog reload keeps its previous snapshot, browse commands render an
//! empty catalog).

pub mod models;

pub use models::{Category, Product, ProductFields, User, UserStats};

use std::time::Duration;

use chrono::{DateTime, Local, NaiveTime, Utc};
use parking_lot::RwLock;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::util::capitalize;
use models::ProductRow;

/// Errors from the product store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("product is missing essential fields (title or price)")]
    MissingEssentials,
    #[error("database unreachable: {0}")]
    ConnectivityLost(String),
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        telegram_id INTEGER PRIMARY KEY,
        username    TEXT NOT NULL,
        joined_date TEXT NOT NULL,
        last_active TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS categories (
        name       TEXT PRIMARY KEY,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS products (
        id             TEXT PRIMARY KEY,
        title          TEXT NOT NULL,
        price          TEXT NOT NULL,
        original_price TEXT,
        discount       TEXT,
        rating         TEXT,
        reviews        TEXT,
        description    TEXT,
        features       TEXT NOT NULL DEFAULT '[]',
        image_url      TEXT,
        link           TEXT,
        category       TEXT NOT NULL,
        added_date     TEXT NOT NULL,
        last_updated   TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_products_title ON products(title)",
    "CREATE INDEX IF NOT EXISTS idx_products_category ON products(category)",
];

/// Document-oriented CRUD over users, categories, and products.
///
/// The pool is held behind a lock only so `reconnect` can swap it;
/// every operation clones the cheap pool handle out first.
pub struct ProductStore {
    pool: RwLock<SqlitePool>,
    config: StoreConfig,
}

impl ProductStore {
    /// Connect to the database and create the schema if missing.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let pool = Self::build_pool(config).await?;
        Self::init_schema(&pool).await?;
        info!(url = %config.database_url, "Connected to product store");
        Ok(Self {
            pool: RwLock::new(pool),
            config: config.clone(),
        })
    }

    async fn build_pool(config: &StoreConfig) -> Result<SqlitePool, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(pool)
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        Ok(())
    }

    fn pool(&self) -> SqlitePool {
        self.pool.read().clone()
    }

    /// Upsert a user by platform id. On conflict the original
    /// `joined_date` is preserved; name and activity are refreshed.
    pub async fn add_user(
        &self,
        telegram_id: i64,
        username: &str,
        joined_date: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (telegram_id, username, joined_date, last_active)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(telegram_id) DO UPDATE SET
                 username = excluded.username,
                 last_active = excluded.last_active",
        )
        .bind(telegram_id)
        .bind(username)
        .bind(joined_date)
        .bind(Utc::now())
        .execute(&self.pool())
        .await?;
        Ok(())
    }

    /// Look up a user by platform id.
    pub async fn get_user(&self, telegram_id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE telegram_id = ?1")
            .bind(telegram_id)
            .fetch_optional(&self.pool())
            .await?;
        Ok(user)
    }

    /// Refresh a user's `last_active` timestamp. Returns whether a row was
    /// touched; an unknown id reports `false` rather than an error.
    pub async fn touch_user(&self, telegram_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET last_active = ?1 WHERE telegram_id = ?2")
            .bind(Utc::now())
            .bind(telegram_id)
            .execute(&self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Create a category. Returns `false` (and changes nothing) when the
    /// name already exists.
    pub async fn add_category(&self, name: &str) -> Result<bool, StoreError> {
        let name = capitalize(name);
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO categories (name, created_at, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO NOTHING",
        )
        .bind(&name)
        .bind(now)
        .bind(now)
        .execute(&self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Idempotent create-if-absent; never fails on an existing name.
    pub async fn ensure_category(&self, name: &str) -> Result<(), StoreError> {
        self.add_category(name).await.map(|_| ())
    }

    /// Remove a category and all products referencing it, atomically.
    /// Returns the number of products removed, or `None` when the
    /// category did not exist; on any failure nothing is deleted.
    pub async fn remove_category(&self, name: &str) -> Result<Option<u64>, StoreError> {
        let name = capitalize(name);
        let mut tx = self.pool().begin().await?;

        let products_removed = sqlx::query("DELETE FROM products WHERE category = ?1")
            .bind(&name)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let categories_removed = sqlx::query("DELETE FROM categories WHERE name = ?1")
            .bind(&name)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if categories_removed == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        debug!(category = %name, products_removed, "Removed category");
        Ok(Some(products_removed))
    }

    /// Persist a scraped product, creating its category if necessary.
    /// Returns the assigned id. Products without the essential
    /// title/price pair are rejected.
    pub async fn add_product(
        &self,
        fields: &ProductFields,
        category: &str,
    ) -> Result<String, StoreError> {
        if !fields.has_essentials() {
            return Err(StoreError::MissingEssentials);
        }

        let category = capitalize(category);
        self.ensure_category(&category).await?;

        let id = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let features = serde_json::to_string(&fields.features).unwrap_or_else(|_| "[]".to_string());

        sqlx::query(
            "INSERT INTO products (id, title, price, original_price, discount, rating,
                                   reviews, description, features, image_url, link,
                                   category, added_date, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )
        .bind(&id)
        .bind(fields.title.as_deref().unwrap_or_default())
        .bind(fields.price.as_deref().unwrap_or_default())
        .bind(&fields.original_price)
        .bind(&fields.discount)
        .bind(&fields.rating)
        .bind(&fields.reviews)
        .bind(&fields.description)
        .bind(&features)
        .bind(&fields.image_url)
        .bind(&fields.link)
        .bind(&category)
        .bind(now)
        .bind(now)
        .execute(&self.pool())
        .await?;

        debug!(product_id = %id, category = %category, "Stored product");
        Ok(id)
    }

    /// All products in a category, in insertion order.
    pub async fn get_products_by_category(&self, category: &str) -> Result<Vec<Product>, StoreError> {
        let category = capitalize(category);
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT * FROM products WHERE category = ?1 ORDER BY added_date",
        )
        .bind(&category)
        .fetch_all(&self.pool())
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Every stored product, in insertion order.
    pub async fn get_all_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>("SELECT * FROM products ORDER BY added_date")
            .fetch_all(&self.pool())
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// All category names, sorted alphabetically.
    pub async fn get_all_categories(&self) -> Result<Vec<String>, StoreError> {
        let names = sqlx::query_scalar::<_, String>("SELECT name FROM categories ORDER BY name ASC")
            .fetch_all(&self.pool())
            .await?;
        Ok(names)
    }

    /// Delete a product by id. Reports whether a document was removed.
    pub async fn remove_product(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Merge non-empty fields into an existing product and refresh its
    /// `last_updated` stamp. Reports whether a document was modified.
    pub async fn update_product(
        &self,
        id: &str,
        fields: &ProductFields,
    ) -> Result<bool, StoreError> {
        let features = if fields.features.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&fields.features).unwrap_or_else(|_| "[]".to_string()))
        };

        let result = sqlx::query(
            "UPDATE products SET
                 title          = COALESCE(?1, title),
                 price          = COALESCE(?2, price),
                 original_price = COALESCE(?3, original_price),
                 discount       = COALESCE(?4, discount),
                 rating         = COALESCE(?5, rating),
                 reviews        = COALESCE(?6, reviews),
                 description    = COALESCE(?7, description),
                 features       = COALESCE(?8, features),
                 image_url      = COALESCE(?9, image_url),
                 link           = COALESCE(?10, link),
                 last_updated   = ?11
             WHERE id = ?12",
        )
        .bind(&fields.title)
        .bind(&fields.price)
        .bind(&fields.original_price)
        .bind(&fields.discount)
        .bind(&fields.rating)
        .bind(&fields.reviews)
        .bind(&fields.description)
        .bind(&features)
        .bind(&fields.image_url)
        .bind(&fields.link)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Total user count plus the count active since local midnight.
    pub async fn get_user_stats(&self) -> Result<UserStats, StoreError> {
        let pool = self.pool();
        let total_users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await?;

        let active_today =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE last_active >= ?1")
                .bind(start_of_local_day())
                .fetch_one(&pool)
                .await?;

        Ok(UserStats {
            total_users: total_users as u64,
            active_today: active_today as u64,
        })
    }

    /// Liveness probe.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool())
            .await
            .map_err(|e| StoreError::ConnectivityLost(e.to_string()))?;
        Ok(())
    }

    /// Rebuild the connection pool, bounded by the configured timeout.
    pub async fn reconnect(&self) -> Result<(), StoreError> {
        let timeout = Duration::from_secs(self.config.reconnect_timeout_secs);
        let pool = tokio::time::timeout(timeout, Self::build_pool(&self.config))
            .await
            .map_err(|_| StoreError::ConnectivityLost("reconnect timed out".to_string()))??;
        Self::init_schema(&pool).await?;
        *self.pool.write() = pool;
        info!("Reconnected to product store");
        Ok(())
    }

    /// Close the pool. Outstanding operations finish first.
    pub async fn close(&self) {
        self.pool().close().await;
    }
}

/// Start of the current calendar day on the local clock, in UTC.
fn start_of_local_day() -> DateTime<Utc> {
    let now = Local::now();
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    match midnight.and_local_timezone(Local) {
        chrono::LocalResult::Single(dt) => dt.with_timezone(&Utc),
        chrono::LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        // Midnight fell into a DST gap; count from now instead.
        chrono::LocalResult::None => now.with_timezone(&Utc),
    }
}
