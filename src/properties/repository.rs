//! SQLite property repository.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::{debug, info};

use super::model::{NewProperty, Price, Property};
use crate::error::{AppError, Result};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS properties (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        price_cents INTEGER NOT NULL CHECK (price_cents >= 0),
        location TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
"#;

const CREATED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_properties_created_at ON properties (created_at)";

/// Opens a pool for `database_url`.
///
/// In-memory databases are private to a connection, so their pool is pinned
/// to a single connection that is never recycled.
pub async fn connect_pool(database_url: &str) -> Result<SqlitePool> {
    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
    let mut options = SqlitePoolOptions::new();
    if in_memory {
        options = options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = options.connect(database_url).await?;
    info!(database_url, "Database pool established");
    Ok(pool)
}

/// Database row representation of a property.
#[derive(Debug, FromRow)]
struct PropertyRow {
    id: i64,
    title: String,
    description: String,
    price_cents: i64,
    location: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PropertyRow> for Property {
    type Error = AppError;

    fn try_from(row: PropertyRow) -> Result<Self> {
        let cents = u64::try_from(row.price_cents).map_err(|_| {
            AppError::Internal(format!("Negative price stored for property {}", row.id))
        })?;

        Ok(Property {
            id: row.id,
            title: row.title,
            description: row.description,
            price: Price::from_cents(cents),
            location: row.location,
            created_at: row.created_at,
        })
    }
}

fn cents_param(price: Price) -> Result<i64> {
    i64::try_from(price.cents())
        .map_err(|_| AppError::InvalidRequest(format!("Price {} out of range", price)))
}

/// Plain data access; knows nothing about caching.
#[derive(Clone)]
pub struct PropertyRepository {
    pool: SqlitePool,
}

impl PropertyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the table and index if they are missing.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATED_AT_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    /// All properties, newest first.
    pub async fn list_all(&self) -> Result<Vec<Property>> {
        debug!("Fetching all properties from database");

        let rows = sqlx::query_as::<_, PropertyRow>(
            r#"
            SELECT id, title, description, price_cents, location, created_at
            FROM properties
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Property::try_from).collect()
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM properties")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Property>> {
        let row = sqlx::query_as::<_, PropertyRow>(
            r#"
            SELECT id, title, description, price_cents, location, created_at
            FROM properties
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Property::try_from).transpose()
    }

    pub async fn exists_with_title(&self, title: &str) -> Result<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT id FROM properties WHERE title = ? COLLATE NOCASE LIMIT 1")
                .bind(title)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    pub async fn insert(&self, new: &NewProperty) -> Result<Property> {
        let created_at = Utc::now();
        let id = sqlx::query(
            r#"
            INSERT INTO properties (title, description, price_cents, location, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(cents_param(new.price)?)
        .bind(&new.location)
        .bind(created_at)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(Property {
            id,
            title: new.title.clone(),
            description: new.description.clone(),
            price: new.price,
            location: new.location.clone(),
            created_at,
        })
    }

    /// Writes every mutable column of `property`; `created_at` is never touched.
    /// Returns false when no row has that id.
    pub async fn update(&self, property: &Property) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE properties
            SET title = ?, description = ?, price_cents = ?, location = ?
            WHERE id = ?
            "#,
        )
        .bind(&property.title)
        .bind(&property.description)
        .bind(cents_param(property.price)?)
        .bind(&property.location)
        .bind(property.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM properties WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
