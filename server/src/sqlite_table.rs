//! `SQLite` implementation of the `KeyValueTable` primitive.
//!
//! One row per item: `pk` holds the key attribute's string form and `item`
//! holds the whole attribute map as JSON, so the table stays schemaless the
//! way a document table is.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use todo_core::{AttributeValue, Item, KeyValueTable, StoreError};

/// Table names are interpolated into SQL, so only `[A-Za-z0-9_]+` is allowed.
pub fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn backend(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

pub struct SqliteTable {
    pool: SqlitePool,
    name: String,
}

impl SqliteTable {
    /// Wrap an existing pool. Call `ensure_table` before first use.
    pub fn new(pool: SqlitePool, name: &str) -> Result<Self, StoreError> {
        if !is_valid_table_name(name) {
            return Err(StoreError::Backend(format!("invalid table name {name:?}")));
        }
        Ok(Self {
            pool,
            name: name.to_string(),
        })
    }

    /// Open `url`, creating the database file and the table if missing.
    pub async fn connect(url: &str, name: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(backend)?
            .create_if_missing(true);
        let pool = pool_options(url)
            .connect_with(options)
            .await
            .map_err(backend)?;
        let table = Self::new(pool, name)?;
        table.ensure_table().await?;
        Ok(table)
    }

    pub async fn ensure_table(&self) -> Result<(), StoreError> {
        let sql = format!(
            r#"CREATE TABLE IF NOT EXISTS "{}" (
                pk TEXT PRIMARY KEY NOT NULL,
                item TEXT NOT NULL
            )"#,
            self.name
        );
        sqlx::query(&sql).execute(&self.pool).await.map_err(backend)?;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Pool settings for `url`.
///
/// An in-memory database lives exactly as long as its connection, so it gets
/// one connection that is never reaped for idleness or age.
fn pool_options(url: &str) -> SqlitePoolOptions {
    if url.contains(":memory:") {
        SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    }
}

fn decode(json: &str) -> Result<Item, StoreError> {
    serde_json::from_str(json).map_err(|e| StoreError::Corrupt(e.to_string()))
}

#[async_trait]
impl KeyValueTable for SqliteTable {
    async fn scan(&self) -> Result<Vec<Item>, StoreError> {
        let sql = format!(r#"SELECT item FROM "{}""#, self.name);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await.map_err(backend)?;
        tracing::debug!(table = %self.name, rows = rows.len(), "full scan");
        rows.iter()
            .map(|row| decode(&row.try_get::<String, _>("item").map_err(backend)?))
            .collect()
    }

    async fn get_item(&self, key: &AttributeValue) -> Result<Option<Item>, StoreError> {
        let sql = format!(r#"SELECT item FROM "{}" WHERE pk = ?"#, self.name);
        let row = sqlx::query(&sql)
            .bind(key.key_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        match row {
            Some(row) => Ok(Some(decode(&row.try_get::<String, _>("item").map_err(backend)?)?)),
            None => Ok(None),
        }
    }

    async fn put_item(&self, key: &AttributeValue, item: Item) -> Result<(), StoreError> {
        let json = serde_json::to_string(&item).map_err(backend)?;
        let sql = format!(r#"INSERT OR REPLACE INTO "{}" (pk, item) VALUES (?, ?)"#, self.name);
        sqlx::query(&sql)
            .bind(key.key_string())
            .bind(&json)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn delete_item(&self, key: &AttributeValue) -> Result<(), StoreError> {
        let sql = format!(r#"DELETE FROM "{}" WHERE pk = ?"#, self.name);
        sqlx::query(&sql)
            .bind(key.key_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }
}
