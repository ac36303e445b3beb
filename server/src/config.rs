//! Environment-driven server configuration.
//!
//! | variable            | default                        |
//! |---------------------|--------------------------------|
//! | `HOST`              | `127.0.0.1`                    |
//! | `PORT`              | `3000`                         |
//! | `TODO_STORE`        | `memory` (or `table`)          |
//! | `TODO_DATABASE_URL` | `sqlite://todos.db?mode=rwc`   |
//! | `TODO_TABLE_NAME`   | `TodoItems`                    |
//!
//! The store backend is chosen once, at startup.

use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use todo_core::{MemoryStore, StoreError, TableStore, TodoStore};

use crate::sqlite_table::{is_valid_table_name, SqliteTable};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://todos.db?mode=rwc";
pub const DEFAULT_TABLE_NAME: &str = "TodoItems";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid PORT {0:?}")]
    InvalidPort(String),

    #[error("unknown TODO_STORE {0:?} (expected \"memory\" or \"table\")")]
    UnknownStore(String),

    #[error("invalid TODO_TABLE_NAME {0:?} (expected [A-Za-z0-9_]+)")]
    InvalidTableName(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Volatile process memory, seeded with the example items.
    Memory,
    /// Key-value table in a SQLite database.
    Table,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "table" => Ok(StoreBackend::Table),
            _ => Err(ConfigError::UnknownStore(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub database_url: String,
    pub table_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            store: StoreBackend::Memory,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset variables keep their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port.trim().parse().map_err(|_| ConfigError::InvalidPort(port))?;
        }
        if let Some(store) = lookup("TODO_STORE") {
            config.store = store.parse()?;
        }
        if let Some(url) = lookup("TODO_DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(name) = lookup("TODO_TABLE_NAME") {
            if !is_valid_table_name(&name) {
                return Err(ConfigError::InvalidTableName(name));
            }
            config.table_name = name;
        }
        Ok(config)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Construct the configured store.
    pub async fn open_store(&self) -> Result<Arc<dyn TodoStore>, StoreError> {
        match self.store {
            StoreBackend::Memory => Ok(Arc::new(MemoryStore::seeded())),
            StoreBackend::Table => {
                let table = SqliteTable::connect(&self.database_url, &self.table_name).await?;
                tracing::info!(url = %self.database_url, table = table.name(), "opened table store");
                Ok(Arc::new(TableStore::new(table)))
            }
        }
    }
}
