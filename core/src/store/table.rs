//! Table-backed store over an external key-value table.
//!
//! # Design
//! `KeyValueTable` is the minimal primitive set a keyed table offers: full
//! scan, keyed get, unconditional put, keyed delete. Rows are attribute maps
//! with typed values, the layout a document table such as DynamoDB uses.
//! `TableStore` maps `TodoItem` onto that layout:
//!
//! | attribute     | type   |
//! |---------------|--------|
//! | `Id`          | `N`    | (primary key)
//! | `Title`       | `S`    |
//! | `IsCompleted` | `BOOL` |
//!
//! Known limitations: `list_all` is a full scan with unbounded cost, `put` has
//! no concurrency check, and `delete_all` issues one delete per row in
//! sequence, so a failure part-way leaves the table partially purged.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::TodoStore;
use crate::error::StoreError;
use crate::types::TodoItem;

const ID: &str = "Id";
const TITLE: &str = "Title";
const IS_COMPLETED: &str = "IsCompleted";

/// A typed attribute value. Serializes as `{"N":"1"}`, `{"S":"x"}` or
/// `{"BOOL":true}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// Number, kept in its decimal string form.
    N(String),
    S(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
}

impl AttributeValue {
    /// Stable string form used as a primary key.
    pub fn key_string(&self) -> String {
        match self {
            AttributeValue::N(n) => format!("N:{n}"),
            AttributeValue::S(s) => format!("S:{s}"),
            AttributeValue::Bool(b) => format!("BOOL:{b}"),
        }
    }
}

/// One table row.
pub type Item = BTreeMap<String, AttributeValue>;

/// Primitive operations of an external keyed table.
#[async_trait]
pub trait KeyValueTable: Send + Sync {
    /// Every row in the table.
    async fn scan(&self) -> Result<Vec<Item>, StoreError>;

    async fn get_item(&self, key: &AttributeValue) -> Result<Option<Item>, StoreError>;

    /// Unconditional upsert of `item` under `key`.
    async fn put_item(&self, key: &AttributeValue, item: Item) -> Result<(), StoreError>;

    /// Remove the row under `key`. Absent keys are not an error.
    async fn delete_item(&self, key: &AttributeValue) -> Result<(), StoreError>;
}

/// `TodoStore` backed by a `KeyValueTable`.
#[derive(Debug)]
pub struct TableStore<T> {
    table: T,
}

impl<T: KeyValueTable> TableStore<T> {
    pub fn new(table: T) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &T {
        &self.table
    }
}

fn key_of(id: i64) -> AttributeValue {
    AttributeValue::N(id.to_string())
}

fn to_item(todo: &TodoItem) -> Item {
    Item::from([
        (ID.to_string(), key_of(todo.id)),
        (TITLE.to_string(), AttributeValue::S(todo.title.clone())),
        (IS_COMPLETED.to_string(), AttributeValue::Bool(todo.is_completed)),
    ])
}

fn from_item(item: &Item) -> Result<TodoItem, StoreError> {
    let id = match item.get(ID) {
        Some(AttributeValue::N(n)) => n
            .parse::<i64>()
            .map_err(|e| StoreError::Corrupt(format!("{ID} {n:?}: {e}")))?,
        other => return Err(attribute_error(ID, "N", other)),
    };
    let title = match item.get(TITLE) {
        Some(AttributeValue::S(s)) => s.clone(),
        other => return Err(attribute_error(TITLE, "S", other)),
    };
    let is_completed = match item.get(IS_COMPLETED) {
        Some(AttributeValue::Bool(b)) => *b,
        other => return Err(attribute_error(IS_COMPLETED, "BOOL", other)),
    };
    Ok(TodoItem {
        id,
        title,
        is_completed,
    })
}

fn attribute_error(name: &str, expected: &str, found: Option<&AttributeValue>) -> StoreError {
    match found {
        None => StoreError::Corrupt(format!("missing attribute {name}")),
        Some(value) => StoreError::Corrupt(format!("attribute {name} is {value:?}, expected {expected}")),
    }
}

#[async_trait]
impl<T: KeyValueTable> TodoStore for TableStore<T> {
    async fn list_all(&self) -> Result<Vec<TodoItem>, StoreError> {
        self.table.scan().await?.iter().map(from_item).collect()
    }

    async fn get(&self, id: i64) -> Result<Option<TodoItem>, StoreError> {
        self.table
            .get_item(&key_of(id))
            .await?
            .as_ref()
            .map(from_item)
            .transpose()
    }

    async fn put(&self, item: &TodoItem) -> Result<(), StoreError> {
        self.table.put_item(&key_of(item.id), to_item(item)).await
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.table.delete_item(&key_of(id)).await
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        let rows = self.table.scan().await?;
        let total = rows.len();
        for (deleted, row) in rows.iter().enumerate() {
            let key = row
                .get(ID)
                .ok_or_else(|| StoreError::Corrupt(format!("missing attribute {ID}")))?;
            if let Err(e) = self.table.delete_item(key).await {
                tracing::error!(deleted, total, error = %e, "delete-all stopped part-way");
                return Err(e);
            }
        }
        tracing::debug!(total, "deleted every row");
        Ok(())
    }
}
