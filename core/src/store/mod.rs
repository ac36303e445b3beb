//! Storage port and its implementations.
//!
//! # Design
//! `TodoStore` is deliberately narrow: five operations, no query language, no
//! ordering guarantee. The handler is the only caller and re-reads through the
//! port on every request, so a backend can be swapped at construction time
//! without touching routing or handling code.

mod memory;
mod table;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::TodoItem;

pub use memory::MemoryStore;
pub use table::{AttributeValue, Item, KeyValueTable, TableStore};

/// Port for persisting todo items.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Every stored item, in no particular order.
    async fn list_all(&self) -> Result<Vec<TodoItem>, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<TodoItem>, StoreError>;

    /// Insert, or fully replace the item stored under `item.id`.
    async fn put(&self, item: &TodoItem) -> Result<(), StoreError>;

    /// Remove the item if present. Absent ids are not an error.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    async fn delete_all(&self) -> Result<(), StoreError>;
}
