use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::TodoStore;
use crate::error::StoreError;
use crate::types::TodoItem;

/// Volatile store held in process memory.
///
/// Build one per process and share it behind an `Arc`. Nothing survives a
/// restart, and separate processes hold separate copies.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<i64, TodoItem>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the two default example items.
    pub fn seeded() -> Self {
        Self::with_items([
            TodoItem::new(1, "Learn AWS Lambda"),
            TodoItem::new(2, "Deploy to AWS"),
        ])
    }

    pub fn with_items(items: impl IntoIterator<Item = TodoItem>) -> Self {
        let items = items.into_iter().map(|item| (item.id, item)).collect();
        Self {
            items: RwLock::new(items),
        }
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list_all(&self) -> Result<Vec<TodoItem>, StoreError> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<TodoItem>, StoreError> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn put(&self, item: &TodoItem) -> Result<(), StoreError> {
        self.items.write().await.insert(item.id, item.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.items.write().await.remove(&id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.items.write().await.clear();
        Ok(())
    }
}
