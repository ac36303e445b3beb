//! In-process `KeyValueTable` for tests, with optional fault injection.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use todo_core::{AttributeValue, Item, KeyValueTable, StoreError};

#[derive(Default)]
pub struct MapTable {
    rows: Mutex<BTreeMap<String, Item>>,
    deletes: AtomicUsize,
    /// Fail every delete once this many have succeeded.
    fail_deletes_after: Option<usize>,
    fail_scan: bool,
}

#[allow(dead_code)]
impl MapTable {
    pub fn failing_deletes_after(n: usize) -> Self {
        Self {
            fail_deletes_after: Some(n),
            ..Self::default()
        }
    }

    pub fn failing_scan() -> Self {
        Self {
            fail_scan: true,
            ..Self::default()
        }
    }

    pub fn insert_raw(&self, key: &str, item: Item) {
        self.rows.lock().unwrap().insert(key.to_string(), item);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl KeyValueTable for MapTable {
    async fn scan(&self) -> Result<Vec<Item>, StoreError> {
        if self.fail_scan {
            return Err(StoreError::Backend("scan timed out".into()));
        }
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn get_item(&self, key: &AttributeValue) -> Result<Option<Item>, StoreError> {
        Ok(self.rows.lock().unwrap().get(&key.key_string()).cloned())
    }

    async fn put_item(&self, key: &AttributeValue, item: Item) -> Result<(), StoreError> {
        self.rows.lock().unwrap().insert(key.key_string(), item);
        Ok(())
    }

    async fn delete_item(&self, key: &AttributeValue) -> Result<(), StoreError> {
        if let Some(limit) = self.fail_deletes_after {
            if self.deletes.load(Ordering::SeqCst) >= limit {
                return Err(StoreError::Backend(format!("delete of {} throttled", key.key_string())));
            }
        }
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.rows.lock().unwrap().remove(&key.key_string());
        Ok(())
    }
}
