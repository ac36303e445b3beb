//! Domain types for the todo service.
//!
//! # Design
//! `TodoItem` is the stored entity. `TodoPayload` is the looser shape accepted
//! in create, update and delete bodies: every field is optional on the wire,
//! and the id may be non-positive (the router relies on that for its
//! delete-all fallback). JSON uses camelCase field names.

use serde::{Deserialize, Serialize};

/// A single stored todo item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: i64,
    pub title: String,
    pub is_completed: bool,
}

impl TodoItem {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            is_completed: false,
        }
    }
}

/// Request body for create, update and targeted delete.
///
/// `id` is ignored on create, used as the lookup key on update, and selects
/// the single item to remove on delete.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub is_completed: bool,
}

impl TodoPayload {
    /// Parse a request body. A literal JSON `null` yields `Ok(None)`.
    pub fn parse(body: &str) -> Result<Option<Self>, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Build the item this payload describes under the given id.
    pub fn into_item(self, id: i64) -> TodoItem {
        TodoItem {
            id,
            title: self.title,
            is_completed: self.is_completed,
        }
    }
}

/// Next id to assign: one past the largest id present, or 1 for an empty set.
///
/// Returns `None` when the largest id is already `i64::MAX`.
pub fn next_id<'a>(items: impl IntoIterator<Item = &'a TodoItem>) -> Option<i64> {
    items
        .into_iter()
        .map(|item| item.id)
        .max()
        .unwrap_or(0)
        .checked_add(1)
}
