//! CRUD handler: runs one routed operation against the storage port.
//!
//! # Design
//! `TodoHandler` holds nothing but the injected store. Every operation
//! re-reads through the port, so no state survives between requests.
//! Operations return `Result<ApiResponse, ApiError>`; `handle` folds the error
//! side into a response, which makes every failure terminal for its request
//! (no retry, no rollback).

use std::sync::Arc;

use crate::error::ApiError;
use crate::http::{ApiRequest, ApiResponse};
use crate::response;
use crate::router::{self, Route};
use crate::store::TodoStore;
use crate::types::{next_id, TodoPayload};

#[derive(Clone)]
pub struct TodoHandler {
    store: Arc<dyn TodoStore>,
}

impl TodoHandler {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    /// Route and run a request. Never fails; errors become error responses.
    pub async fn handle(&self, request: &ApiRequest) -> ApiResponse {
        tracing::debug!(
            method = ?request.method,
            body_len = request.body.as_ref().map_or(0, String::len),
            "received request"
        );
        let route = router::route(request);
        let op = route.name();
        tracing::info!(op, "dispatching");

        let response = match self.dispatch(route).await {
            Ok(response) => response,
            Err(err) => {
                if err.status() >= 500 {
                    tracing::error!(op, error = %err, "request failed");
                } else {
                    tracing::warn!(op, status = err.status(), error = %err, "request rejected");
                }
                err.into_response()
            }
        };
        tracing::info!(op, status = response.status_code, "completed");
        response
    }

    async fn dispatch(&self, route: Route) -> Result<ApiResponse, ApiError> {
        match route {
            Route::List => self.list().await,
            Route::Create(body) => self.create(body.as_deref()).await,
            Route::Update(body) => self.update(body.as_deref()).await,
            Route::DeleteOne(id) => self.delete_one(id).await,
            Route::DeleteAll => self.delete_all().await,
            Route::Preflight => Ok(response::build(200, "")),
            Route::Reject(method) => Err(ApiError::UnsupportedMethod(method)),
        }
    }

    pub async fn list(&self) -> Result<ApiResponse, ApiError> {
        let mut items = self.store.list_all().await?;
        items.sort_by_key(|item| item.id);
        Ok(response::json(200, &items))
    }

    pub async fn create(&self, body: Option<&str>) -> Result<ApiResponse, ApiError> {
        let payload = parse_body(body)?;
        let existing = self.store.list_all().await?;
        let id = next_id(&existing).ok_or(ApiError::IdExhausted)?;
        let item = payload.into_item(id);
        self.store.put(&item).await?;
        tracing::info!(id, "created todo");
        Ok(response::json(201, &item))
    }

    /// Replace title and completion flag of the item named by the body's id.
    /// A body without an id looks up id 0, which is never stored.
    pub async fn update(&self, body: Option<&str>) -> Result<ApiResponse, ApiError> {
        let payload = parse_body(body)?;
        let id = payload.id.unwrap_or(0);
        let mut item = self.store.get(id).await?.ok_or(ApiError::NotFound)?;
        item.title = payload.title;
        item.is_completed = payload.is_completed;
        self.store.put(&item).await?;
        Ok(response::json(200, &item))
    }

    /// Idempotent: an unknown id still answers 200.
    pub async fn delete_one(&self, id: i64) -> Result<ApiResponse, ApiError> {
        self.store.delete(id).await?;
        Ok(response::message(200, "Todo deleted"))
    }

    pub async fn delete_all(&self) -> Result<ApiResponse, ApiError> {
        self.store.delete_all().await?;
        Ok(response::message(200, "All todos deleted"))
    }
}

fn parse_body(body: Option<&str>) -> Result<TodoPayload, ApiError> {
    let body = body.filter(|b| !b.is_empty()).ok_or(ApiError::MissingBody)?;
    TodoPayload::parse(body)
        .map_err(|e| ApiError::MalformedInput(e.to_string()))?
        .ok_or(ApiError::InvalidItem)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;
    use crate::types::TodoItem;

    fn handler(items: Vec<TodoItem>) -> (TodoHandler, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_items(items));
        (TodoHandler::new(store.clone()), store)
    }

    fn json(resp: &ApiResponse) -> Value {
        serde_json::from_str(&resp.body).unwrap()
    }

    async fn sorted(store: &MemoryStore) -> Vec<TodoItem> {
        let mut items = store.list_all().await.unwrap();
        items.sort_by_key(|item| item.id);
        items
    }

    #[tokio::test]
    async fn list_sorts_by_id() {
        let (h, _) = handler(vec![
            TodoItem::new(3, "c"),
            TodoItem::new(1, "a"),
            TodoItem::new(2, "b"),
        ]);
        let resp = h.handle(&ApiRequest::new("GET")).await;
        assert_eq!(resp.status_code, 200);
        let ids: Vec<i64> = json(&resp)
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn create_ignores_client_id() {
        let (h, store) = handler(vec![TodoItem::new(1, "a")]);
        let resp = h
            .handle(&ApiRequest::new("POST").with_body(r#"{"id":50,"title":"b","isCompleted":true}"#))
            .await;
        assert_eq!(resp.status_code, 201);
        assert_eq!(json(&resp), serde_json::json!({"id":2,"title":"b","isCompleted":true}));
        assert!(store.get(50).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn successive_creates_are_strictly_increasing() {
        let (h, _) = handler(vec![TodoItem::new(4, "gap")]);
        let mut last = 4;
        for title in ["a", "b", "c"] {
            let body = format!(r#"{{"title":"{title}"}}"#);
            let resp = h.handle(&ApiRequest::new("POST").with_body(body)).await;
            let id = json(&resp)["id"].as_i64().unwrap();
            assert!(id > last);
            last = id;
        }
        assert_eq!(last, 7);
    }

    #[tokio::test]
    async fn create_after_delete_all_restarts_at_one() {
        let (h, _) = handler(vec![TodoItem::new(8, "x")]);
        h.handle(&ApiRequest::new("DELETE")).await;
        let resp = h.handle(&ApiRequest::new("POST").with_body("{}")).await;
        assert_eq!(json(&resp)["id"], 1);
        assert_eq!(json(&resp)["title"], "");
    }

    #[tokio::test]
    async fn create_requires_body() {
        let (h, _) = handler(vec![]);
        let resp = h.handle(&ApiRequest::new("POST")).await;
        assert_eq!(resp.status_code, 400);
        assert_eq!(json(&resp)["error"], "Request body is required");
    }

    #[tokio::test]
    async fn create_rejects_null_and_malformed() {
        let (h, store) = handler(vec![]);
        let resp = h.handle(&ApiRequest::new("POST").with_body("null")).await;
        assert_eq!(resp.status_code, 400);
        assert_eq!(json(&resp)["error"], "Invalid todo item");

        let resp = h.handle(&ApiRequest::new("POST").with_body("{title:")).await;
        assert_eq!(resp.status_code, 400);
        assert_eq!(json(&resp)["error"], "Invalid JSON format");
        assert!(json(&resp)["details"].is_string());
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_keeps_id_and_replaces_fields() {
        let (h, store) = handler(vec![TodoItem::new(1, "A"), TodoItem::new(2, "other")]);
        let resp = h
            .handle(&ApiRequest::new("PUT").with_body(r#"{"id":1,"title":"B","isCompleted":true}"#))
            .await;
        assert_eq!(resp.status_code, 200);
        let expected = TodoItem {
            id: 1,
            title: "B".to_string(),
            is_completed: true,
        };
        assert_eq!(json(&resp), serde_json::to_value(&expected).unwrap());
        assert_eq!(store.get(1).await.unwrap(), Some(expected));
        assert_eq!(store.get(2).await.unwrap(), Some(TodoItem::new(2, "other")));
    }

    #[tokio::test]
    async fn update_unknown_id_is_404_and_leaves_store() {
        let (h, store) = handler(vec![TodoItem::new(5, "five")]);
        let before = sorted(&store).await;
        let resp = h
            .handle(&ApiRequest::new("PUT").with_body(r#"{"id":99,"title":"nope"}"#))
            .await;
        assert_eq!(resp.status_code, 404);
        assert_eq!(json(&resp)["error"], "Todo not found");
        assert_eq!(sorted(&store).await, before);
    }

    #[tokio::test]
    async fn update_without_id_is_404() {
        let (h, _) = handler(vec![TodoItem::new(1, "a")]);
        let resp = h.handle(&ApiRequest::new("PUT").with_body(r#"{"title":"x"}"#)).await;
        assert_eq!(resp.status_code, 404);
    }

    #[tokio::test]
    async fn delete_unknown_id_is_200() {
        let (h, store) = handler(vec![TodoItem::new(1, "a")]);
        let resp = h.handle(&ApiRequest::new("DELETE").with_body(r#"{"id":77}"#)).await;
        assert_eq!(resp.status_code, 200);
        assert_eq!(json(&resp)["message"], "Todo deleted");
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_one_removes_only_target() {
        let (h, store) = handler(vec![TodoItem::new(1, "a"), TodoItem::new(2, "b")]);
        h.handle(&ApiRequest::new("DELETE").with_body(r#"{"id":1}"#)).await;
        assert_eq!(sorted(&store).await, vec![TodoItem::new(2, "b")]);
    }

    #[tokio::test]
    async fn delete_with_bad_body_purges() {
        let (h, store) = handler(vec![TodoItem::new(1, "a"), TodoItem::new(2, "b")]);
        let resp = h.handle(&ApiRequest::new("DELETE").with_body("garbage")).await;
        assert_eq!(resp.status_code, 200);
        assert_eq!(json(&resp)["message"], "All todos deleted");
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn options_is_empty_200() {
        let (h, _) = handler(vec![]);
        let resp = h.handle(&ApiRequest::new("OPTIONS")).await;
        assert_eq!(resp.status_code, 200);
        assert!(resp.body.is_empty());
        assert_eq!(resp.headers["Access-Control-Allow-Origin"], "*");
    }

    #[tokio::test]
    async fn unsupported_method_is_405() {
        let (h, _) = handler(vec![]);
        let resp = h.handle(&ApiRequest::new("PATCH")).await;
        assert_eq!(resp.status_code, 405);
        assert_eq!(json(&resp)["method"], "PATCH");
    }

    #[tokio::test]
    async fn padded_method_is_405() {
        let (h, _) = handler(vec![TodoItem::new(1, "a")]);
        let resp = h.handle(&ApiRequest::new(" get ")).await;
        assert_eq!(resp.status_code, 405);
        assert_eq!(json(&resp)["method"], " GET ");
    }

    struct BrokenStore;

    #[async_trait]
    impl TodoStore for BrokenStore {
        async fn list_all(&self) -> Result<Vec<TodoItem>, StoreError> {
            Err(StoreError::Backend("table unreachable".into()))
        }
        async fn get(&self, _id: i64) -> Result<Option<TodoItem>, StoreError> {
            Err(StoreError::Backend("table unreachable".into()))
        }
        async fn put(&self, _item: &TodoItem) -> Result<(), StoreError> {
            Err(StoreError::Backend("table unreachable".into()))
        }
        async fn delete(&self, _id: i64) -> Result<(), StoreError> {
            Err(StoreError::Backend("table unreachable".into()))
        }
        async fn delete_all(&self) -> Result<(), StoreError> {
            Err(StoreError::Backend("table unreachable".into()))
        }
    }

    #[tokio::test]
    async fn store_failures_surface_as_500() {
        let h = TodoHandler::new(Arc::new(BrokenStore));
        for request in [
            ApiRequest::new("GET"),
            ApiRequest::new("POST").with_body("{}"),
            ApiRequest::new("PUT").with_body(r#"{"id":1}"#),
            ApiRequest::new("DELETE").with_body(r#"{"id":1}"#),
            ApiRequest::new("DELETE"),
        ] {
            let resp = h.handle(&request).await;
            assert_eq!(resp.status_code, 500, "{:?}", request.method);
            assert!(json(&resp)["error"].as_str().unwrap().contains("table unreachable"));
            assert_eq!(json(&resp)["type"], "StorageFailure");
        }
    }

    #[tokio::test]
    async fn malformed_input_wins_over_store_failure() {
        let h = TodoHandler::new(Arc::new(BrokenStore));
        let resp = h.handle(&ApiRequest::new("POST").with_body("{")).await;
        assert_eq!(resp.status_code, 400);
    }

    #[tokio::test]
    async fn create_at_max_id_is_500() {
        let (h, _) = handler(vec![TodoItem::new(i64::MAX, "last")]);
        let resp = h.handle(&ApiRequest::new("POST").with_body("{}")).await;
        assert_eq!(resp.status_code, 500);
        assert_eq!(json(&resp)["type"], "IdExhausted");
    }
}
