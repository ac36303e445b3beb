//! Maps an inbound request to one CRUD operation.
//!
//! Method matching is lenient: the method is upper-cased and a missing or
//! blank method is treated as `GET`. `DELETE` inspects the body: a payload
//! with a positive id removes that one item, and anything else (no body,
//! unparseable body, `null`, missing or non-positive id) purges the whole
//! collection.

use crate::http::ApiRequest;
use crate::types::TodoPayload;

pub const ALLOWED_METHODS: [&str; 5] = ["GET", "POST", "PUT", "DELETE", "OPTIONS"];

/// The operation selected for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    List,
    Create(Option<String>),
    Update(Option<String>),
    DeleteOne(i64),
    DeleteAll,
    Preflight,
    Reject(String),
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::List => "list",
            Route::Create(_) => "create",
            Route::Update(_) => "update",
            Route::DeleteOne(_) => "delete_one",
            Route::DeleteAll => "delete_all",
            Route::Preflight => "preflight",
            Route::Reject(_) => "reject",
        }
    }
}

/// Normalized method name: upper-cased, with blank mapped to `GET`.
///
/// Surrounding whitespace is kept, so `" get "` is not a known method.
pub fn normalize_method(method: Option<&str>) -> String {
    match method {
        Some(m) if !m.trim().is_empty() => m.to_uppercase(),
        _ => "GET".to_string(),
    }
}

pub fn route(request: &ApiRequest) -> Route {
    let method = normalize_method(request.method.as_deref());
    let body = request.body().map(str::to_string);
    match method.as_str() {
        "GET" => Route::List,
        "POST" => Route::Create(body),
        "PUT" => Route::Update(body),
        "DELETE" => route_delete(body.as_deref()),
        "OPTIONS" => Route::Preflight,
        _ => Route::Reject(method),
    }
}

fn route_delete(body: Option<&str>) -> Route {
    let Some(body) = body else {
        return Route::DeleteAll;
    };
    match TodoPayload::parse(body) {
        Ok(Some(TodoPayload { id: Some(id), .. })) if id > 0 => Route::DeleteOne(id),
        Ok(_) => {
            tracing::warn!("DELETE body carries no positive id, purging all items");
            Route::DeleteAll
        }
        Err(e) => {
            tracing::warn!(error = %e, "DELETE body is unparseable, purging all items");
            Route::DeleteAll
        }
    }
}
