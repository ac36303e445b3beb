//! Response builder: wraps a status and an already-serialized body.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::http::ApiResponse;

pub const ALLOW_HEADERS: &str = "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token";

/// Wrap `body` verbatim, attaching the fixed content-type and CORS headers.
pub fn build(status_code: u16, body: impl Into<String>) -> ApiResponse {
    let headers = BTreeMap::from([
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        (
            "Access-Control-Allow-Methods".to_string(),
            "GET,POST,PUT,DELETE,OPTIONS".to_string(),
        ),
        ("Access-Control-Allow-Headers".to_string(), ALLOW_HEADERS.to_string()),
    ]);
    ApiResponse {
        status_code,
        headers,
        body: body.into(),
    }
}

/// Serialize `value` and wrap it.
///
/// Serializing the crate's own types cannot fail; should a caller pass
/// something that does, the failure is reported as a 500 body.
pub fn json<T: Serialize + ?Sized>(status_code: u16, value: &T) -> ApiResponse {
    match serde_json::to_string(value) {
        Ok(body) => build(status_code, body),
        Err(e) => {
            tracing::error!(error = %e, "response serialization failed");
            let body = serde_json::json!({ "error": e.to_string(), "type": "SerializationError" });
            build(500, body.to_string())
        }
    }
}

/// `{"message": ...}` confirmation body.
pub fn message(status_code: u16, message: &str) -> ApiResponse {
    json(status_code, &serde_json::json!({ "message": message }))
}
