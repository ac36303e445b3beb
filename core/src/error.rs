//! Error types for the todo core.
//!
//! # Design
//! `StoreError` is what a storage backend may raise; it carries only a
//! message so backends never leak their driver types through the port.
//! `ApiError` is the request-level taxonomy. Each variant maps to exactly one
//! status code, and `ApiError::into_response` is the single place where an
//! error turns into a JSON body.

use serde_json::json;
use thiserror::Error;

use crate::http::ApiResponse;
use crate::response;
use crate::router::ALLOWED_METHODS;

/// Errors raised by a `TodoStore` or `KeyValueTable` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing medium failed (connectivity, driver, I/O).
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored row could not be mapped back to a `TodoItem`.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Errors produced while handling a single request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Create or update arrived without a body.
    #[error("Request body is required")]
    MissingBody,

    /// The body parsed to JSON `null`.
    #[error("Invalid todo item")]
    InvalidItem,

    /// The body is not a valid todo payload.
    #[error("Invalid JSON format: {0}")]
    MalformedInput(String),

    /// Update referenced an id that is not stored.
    #[error("Todo not found")]
    NotFound,

    /// The method is outside the supported set.
    #[error("Method not allowed: {0}")]
    UnsupportedMethod(String),

    /// The storage port raised.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The largest stored id leaves no room for another.
    #[error("no ids left to assign")]
    IdExhausted,
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::MissingBody | ApiError::InvalidItem | ApiError::MalformedInput(_) => 400,
            ApiError::NotFound => 404,
            ApiError::UnsupportedMethod(_) => 405,
            ApiError::Storage(_) | ApiError::IdExhausted => 500,
        }
    }

    /// Short name of the failure, reported as `type` on 500 responses.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::MissingBody => "MissingBody",
            ApiError::InvalidItem => "InvalidItem",
            ApiError::MalformedInput(_) => "MalformedInput",
            ApiError::NotFound => "NotFound",
            ApiError::UnsupportedMethod(_) => "UnsupportedMethod",
            ApiError::Storage(StoreError::Backend(_)) => "StorageFailure",
            ApiError::Storage(StoreError::Corrupt(_)) => "CorruptRecord",
            ApiError::IdExhausted => "IdExhausted",
        }
    }

    pub fn into_response(self) -> ApiResponse {
        let status = self.status();
        let body = match &self {
            ApiError::MalformedInput(details) => json!({
                "error": "Invalid JSON format",
                "details": details,
            }),
            ApiError::UnsupportedMethod(method) => json!({
                "error": "Method not allowed",
                "method": method,
                "allowed": ALLOWED_METHODS,
            }),
            ApiError::Storage(_) | ApiError::IdExhausted => json!({
                "error": self.to_string(),
                "type": self.kind(),
            }),
            _ => json!({ "error": self.to_string() }),
        };
        response::json(status, &body)
    }
}
