//! Transport-neutral request and response shapes.
//!
//! # Design
//! The hosting runtime decodes whatever it received into an `ApiRequest` and
//! writes the returned `ApiResponse` back out. Both types serialize to the
//! proxy-event JSON shape (`httpMethod`, `statusCode`, ...), so an adapter can
//! pass events through without its own DTOs. All fields are owned.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An inbound request described as plain data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequest {
    #[serde(default, rename = "httpMethod", alias = "method")]
    pub method: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
}

impl ApiRequest {
    pub fn new(method: &str) -> Self {
        Self {
            method: Some(method.to_string()),
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// The body, or `None` when it is absent or empty.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref().filter(|b| !b.is_empty())
    }
}

/// An outbound response described as plain data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}
