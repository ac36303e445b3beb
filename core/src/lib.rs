//! Request-handling core for the todo service.
//!
//! # Overview
//! Consumes `ApiRequest` values and produces `ApiResponse` values without
//! touching the network (host-does-IO pattern). The hosting runtime owns the
//! transport; this crate owns routing, validation, ID assignment and storage
//! consistency.
//!
//! # Design
//! - `router::route` picks one `Route` per request from the method (and, for
//!   `DELETE`, the body).
//! - `TodoHandler` runs the routed operation against an injected
//!   `TodoStore` and never fails: every error becomes a response.
//! - `TodoStore` is the storage port. `MemoryStore` keeps items in process
//!   memory; `TableStore` maps items onto any `KeyValueTable`.
//! - `response::build` attaches the fixed JSON and CORS headers.

pub mod error;
pub mod handler;
pub mod http;
pub mod response;
pub mod router;
pub mod store;
pub mod types;

pub use error::{ApiError, StoreError};
pub use handler::TodoHandler;
pub use http::{ApiRequest, ApiResponse};
pub use router::{route, Route};
pub use store::{AttributeValue, Item, KeyValueTable, MemoryStore, TableStore, TodoStore};
pub use types::{TodoItem, TodoPayload};
