//! HTTP hosting adapter for `todo-core`.
//!
//! Two surfaces share one `TodoHandler`:
//! - `ANY /todos` (and `ANY /`) turns a plain HTTP request into an
//!   `ApiRequest` and writes the `ApiResponse` back as-is.
//! - `POST /invoke` takes a proxy-event JSON (`httpMethod`, `body`, `headers`)
//!   and answers with the `ApiResponse` JSON, the way a serverless runtime
//!   hands events to a function.

pub mod config;
pub mod sqlite_table;

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, post},
    Json, Router,
};
use serde_json::json;
use todo_core::{response, ApiRequest, ApiResponse, TodoHandler};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

pub use config::{ConfigError, ServerConfig, StoreBackend};
pub use sqlite_table::SqliteTable;

pub fn app(handler: TodoHandler) -> Router {
    Router::new()
        .route("/", any(handle_http))
        .route("/todos", any(handle_http))
        .route("/invoke", post(invoke))
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

pub async fn run(listener: TcpListener, handler: TodoHandler) -> Result<(), std::io::Error> {
    axum::serve(listener, app(handler)).await
}

async fn dispatch(handler: &TodoHandler, request: &ApiRequest) -> ApiResponse {
    let request_id = Uuid::new_v4();
    handler
        .handle(request)
        .instrument(tracing::info_span!("invocation", %request_id))
        .await
}

async fn handle_http(
    State(handler): State<TodoHandler>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // Invalid UTF-8 is passed on lossily so the handler answers it as bad JSON.
    let body = String::from_utf8_lossy(&body).into_owned();
    let request = ApiRequest {
        method: Some(method.as_str().to_string()),
        body: (!body.is_empty()).then_some(body),
        headers: Some(header_map(&headers)),
    };
    into_http(dispatch(&handler, &request).await)
}

async fn invoke(State(handler): State<TodoHandler>, body: Bytes) -> Response {
    let event: Option<ApiRequest> = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "undecodable invoke event");
            let error = json!({ "error": format!("invalid event: {e}") });
            return (StatusCode::BAD_REQUEST, Json(error)).into_response();
        }
    };
    let response = match event {
        Some(request) => dispatch(&handler, &request).await,
        None => {
            tracing::warn!("invoke event is null");
            response::json(400, &json!({ "error": "Request is null" }))
        }
    };
    Json(response).into_response()
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

fn into_http(response: ApiResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut out = (status, response.body).into_response();
    for (name, value) in response.headers {
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                out.headers_mut().insert(name, value);
            }
            _ => tracing::warn!("dropping unrepresentable response header"),
        }
    }
    out
}
