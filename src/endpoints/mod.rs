//! The two tribute functions and the combined `/tributes` resource.
//!
//! Handlers accept every method and dispatch themselves so that preflight and
//! 405 responses carry the same CORS headers as successful ones.

use std::sync::Arc;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::gist::GistStore;

pub mod add_tribute;
pub mod get_tributes;
pub mod tributes;

pub const GET_TRIBUTES_PATH: &str = "/.netlify/functions/get-tributes";
pub const ADD_TRIBUTE_PATH: &str = "/.netlify/functions/add-tribute";
pub const TRIBUTES_PATH: &str = "/tributes";

pub(crate) type Headers = &'static [(&'static str, &'static str)];

const JSON_CONTENT: (&str, &str) = ("content-type", "application/json");
const ALLOW_ANY_ORIGIN: (&str, &str) = ("access-control-allow-origin", "*");
const ALLOW_CONTENT_TYPE: (&str, &str) = ("access-control-allow-headers", "Content-Type");

pub(crate) const READ_HEADERS: Headers = &[
    ALLOW_ANY_ORIGIN,
    ALLOW_CONTENT_TYPE,
    ("access-control-allow-methods", "GET, OPTIONS"),
    JSON_CONTENT,
    ("cache-control", "no-cache, no-store, must-revalidate"),
    ("pragma", "no-cache"),
    ("expires", "0"),
];

pub(crate) const WRITE_HEADERS: Headers = &[
    ALLOW_ANY_ORIGIN,
    ALLOW_CONTENT_TYPE,
    ("access-control-allow-methods", "POST, OPTIONS"),
    JSON_CONTENT,
];

pub(crate) const RESOURCE_HEADERS: Headers = &[
    ALLOW_ANY_ORIGIN,
    ALLOW_CONTENT_TYPE,
    ("access-control-allow-methods", "GET, POST, OPTIONS"),
    JSON_CONTENT,
    ("cache-control", "no-cache, no-store, must-revalidate"),
    ("pragma", "no-cache"),
    ("expires", "0"),
];

/// Shared, read-only state handed to every invocation.
pub struct AppState {
    pub config: Config,
    pub store: GistStore,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>> {
        let http = reqwest::Client::builder().build()?;
        let store = GistStore::new(http, config.gist.clone());
        Ok(Arc::new(Self { config, store }))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(GET_TRIBUTES_PATH, any(get_tributes::handler))
        .route(ADD_TRIBUTE_PATH, any(add_tribute::handler))
        .route(TRIBUTES_PATH, any(tributes::handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn with_headers(status: StatusCode, body: String, headers: Headers) -> Response {
    let mut response = (status, body).into_response();
    for (name, value) in headers {
        response
            .headers_mut()
            .insert(*name, HeaderValue::from_static(*value));
    }
    response
}

/// Empty 200 for cross-origin preflight.
pub(crate) fn preflight(headers: Headers) -> Response {
    with_headers(StatusCode::OK, String::new(), headers)
}

pub(crate) fn json_response<T: Serialize>(status: StatusCode, value: &T, headers: Headers) -> Response {
    match serde_json::to_string(value) {
        Ok(body) => with_headers(status, body, headers),
        Err(e) => error_response(&AppError::Json(e), "Failed to encode response", headers),
    }
}

/// Client errors and the missing-credential case carry only `error`; upstream
/// failures get the endpoint's `action` as `error` and the detail as `message`.
pub(crate) fn error_response(err: &AppError, action: &str, headers: Headers) -> Response {
    let body = if err.is_client_error() || matches!(err, AppError::Misconfigured) {
        json!({ "error": err.to_string() })
    } else {
        json!({ "error": action, "message": err.to_string() })
    };
    with_headers(err.status(), body.to_string(), headers)
}
