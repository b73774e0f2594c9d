use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::Method, response::Response};

use super::{add_tribute, error_response, get_tributes, preflight, AppState, RESOURCE_HEADERS};
use crate::error::AppError;

/// `/tributes`: GET reads, POST appends.
pub async fn handler(State(state): State<Arc<AppState>>, method: Method, body: Bytes) -> Response {
    match method {
        Method::OPTIONS => preflight(RESOURCE_HEADERS),
        Method::GET => get_tributes::read(&state, RESOURCE_HEADERS).await,
        Method::POST => add_tribute::write(&state, &body, RESOURCE_HEADERS).await,
        _ => error_response(&AppError::MethodNotAllowed("GET or POST"), "", RESOURCE_HEADERS),
    }
}
