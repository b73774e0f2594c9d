use std::sync::Arc;

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::Response,
};
use tracing::error;

use super::{error_response, json_response, preflight, AppState, Headers, READ_HEADERS};
use crate::error::AppError;

/// `get-tributes`: GET returns the stored document, OPTIONS answers preflight.
pub async fn handler(State(state): State<Arc<AppState>>, method: Method) -> Response {
    match method {
        Method::OPTIONS => preflight(READ_HEADERS),
        Method::GET => read(&state, READ_HEADERS).await,
        _ => error_response(&AppError::MethodNotAllowed("GET"), "", READ_HEADERS),
    }
}

pub(crate) async fn read(state: &AppState, headers: Headers) -> Response {
    // A configured token only raises the rate limit; reads work anonymously.
    let token = state.config.token();
    match state.store.read_document(token.as_deref()).await {
        Ok(document) => json_response(StatusCode::OK, &document, headers),
        Err(e) => {
            error!("Error fetching tributes: {e}");
            error_response(&e, "Failed to fetch tributes", headers)
        }
    }
}
