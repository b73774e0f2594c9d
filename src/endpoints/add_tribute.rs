use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::Response,
};
use serde_json::json;
use tracing::{error, info, warn};

use super::{error_response, json_response, preflight, AppState, Headers, WRITE_HEADERS};
use crate::error::{AppError, Result};
use crate::tribute::{validate_submission, Tribute};

/// `add-tribute`: POST appends one tribute, OPTIONS answers preflight.
pub async fn handler(State(state): State<Arc<AppState>>, method: Method, body: Bytes) -> Response {
    match method {
        Method::OPTIONS => preflight(WRITE_HEADERS),
        Method::POST => write(&state, &body, WRITE_HEADERS).await,
        _ => error_response(&AppError::MethodNotAllowed("POST"), "", WRITE_HEADERS),
    }
}

pub(crate) async fn write(state: &AppState, body: &[u8], headers: Headers) -> Response {
    match add(state, body).await {
        Ok(tribute) => json_response(
            StatusCode::OK,
            &json!({
                "success": true,
                "message": "Tribute added successfully",
                "tribute": tribute,
            }),
            headers,
        ),
        Err(e) => {
            if e.is_client_error() {
                warn!("Rejected tribute: {e}");
            } else {
                error!("Error adding tribute: {e}");
            }
            error_response(&e, "Failed to add tribute", headers)
        }
    }
}

/// Credential check, validation, then read-append-overwrite against the gist.
async fn add(state: &AppState, body: &[u8]) -> Result<Tribute> {
    let token = state.config.token().ok_or_else(|| {
        error!("{} environment variable is not set", state.config.token_var);
        AppError::Misconfigured
    })?;

    let tribute = validate_submission(body)?;

    let mut document = state.store.read_document(Some(&token)).await?;
    document.append(&tribute)?;
    state.store.write_document(&document, &token).await?;

    info!(
        kind = %tribute.kind,
        total = document.entries().len(),
        "Tribute added"
    );
    Ok(tribute)
}
