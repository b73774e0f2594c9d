use axum::http::StatusCode;

/// All errors that can occur while serving tributes or editing the mascot.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Bad input from the caller. The message is returned verbatim.
    #[error("{0}")]
    Validation(String),

    /// Carries the methods the endpoint accepts, e.g. "GET" or "GET or POST".
    #[error("Method not allowed. Use {0}.")]
    MethodNotAllowed(&'static str),

    #[error("Server configuration error. GitHub token not configured.")]
    Misconfigured,

    /// Read, parse or write failure against the gist.
    #[error("{0}")]
    Upstream(String),

    #[error("SVG error: {0}")]
    Svg(String),

    #[error("{0}")]
    Custom(String),
}

impl AppError {
    /// HTTP status an endpoint answers with for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error is the caller's fault (and so is reported without a wrapper).
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
