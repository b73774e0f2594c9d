use reqwest::Url;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{AppError, Result};
use crate::tribute::{Tribute, TributeKind, TributesDocument};

/// Port of the front-end dev server. Pages served from it talk to the local functions server.
pub const DEV_SERVER_PORT: u16 = 5173;
pub const DEV_FUNCTIONS_BASE: &str = "http://localhost:8888/.netlify/functions/";
const FUNCTIONS_PATH: &str = "/.netlify/functions/";

/// Calls the tribute functions on behalf of a page loaded from `page_origin`.
#[derive(Clone)]
pub struct TributeClient {
    http: reqwest::Client,
    page_origin: Url,
}

impl TributeClient {
    pub fn new(page_origin: &str) -> Result<Self> {
        let page_origin = Url::parse(page_origin)
            .map_err(|e| AppError::Custom(format!("Invalid page origin '{page_origin}': {e}")))?;
        Ok(Self {
            http: reqwest::Client::new(),
            page_origin,
        })
    }

    pub fn page_origin(&self) -> &Url {
        &self.page_origin
    }

    /// Resolve a function URL. Decided per call, from the page's port.
    pub fn function_url(&self, function_name: &str) -> Result<Url> {
        let url = if self.page_origin.port() == Some(DEV_SERVER_PORT) {
            Url::parse(DEV_FUNCTIONS_BASE).and_then(|base| base.join(function_name))
        } else {
            self.page_origin.join(&format!("{FUNCTIONS_PATH}{function_name}"))
        };
        url.map_err(|e| AppError::Custom(format!("Invalid function URL for {function_name}: {e}")))
    }

    /// All tributes, oldest first. A document without `tributes` reads as empty and
    /// entries that are not valid tributes are left out.
    pub async fn fetch_tributes(&self) -> Result<Vec<Tribute>> {
        let response = self
            .http
            .get(self.function_url("get-tributes")?)
            .header("Cache-Control", "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Failed to fetch tributes: {status}"
            )));
        }

        let document: TributesDocument = response.json().await?;
        Ok(document.tributes())
    }

    /// Submit a tribute. On failure the function's own `error` text is surfaced when present.
    pub async fn add_tribute(&self, kind: TributeKind, author: &str) -> Result<()> {
        let response = self
            .http
            .post(self.function_url("add-tribute")?)
            .json(&json!({ "type": kind, "author": author }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("error")?.as_str().map(str::to_string))
                .unwrap_or_else(|| format!("Failed to add tribute: {status}"));
            return Err(if status.is_client_error() {
                AppError::Validation(message)
            } else {
                AppError::Upstream(message)
            });
        }

        let result: Value = response.json().await?;
        debug!("Tribute added: {result}");
        Ok(())
    }
}
