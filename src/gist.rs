use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::GistConfig;
use crate::error::{AppError, Result};
use crate::tribute::TributesDocument;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

#[derive(Deserialize)]
struct GistResponse {
    #[serde(default)]
    files: HashMap<String, GistFile>,
}

#[derive(Deserialize)]
struct GistFile {
    content: Option<String>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Serialize)]
struct GistUpdate<'a> {
    files: HashMap<&'a str, GistFileUpdate>,
}

#[derive(Serialize)]
struct GistFileUpdate {
    content: String,
}

/// Reads and rewrites the tributes file inside one gist.
///
/// Reads go through the JSON API rather than the raw-content URL: raw gist URLs are
/// cached at the edge for minutes, so a write followed by a raw read would look lost.
/// Writes replace the whole file in one PATCH. Nothing guards against a concurrent
/// writer between the read and the PATCH; the last write wins.
#[derive(Clone)]
pub struct GistStore {
    http: reqwest::Client,
    config: GistConfig,
}

impl GistStore {
    pub fn new(http: reqwest::Client, config: GistConfig) -> Self {
        Self { http, config }
    }

    pub fn file_name(&self) -> &str {
        &self.config.file_name
    }

    fn request(&self, method: reqwest::Method, token: Option<&str>) -> reqwest::RequestBuilder {
        let builder = self
            .http
            .request(method, self.config.gist_url())
            .header("User-Agent", &self.config.user_agent)
            .header("Accept", GITHUB_ACCEPT);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Fetch and parse the current document. `token` is optional for reads.
    pub async fn read_document(&self, token: Option<&str>) -> Result<TributesDocument> {
        let response = self
            .request(reqwest::Method::GET, token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to fetch gist: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Failed to fetch current tributes: {status}"
            )));
        }

        let gist: GistResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid gist response: {e}")))?;

        let name = self.file_name();
        let file = gist
            .files
            .get(name)
            .ok_or_else(|| AppError::Upstream(format!("{name} file not found in gist")))?;
        if file.truncated {
            return Err(AppError::Upstream(format!(
                "{name} is too large to read through the gist API"
            )));
        }
        let content = file
            .content
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::Upstream(format!("{name} file not found in gist")))?;

        debug!("Read {} bytes of {name}", content.len());
        TributesDocument::parse(content)
            .map_err(|e| AppError::Upstream(format!("Failed to parse {name}: {e}")))
    }

    /// Overwrite the file with `document`. Other files in the gist are untouched.
    pub async fn write_document(&self, document: &TributesDocument, token: &str) -> Result<()> {
        let body = GistUpdate {
            files: HashMap::from([(
                self.file_name(),
                GistFileUpdate {
                    content: document.to_pretty_json()?,
                },
            )]),
        };

        let response = self
            .request(reqwest::Method::PATCH, Some(token))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to update gist: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!("GitHub API error ({status}): {detail}");
            return Err(AppError::Upstream(format!("Failed to update gist: {status}")));
        }

        Ok(())
    }
}
