//! In-process stand-in for the GitHub Gist API plus a running functions server.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use clarksonbot_lib::config::{Config, GistConfig};
use clarksonbot_lib::endpoints::{router, AppState};

pub const GIST_ID: &str = "test-gist";
pub const FILE: &str = "clarksonTributes.json";

#[derive(Default)]
pub struct FakeGist {
    /// `None` means the gist has no tributes file.
    pub content: Mutex<Option<String>>,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub last_write_auth: Mutex<Option<String>>,
}

impl FakeGist {
    pub async fn content(&self) -> Option<String> {
        self.content.lock().await.clone()
    }

    pub async fn document(&self) -> Value {
        let content = self.content().await.expect("tributes file exists");
        serde_json::from_str(&content).expect("stored content is JSON")
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

async fn read_gist(State(fake): State<Arc<FakeGist>>) -> Response {
    fake.reads.fetch_add(1, Ordering::SeqCst);
    if fake.fail_reads.load(Ordering::SeqCst) {
        return (StatusCode::BAD_GATEWAY, "upstream down").into_response();
    }
    let files = match fake.content().await {
        Some(content) => json!({ FILE: { "content": content, "truncated": false } }),
        None => json!({ "notes.md": { "content": "# nothing here" } }),
    };
    Json(json!({ "id": GIST_ID, "files": files })).into_response()
}

async fn update_gist(
    State(fake): State<Arc<FakeGist>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    fake.writes.fetch_add(1, Ordering::SeqCst);
    *fake.last_write_auth.lock().await = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if fake.fail_writes.load(Ordering::SeqCst) {
        return (StatusCode::FORBIDDEN, Json(json!({ "message": "Resource not accessible" })))
            .into_response();
    }
    let Some(content) = body["files"][FILE]["content"].as_str() else {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "message": "no content" })))
            .into_response();
    };
    *fake.content.lock().await = Some(content.to_string());
    Json(json!({ "id": GIST_ID })).into_response()
}

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    (listener, url)
}

/// Start a fake gist holding `initial` as the tributes file. Returns it with its base URL.
pub async fn spawn_fake_gist(initial: Option<&str>) -> (Arc<FakeGist>, String) {
    let fake = Arc::new(FakeGist {
        content: Mutex::new(initial.map(str::to_string)),
        ..FakeGist::default()
    });
    let app = Router::new()
        .route(&format!("/gists/{GIST_ID}"), get(read_gist).patch(update_gist))
        .with_state(fake.clone());
    let (listener, url) = bind().await;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (fake, url)
}

pub fn config(api_base: &str, token_var: &str) -> Config {
    Config {
        port: 0,
        token_var: token_var.to_string(),
        gist: GistConfig {
            id: GIST_ID.to_string(),
            file_name: FILE.to_string(),
            api_base: api_base.to_string(),
            user_agent: "clarksonbot-tests".to_string(),
        },
    }
}

/// Start the functions against `api_base`. Returns the server's base URL.
pub async fn spawn_app(api_base: &str, token_var: &str) -> String {
    let app = router(AppState::new(config(api_base, token_var)).unwrap());
    let (listener, url) = bind().await;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    url
}

/// Fake gist plus functions server, with `token_var` set to `secret-token`.
pub async fn spawn_stack(initial: Option<&str>, token_var: &str) -> (Arc<FakeGist>, String) {
    std::env::set_var(token_var, "secret-token");
    let (fake, gist_url) = spawn_fake_gist(initial).await;
    let app_url = spawn_app(&gist_url, token_var).await;
    (fake, app_url)
}

pub const TWO_TRIBUTES: &str = r#"{
  "tributes": [
    { "type": "candle", "author": "Ada" },
    { "type": "money", "author": "Linus" }
  ]
}"#;
