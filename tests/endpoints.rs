mod common;

use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use clarksonbot_lib::endpoints::{ADD_TRIBUTE_PATH, GET_TRIBUTES_PATH, TRIBUTES_PATH};
use clarksonbot_lib::gist::GistStore;
use clarksonbot_lib::tribute::{Tribute, TributeKind};
use common::{spawn_app, spawn_fake_gist, spawn_stack, TWO_TRIBUTES};

async fn post_json(url: &str, body: &Value) -> (StatusCode, Value) {
    let response = reqwest::Client::new().post(url).json(body).send().await.unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_read_returns_document_without_caching() {
    let (_fake, app) = spawn_stack(Some(TWO_TRIBUTES), "CLARKSONBOT_TEST_TOKEN_READ").await;

    let response = reqwest::get(format!("{app}{GET_TRIBUTES_PATH}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["cache-control"], "no-cache, no-store, must-revalidate");
    assert_eq!(headers["pragma"], "no-cache");
    assert_eq!(headers["expires"], "0");
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["content-type"], "application/json");

    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "tributes": [
            { "type": "candle", "author": "Ada" },
            { "type": "money", "author": "Linus" },
        ]})
    );
}

#[tokio::test]
async fn test_read_works_without_credential() {
    let (fake, gist) = spawn_fake_gist(Some("{}")).await;
    let app = spawn_app(&gist, "CLARKSONBOT_TEST_TOKEN_NEVER_SET_READ").await;

    let response = reqwest::get(format!("{app}{GET_TRIBUTES_PATH}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<Value>().await.unwrap(), json!({ "tributes": [] }));
    assert_eq!(fake.reads(), 1);
}

#[tokio::test]
async fn test_preflight_and_wrong_methods() {
    let (fake, app) = spawn_stack(Some(TWO_TRIBUTES), "CLARKSONBOT_TEST_TOKEN_METHODS").await;
    let client = reqwest::Client::new();

    for (path, methods) in [
        (GET_TRIBUTES_PATH, "GET, OPTIONS"),
        (ADD_TRIBUTE_PATH, "POST, OPTIONS"),
        (TRIBUTES_PATH, "GET, POST, OPTIONS"),
    ] {
        let response = client
            .request(Method::OPTIONS, format!("{app}{path}"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{path}");
        assert_eq!(response.headers()["access-control-allow-methods"], methods);
        assert!(response.text().await.unwrap().is_empty());
    }

    let response = client.post(format!("{app}{GET_TRIBUTES_PATH}")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({ "error": "Method not allowed. Use GET." })
    );

    let response = client.get(format!("{app}{ADD_TRIBUTE_PATH}")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({ "error": "Method not allowed. Use POST." })
    );

    let response = client.delete(format!("{app}{TRIBUTES_PATH}")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    assert_eq!(fake.reads(), 0);
    assert_eq!(fake.writes(), 0);
}

#[tokio::test]
async fn test_write_then_read_appends_trimmed_tribute() {
    let (fake, app) = spawn_stack(Some(TWO_TRIBUTES), "CLARKSONBOT_TEST_TOKEN_WRITE").await;

    let (status, body) = post_json(
        &format!("{app}{ADD_TRIBUTE_PATH}"),
        &json!({ "type": "bow", "author": "   Grace Hopper  " }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "message": "Tribute added successfully",
            "tribute": { "type": "bow", "author": "Grace Hopper" },
        })
    );
    assert_eq!(fake.writes(), 1);
    assert_eq!(
        fake.last_write_auth.lock().await.as_deref(),
        Some("Bearer secret-token")
    );

    // Written back pretty-printed.
    assert!(fake.content().await.unwrap().contains("\n  \"tributes\": [\n"));

    let tributes: Value = reqwest::get(format!("{app}{GET_TRIBUTES_PATH}"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let list = tributes["tributes"].as_array().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0]["author"], "Ada");
    assert_eq!(list[2], json!({ "type": "bow", "author": "Grace Hopper" }));
}

#[tokio::test]
async fn test_validation_failures_leave_document_unchanged() {
    let (fake, app) = spawn_stack(Some(TWO_TRIBUTES), "CLARKSONBOT_TEST_TOKEN_VALIDATE").await;
    let url = format!("{app}{ADD_TRIBUTE_PATH}");

    let cases = [
        (json!({ "type": "candle", "author": "" }), "Missing required fields: type and author"),
        (json!({ "author": "Ada" }), "Missing required fields: type and author"),
        (
            json!({ "type": "flowers", "author": "Ada" }),
            "Invalid tribute type. Must be: candle, bow, or money",
        ),
        (
            json!({ "type": "candle", "author": "x".repeat(51) }),
            "Author name must be 1-50 characters",
        ),
        (json!({ "type": "candle", "author": "   " }), "Author name must be 1-50 characters"),
    ];
    for (body, message) in cases {
        let (status, response) = post_json(&url, &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(response, json!({ "error": message }));
    }

    let response = reqwest::Client::new()
        .post(&url)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({ "error": "Invalid JSON in request body" })
    );

    assert_eq!(fake.writes(), 0);
    assert_eq!(fake.reads(), 0);
    assert_eq!(fake.content().await.as_deref(), Some(TWO_TRIBUTES));
}

#[tokio::test]
async fn test_missing_credential_never_touches_upstream() {
    let (fake, gist) = spawn_fake_gist(Some(TWO_TRIBUTES)).await;
    let app = spawn_app(&gist, "CLARKSONBOT_TEST_TOKEN_NEVER_SET_WRITE").await;

    let (status, body) = post_json(
        &format!("{app}{ADD_TRIBUTE_PATH}"),
        &json!({ "type": "candle", "author": "Ada" }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "Server configuration error. GitHub token not configured." })
    );
    assert_eq!(fake.reads(), 0);
    assert_eq!(fake.writes(), 0);
    assert_eq!(fake.content().await.as_deref(), Some(TWO_TRIBUTES));
}

#[tokio::test]
async fn test_upstream_failures_are_500_with_detail() {
    let (fake, app) = spawn_stack(Some(TWO_TRIBUTES), "CLARKSONBOT_TEST_TOKEN_UPSTREAM").await;
    fake.fail_reads.store(true, std::sync::atomic::Ordering::SeqCst);

    let response = reqwest::get(format!("{app}{GET_TRIBUTES_PATH}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to fetch tributes");
    assert!(body["message"].as_str().unwrap().contains("502"));

    let (status, body) = post_json(
        &format!("{app}{ADD_TRIBUTE_PATH}"),
        &json!({ "type": "candle", "author": "Ada" }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to add tribute");
    assert_eq!(fake.writes(), 0);
}

#[tokio::test]
async fn test_rejected_update_is_500_and_keeps_document() {
    let (fake, app) = spawn_stack(Some(TWO_TRIBUTES), "CLARKSONBOT_TEST_TOKEN_PATCH_FAIL").await;
    fake.fail_writes.store(true, std::sync::atomic::Ordering::SeqCst);

    let (status, body) = post_json(
        &format!("{app}{ADD_TRIBUTE_PATH}"),
        &json!({ "type": "bow", "author": "Ada" }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "error": "Failed to add tribute",
            "message": "Failed to update gist: 403 Forbidden",
        })
    );
    assert_eq!(fake.reads(), 1);
    assert_eq!(fake.writes(), 1);
    assert_eq!(fake.content().await.as_deref(), Some(TWO_TRIBUTES));
}

#[tokio::test]
async fn test_read_returns_stored_json_untouched() {
    let stored = r#"{
  "title": "Clarkson wall",
  "tributes": [
    { "type": "candle", "author": "Ada", "when": "2024-05-01" },
    { "type": "flowers", "author": "Bo" }
  ]
}"#;
    let (fake, app) = spawn_stack(Some(stored), "CLARKSONBOT_TEST_TOKEN_VERBATIM").await;

    let body: Value = reqwest::get(format!("{app}{GET_TRIBUTES_PATH}"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, serde_json::from_str::<Value>(stored).unwrap());

    // An entry this crate cannot type does not block new tributes.
    let (status, _) = post_json(
        &format!("{app}{ADD_TRIBUTE_PATH}"),
        &json!({ "type": "money", "author": "Cy" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        fake.document().await,
        json!({
            "title": "Clarkson wall",
            "tributes": [
                { "type": "candle", "author": "Ada", "when": "2024-05-01" },
                { "type": "flowers", "author": "Bo" },
                { "type": "money", "author": "Cy" },
            ]
        })
    );
}

#[tokio::test]
async fn test_null_list_accepts_first_tribute() {
    let (fake, app) = spawn_stack(Some(r#"{"tributes":null}"#), "CLARKSONBOT_TEST_TOKEN_NULL_LIST").await;

    let response = reqwest::get(format!("{app}{GET_TRIBUTES_PATH}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<Value>().await.unwrap(), json!({ "tributes": null }));

    let (status, _) = post_json(
        &format!("{app}{ADD_TRIBUTE_PATH}"),
        &json!({ "type": "candle", "author": "Ada" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        fake.document().await,
        json!({ "tributes": [{ "type": "candle", "author": "Ada" }] })
    );
}

#[tokio::test]
async fn test_missing_or_corrupt_file_is_500() {
    let (fake, app) = spawn_stack(None, "CLARKSONBOT_TEST_TOKEN_NOFILE").await;
    let response = reqwest::get(format!("{app}{GET_TRIBUTES_PATH}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "clarksonTributes.json file not found in gist");

    *fake.content.lock().await = Some("{\"tributes\": [".to_string());
    let response = reqwest::get(format!("{app}{GET_TRIBUTES_PATH}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_combined_resource() {
    let (fake, app) = spawn_stack(Some("{}"), "CLARKSONBOT_TEST_TOKEN_COMBINED").await;
    let url = format!("{app}{TRIBUTES_PATH}");

    let (status, _) = post_json(&url, &json!({ "type": "money", "author": "Ada" })).await;
    assert_eq!(status, StatusCode::OK);

    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.headers()["pragma"], "no-cache");
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({ "tributes": [{ "type": "money", "author": "Ada" }] })
    );
    assert_eq!(fake.writes(), 1);
}

// Two writers that both read before either writes: the second PATCH wins and the
// first addition is lost. Nothing in the store prevents this.
#[tokio::test]
async fn test_concurrent_writers_last_writer_wins() {
    let (fake, gist) = spawn_fake_gist(Some("{}")).await;
    let store = GistStore::new(reqwest::Client::new(), common::config(&gist, "UNUSED").gist);

    let mut first = store.read_document(None).await.unwrap();
    let mut second = store.read_document(None).await.unwrap();

    first.append(&Tribute::new(TributeKind::Candle, "first").unwrap()).unwrap();
    store.write_document(&first, "token").await.unwrap();
    second.append(&Tribute::new(TributeKind::Bow, "second").unwrap()).unwrap();
    store.write_document(&second, "token").await.unwrap();

    let stored = fake.document().await;
    assert_eq!(stored, json!({ "tributes": [{ "type": "bow", "author": "second" }] }));
}
