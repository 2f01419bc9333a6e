use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, MockConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

const KEY: &str = "abc123";
const TOKEN: &str = "tok1";

fn server() -> Router {
    app(MockConfig::new(KEY, TOKEN))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn x_error(response: &axum::response::Response) -> &str {
    response.headers()["x-error"].to_str().unwrap()
}

/// Merge credentials into `body` the way a well-behaved client does.
fn authed(mut body: Value) -> Value {
    body["consumer_key"] = json!(KEY);
    body["access_token"] = json!(TOKEN);
    body
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

async fn call(app: &Router, method: &str, uri: &str, body: Value) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(method, uri, &body))
        .await
        .unwrap()
}

// --- retrieve ---

#[tokio::test]
async fn retrieve_empty_list() {
    let app = server();
    let resp = call(&app, "GET", "/v3/get", authed(json!({}))).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], 1);
    assert_eq!(body["list"], json!({}));
}

#[tokio::test]
async fn retrieve_accepts_post() {
    let app = server();
    let resp = call(&app, "POST", "/v3/get", authed(json!({"state": "all"}))).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn retrieve_applies_count_and_offset() {
    let app = server();
    for url in ["http://a", "http://b", "http://c"] {
        call(&app, "POST", "/v3/add", authed(json!({"url": url}))).await;
    }

    let resp = call(
        &app,
        "GET",
        "/v3/get",
        authed(json!({"sort": "oldest", "count": 1, "offset": 1})),
    )
    .await;
    let list = body_json(resp).await["list"].clone();
    let list = list.as_object().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list["2"]["given_url"], "http://b");
    assert_eq!(list["2"]["sort_id"], 0);
}

// --- add ---

#[tokio::test]
async fn add_returns_item() {
    let app = server();
    let resp = call(
        &app,
        "POST",
        "/v3/add",
        authed(json!({"url": "http://x", "title": "t", "tags": "a,b"})),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["item"]["given_url"], "http://x");
    assert_eq!(body["item"]["given_title"], "t");
    assert_eq!(body["item"]["tags"], json!(["a", "b"]));
}

#[tokio::test]
async fn add_without_url_is_bad_request() {
    let app = server();
    let resp = call(&app, "POST", "/v3/add", authed(json!({"title": "t"}))).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(x_error(&resp), mock_server::BAD_REQUEST_MESSAGE);
    assert!(body_bytes(resp).await.is_empty());
}

// --- send ---

#[tokio::test]
async fn send_batch_reports_each_result() {
    let app = server();
    call(&app, "POST", "/v3/add", authed(json!({"url": "http://x"}))).await;

    let resp = call(
        &app,
        "POST",
        "/v3/send",
        authed(json!({"actions": [
            {"action": "favorite", "item_id": "1"},
            {"action": "archive", "item_id": "99"},
        ]})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["action_results"], json!([true, false]));

    let resp = call(&app, "GET", "/v3/get", authed(json!({"favorite": 1}))).await;
    assert_eq!(body_json(resp).await["list"]["1"]["favorite"], "1");
}

#[tokio::test]
async fn send_accepts_single_flattened_action() {
    let app = server();
    call(&app, "POST", "/v3/add", authed(json!({"url": "http://x"}))).await;

    let resp = call(
        &app,
        "POST",
        "/v3/send",
        authed(json!({"action": "archive", "item_id": "1"})),
    )
    .await;
    assert_eq!(body_json(resp).await["action_results"], json!([true]));

    let resp = call(&app, "GET", "/v3/get", authed(json!({"state": "archive"}))).await;
    assert!(body_json(resp).await["list"].get("1").is_some());
}

#[tokio::test]
async fn send_empty_batch_is_ok() {
    let app = server();
    let resp = call(&app, "POST", "/v3/send", authed(json!({"actions": []}))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["action_results"], json!([]));
}

#[tokio::test]
async fn send_without_actions_is_bad_request() {
    let app = server();
    let resp = call(&app, "POST", "/v3/send", authed(json!({"item_id": "1"}))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- failures ---

#[tokio::test]
async fn wrong_consumer_key_is_unauthorized() {
    let app = server();
    let mut body = authed(json!({}));
    body["consumer_key"] = json!("nope");
    let resp = call(&app, "GET", "/v3/get", body).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(x_error(&resp), mock_server::INVALID_CONSUMER_KEY_MESSAGE);
}

#[tokio::test]
async fn missing_access_token_is_unauthorized() {
    let app = server();
    let resp = call(&app, "GET", "/v3/get", json!({"consumer_key": KEY})).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(x_error(&resp), mock_server::INVALID_ACCESS_TOKEN_MESSAGE);
}

#[tokio::test]
async fn request_limit_returns_403() {
    let app = app(MockConfig::new(KEY, TOKEN).with_request_limit(1));
    let first = call(&app, "GET", "/v3/get", authed(json!({}))).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = call(&app, "GET", "/v3/get", authed(json!({}))).await;
    assert_eq!(second.status(), StatusCode::FORBIDDEN);
    assert_eq!(x_error(&second), mock_server::RATE_LIMIT_MESSAGE);
}

#[tokio::test]
async fn maintenance_returns_503() {
    let app = app(MockConfig::new(KEY, TOKEN).in_maintenance());
    let resp = call(&app, "POST", "/v3/add", authed(json!({"url": "http://x"}))).await;

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(x_error(&resp), mock_server::MAINTENANCE_MESSAGE);
}

fn raw_request(content_type: Option<&str>, body: &str) -> Request<String> {
    let mut builder = Request::builder().method("POST").uri("/v3/add");
    if let Some(content_type) = content_type {
        builder = builder.header(http::header::CONTENT_TYPE, content_type);
    }
    builder.body(body.to_string()).unwrap()
}

#[tokio::test]
async fn malformed_json_is_bad_request_with_x_error() {
    let app = server();
    let resp = app
        .oneshot(raw_request(Some("application/json"), "not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(x_error(&resp), mock_server::BAD_REQUEST_MESSAGE);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn non_object_json_is_bad_request_with_x_error() {
    let app = server();
    let resp = app
        .oneshot(raw_request(Some("application/json"), "[1,2]"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(x_error(&resp), mock_server::BAD_REQUEST_MESSAGE);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn missing_content_type_is_bad_request_with_x_error() {
    let app = server();
    let resp = app
        .oneshot(raw_request(None, r#"{"url":"http://x"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(x_error(&resp), mock_server::BAD_REQUEST_MESSAGE);
    assert!(body_bytes(resp).await.is_empty());
}
