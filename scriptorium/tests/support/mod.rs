//! Shared harness for API integration tests: a scripted gateway, an app
//! router over a temp data directory, and JSON request helpers.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use scriptorium::api;
use scriptorium::app_state::AppState;
use scriptorium::config::Config;
use scriptorium::gateway::{ActionReply, WritingGateway};
use shared_types::{ActionKind, AnalysisResult, ChatMessage};

/// Canned gateway: fixed responses, call counters.
pub struct ScriptedGateway {
    pub chat_reply: String,
    pub action_text: String,
    pub action_failed: bool,
    pub analysis: AnalysisResult,
    pub completion: String,
    pub analyze_calls: AtomicUsize,
    pub chat_calls: AtomicUsize,
    pub action_calls: AtomicUsize,
    pub autocomplete_calls: AtomicUsize,
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self {
            chat_reply: "scripted reply".to_string(),
            action_text: "rewritten text".to_string(),
            action_failed: false,
            analysis: AnalysisResult::default(),
            completion: String::new(),
            analyze_calls: AtomicUsize::new(0),
            chat_calls: AtomicUsize::new(0),
            action_calls: AtomicUsize::new(0),
            autocomplete_calls: AtomicUsize::new(0),
        }
    }
}

impl ScriptedGateway {
    pub fn action_calls(&self) -> usize {
        self.action_calls.load(Ordering::SeqCst)
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WritingGateway for ScriptedGateway {
    async fn analyze(&self, _text: &str) -> AnalysisResult {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        self.analysis.clone()
    }

    async fn chat(&self, _: &[ChatMessage], _: &str, _: &str) -> String {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        self.chat_reply.clone()
    }

    async fn autocomplete(&self, _: &str) -> String {
        self.autocomplete_calls.fetch_add(1, Ordering::SeqCst);
        self.completion.clone()
    }

    async fn quick_action(&self, _: ActionKind, _: &str, _: Option<&str>) -> ActionReply {
        self.action_calls.fetch_add(1, Ordering::SeqCst);
        ActionReply {
            text: self.action_text.clone(),
            failed: self.action_failed,
        }
    }
}

pub async fn setup_test_app() -> (axum::Router, Arc<ScriptedGateway>, tempfile::TempDir) {
    setup_with_gateway(ScriptedGateway::default()).await
}

pub async fn setup_with_gateway(
    gateway: ScriptedGateway,
) -> (axum::Router, Arc<ScriptedGateway>, tempfile::TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let gateway = Arc::new(gateway);

    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        data_dir: temp_dir.path().to_path_buf(),
        model: "test-model".to_string(),
        api_key: None,
    };
    let app_state = AppState::new(config, gateway.clone());
    let app = api::router().with_state(api::ApiState { app_state });
    (app, gateway, temp_dir)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn put_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn json_response(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    use tower::ServiceExt;
    let response = app.clone().oneshot(req).await.expect("Request failed");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    let value: Value = serde_json::from_slice(&body).expect("Invalid JSON response");
    (status, value)
}

pub async fn raw_response(
    app: &axum::Router,
    req: Request<Body>,
) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    use tower::ServiceExt;
    let response = app.clone().oneshot(req).await.expect("Request failed");
    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes()
        .to_vec();
    (status, headers, body)
}

/// Convenience for tests that write a document first.
pub async fn put_document(app: &axum::Router, content: &str, base_rev: u64) -> Value {
    let (status, body) = json_response(
        app,
        put_json(
            "/api/document",
            serde_json::json!({ "content": content, "base_rev": base_rev }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "put_document failed: {body}");
    body
}

/// Capture a selection over `[start, end)`.
pub async fn put_selection(app: &axum::Router, start: usize, end: usize) -> Value {
    let (status, body) = json_response(
        app,
        put_json(
            "/api/selection",
            serde_json::json!({ "start": start, "end": end }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "put_selection failed: {body}");
    body
}
