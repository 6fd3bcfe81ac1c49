//! Full pipeline lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port and drives the pipeline through
//! a reqwest-backed `Transport` over real HTTP, observing the notification
//! stream through an unbounded channel sink.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::mpsc;

use api_core::{
    Api, ApiError, ApiEvent, ApiSettings, HttpMethod, PendingRequests, RawResponse, RequestOptions,
    Target, Transport,
};

/// Executes assembled requests with reqwest. Status interpretation stays in
/// the pipeline: any response — 4xx/5xx included — comes back as `Ok`.
struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn perform(&self, url: &str, options: &RequestOptions) -> Result<RawResponse, ApiError> {
        let method = reqwest::Method::from_bytes(options.method.as_str().as_bytes())
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let mut request = self.client.request(method, url);
        for (key, value) in &options.headers {
            request = request.header(key.as_str(), value.as_str());
        }
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }

        let response = request.send().await.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(RawResponse {
            status: status.as_u16(),
            ok: status.is_success(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

async fn start_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        mock_server::run(listener).await.unwrap();
    });
    addr
}

fn drain(rx: &mut mpsc::UnboundedReceiver<ApiEvent>) -> Vec<ApiEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn user_lifecycle_over_real_http() {
    let addr = start_server().await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let api = Api::new(
        ApiSettings {
            base_url: format!("http://{addr}/api/"),
            check_internet_connection: false,
            ..ApiSettings::default()
        },
        Arc::new(tx),
        Arc::new(ReqwestTransport::new()),
    );

    // Step 1: create a user.
    let outcome = api.post("users", &json!({"id": 5, "name": "a"}), &[]).await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.status(), Some(201));

    // Step 2: fetch it through the structured URL form.
    let outcome = api.get(Target::structured("users", &[("id", "5")]), &[]).await;
    assert!(outcome.success);
    assert_eq!(outcome.url, format!("http://{addr}/api/users?id=5"));
    assert_eq!(outcome.json().unwrap()["name"], "a");

    // Step 3: a missing user classifies as failure with the exact status.
    let outcome = api.get(Target::structured("users", &[("id", "99")]), &[]).await;
    assert!(!outcome.success);
    assert_eq!(outcome.status(), Some(404));
    assert_eq!(outcome.json().unwrap()["error"], "user not found");

    // Step 4: a body that is not JSON classifies as failure with the
    // response retained.
    let outcome = api.get("broken", &[]).await;
    assert!(!outcome.success);
    assert_eq!(outcome.status(), Some(200));
    assert!(outcome.body.is_none());

    // The stream pairs one Requested with one terminal event per call.
    let events = drain(&mut rx);
    assert_eq!(events.len(), 8);
    let mut state = PendingRequests::default();
    for event in &events {
        state.reduce(event);
    }
    assert_eq!(state.pending, 0);

    match &events[2] {
        ApiEvent::Requested { url, method, .. } => {
            assert_eq!(url, &format!("http://{addr}/api/users?id=5"));
            assert_eq!(*method, HttpMethod::Get);
        }
        other => panic!("expected Requested, got {other:?}"),
    }
    match &events[5] {
        ApiEvent::Failed { status, status_text, json, .. } => {
            assert_eq!(*status, Some(404));
            assert_eq!(status_text.as_deref(), Some("Not Found"));
            assert_eq!(json.as_ref().unwrap()["error"], "user not found");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn transport_failure_against_closed_port() {
    // Bind and immediately drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let api = Api::new(
        ApiSettings {
            base_url: format!("http://{addr}/api/"),
            check_internet_connection: false,
            ..ApiSettings::default()
        },
        Arc::new(tx),
        Arc::new(ReqwestTransport::new()),
    );

    let outcome = api.get("users", &[]).await;

    assert!(!outcome.success);
    assert!(outcome.meta.is_none());
    assert!(outcome.body.is_none());

    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], ApiEvent::Requested { .. }));
    assert!(matches!(
        &events[1],
        ApiEvent::Failed { status: None, status_text: None, .. }
    ));
}
