//! Test utilities for integration tests
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::Request,
};
use tempfile::TempDir;

use chatty_proxy::config::AppConfig;
use chatty_proxy::llm::chat::{ChatClient, CompletionOptions, CompletionResponse, UpstreamError};
use chatty_proxy::models::chat::ChatMessage;
use chatty_proxy::server::api::app;
use chatty_proxy::server::state::AppState;

/// Records every completion request and answers with an echo of the last message.
#[derive(Default)]
pub struct StubChatClient {
    calls: AtomicUsize,
    seen: Mutex<Vec<(Vec<ChatMessage>, String, CompletionOptions)>>,
    fail_status: Option<u16>,
}

impl StubChatClient {
    pub fn failing(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(Vec<ChatMessage>, String, CompletionOptions)> {
        self.seen.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ChatClient for StubChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((messages.to_vec(), model.to_string(), options));

        if let Some(status) = self.fail_status {
            return Err(UpstreamError::Status {
                status,
                body: String::from("boom"),
            });
        }

        let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
        Ok(CompletionResponse {
            response: format!("echo: {}", last),
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub client: Arc<StubChatClient>,
    pub dir: TempDir,
}

/// Builds the router against a temporary directory. `configure` can
/// tweak the config before the state is created.
pub fn test_app_with(client: StubChatClient, configure: impl FnOnce(&mut AppConfig)) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = AppConfig {
        conversation_path: dir.path().join("conversation.json"),
        frontend_dir: dir.path().join("static"),
        default_model: String::from("default-model"),
        ..Default::default()
    };
    configure(&mut config);

    let client = Arc::new(client);
    let state = AppState::new(config, client.clone());
    TestApp {
        router: app(state.clone()),
        state,
        client,
        dir,
    }
}

pub fn test_app(configure: impl FnOnce(&mut AppConfig)) -> TestApp {
    test_app_with(StubChatClient::default(), configure)
}

pub fn chat_request(body: serde_json::Value, token: Option<&str>, peer: Option<[u8; 4]>) -> Request<Body> {
    raw_chat_request(body.to_string(), token, peer)
}

pub fn raw_chat_request(body: String, token: Option<&str>, peer: Option<[u8; 4]>) -> Request<Body> {
    let mut builder = Request::builder()
        .uri("/chat")
        .method("POST")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("X-APP-TOKEN", token);
    }
    let mut request = builder.body(Body::from(body)).unwrap();
    if let Some(ip) = peer {
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((ip, 40000))));
    }
    request
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
