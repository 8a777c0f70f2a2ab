#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use quark_relay::error::{Error, Result};
use quark_relay::services::audio_store::AudioStore;
use quark_relay::services::chat_relay::ChatRelay;
use quark_relay::services::synthesizer::{SpeechEngine, Synthesizer};
use quark_relay::state::AppState;
use serde_json::{Value, json};

pub const FAKE_MP3: &[u8] = b"ID3\x04\x00fake-mp3-frames";

pub struct FakeEngine;

#[async_trait]
impl SpeechEngine for FakeEngine {
    async fn synthesize(&self, _text: &str, _lang: &str) -> Result<Vec<u8>> {
        Ok(FAKE_MP3.to_vec())
    }
}

pub struct BrokenEngine;

#[async_trait]
impl SpeechEngine for BrokenEngine {
    async fn synthesize(&self, _text: &str, _lang: &str) -> Result<Vec<u8>> {
        Err(Error::Tts("engine offline".to_string()))
    }
}

/// Upstream that answers with the number of messages it received.
async fn completions(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer test-key") {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
    }
    let count = body["messages"].as_array().map(|m| m.len()).unwrap_or(0);
    let last = body["messages"][count.saturating_sub(1)]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    (
        StatusCode::OK,
        Json(json!({
            "choices": [{"message": {"role": "assistant", "content": format!("  echo {count}: {last}  ")}}]
        })),
    )
}

async fn failing() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub async fn mock_upstream() -> String {
    let addr = serve(Router::new().route("/v1/chat/completions", post(completions))).await;
    format!("http://{addr}/v1/chat/completions")
}

pub async fn failing_upstream() -> String {
    let addr = serve(Router::new().route("/v1/chat/completions", post(failing))).await;
    format!("http://{addr}/v1/chat/completions")
}

/// An address nothing listens on.
pub fn unreachable_upstream() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/v1/chat/completions")
}

pub fn relay(endpoint: &str) -> ChatRelay {
    ChatRelay::new(endpoint, "test-key", "openai/gpt-4o-mini").unwrap()
}

pub fn app_state(endpoint: &str, audio_dir: &std::path::Path) -> Arc<AppState> {
    app_state_with_engine(endpoint, audio_dir, Arc::new(FakeEngine))
}

pub fn app_state_with_engine(
    endpoint: &str,
    audio_dir: &std::path::Path,
    engine: Arc<dyn SpeechEngine>,
) -> Arc<AppState> {
    let synthesizer = Synthesizer::new(engine, AudioStore::new(audio_dir), "en");
    Arc::new(AppState::new(relay(endpoint), synthesizer))
}
