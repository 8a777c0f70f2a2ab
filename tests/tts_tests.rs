mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use quark_relay::error::Error;
use quark_relay::services::synthesizer::{GoogleTts, SpeechEngine, split_text};

type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

async fn translate_tts(State(seen): State<Seen>, Query(params): Query<HashMap<String, String>>) -> Vec<u8> {
    let idx = params.get("idx").cloned().unwrap_or_default();
    seen.lock().unwrap().push(params);
    format!("<frame {idx}>").into_bytes()
}

async fn google_mock() -> (String, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/translate_tts", get(translate_tts))
        .with_state(seen.clone());
    let addr = common::serve(app).await;
    (format!("http://{addr}/translate_tts"), seen)
}

#[tokio::test]
async fn test_long_text_fetched_in_ordered_chunks() {
    let (url, seen) = google_mock().await;
    let engine = GoogleTts::with_url(url, Duration::from_secs(5)).unwrap();

    let text = "Rust is a systems programming language. It runs blazingly fast, prevents segfaults, \
                and guarantees thread safety. Quark likes it a lot!";
    let expected = split_text(text, 100);
    assert!(expected.len() > 1);

    let audio = engine.synthesize(text, "en").await.unwrap();
    let frames: String = (0..expected.len()).map(|i| format!("<frame {i}>")).collect();
    assert_eq!(audio, frames.into_bytes());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), expected.len());
    for (i, params) in seen.iter().enumerate() {
        assert_eq!(params["q"], expected[i]);
        assert_eq!(params["tl"], "en");
        assert_eq!(params["client"], "tw-ob");
        assert_eq!(params["ie"], "UTF-8");
        assert_eq!(params["idx"], i.to_string());
        assert_eq!(params["total"], expected.len().to_string());
        assert_eq!(params["textlen"], expected[i].chars().count().to_string());
    }
}

#[tokio::test]
async fn test_language_tag_is_forwarded() {
    let (url, seen) = google_mock().await;
    let engine = GoogleTts::with_url(url, Duration::from_secs(5)).unwrap();

    engine.synthesize("Bonjour tout le monde", "fr").await.unwrap();
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["tl"], "fr");
    assert_eq!(seen[0]["q"], "Bonjour tout le monde");
}

#[tokio::test]
async fn test_error_status_is_tts_error() {
    let app = Router::new().route(
        "/translate_tts",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "quota exceeded") }),
    );
    let addr = common::serve(app).await;
    let engine = GoogleTts::with_url(format!("http://{addr}/translate_tts"), Duration::from_secs(5)).unwrap();

    match engine.synthesize("hello", "en").await {
        Err(Error::Tts(msg)) => {
            assert!(msg.contains("500"), "{msg}");
            assert!(msg.contains("quota exceeded"), "{msg}");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_blank_text_makes_no_request() {
    let (url, seen) = google_mock().await;
    let engine = GoogleTts::with_url(url, Duration::from_secs(5)).unwrap();

    assert!(matches!(engine.synthesize("  \n ", "en").await, Err(Error::Tts(_))));
    assert!(seen.lock().unwrap().is_empty());
}
