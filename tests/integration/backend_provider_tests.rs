/*!
 * Integration tests for the managed backend client against a local stub
 */

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ytsubs::errors::ProviderError;
use ytsubs::providers::CaptionProvider;
use ytsubs::providers::backend::{CaptionsRequest, ManagedBackendProvider};
use ytsubs::video_id::VideoReference;

use crate::common;

#[derive(Clone)]
struct StubBackend {
    status: StatusCode,
    body: String,
    hits: Arc<AtomicUsize>,
    last_request: Arc<parking_lot::Mutex<Option<Value>>>,
}

async fn stub_captions(State(stub): State<StubBackend>, Json(request): Json<Value>) -> (StatusCode, String) {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    *stub.last_request.lock() = Some(request);
    (stub.status, stub.body.clone())
}

async fn spawn_backend(status: StatusCode, body: Value) -> (ManagedBackendProvider, StubBackend) {
    let stub = StubBackend {
        status,
        body: body.to_string(),
        hits: Arc::new(AtomicUsize::new(0)),
        last_request: Arc::new(parking_lot::Mutex::new(None)),
    };
    let router = Router::new()
        .route("/video-captions", post(stub_captions))
        .with_state(stub.clone());

    let base_url = common::spawn_stub(router).await;
    (ManagedBackendProvider::new(format!("{}/", base_url), Duration::from_secs(5)), stub)
}

fn video() -> VideoReference {
    VideoReference::parse_id("dQw4w9WgXcQ").unwrap()
}

#[tokio::test]
async fn test_fetchCaptions_success_shouldReturnTrackAndSendRequestShape() {
    common::init_logging();
    let body = json!({
        "title": "Never Gonna Give You Up",
        "subtitles": [
            { "text": "We're no strangers", "timestamp": "0:18", "start": 18, "duration": 3.5 }
        ]
    });
    let (provider, stub) = spawn_backend(StatusCode::OK, body).await;

    let track = provider.fetch_captions(&video(), "en").await.unwrap();

    assert_eq!(track.title, "Never Gonna Give You Up");
    assert_eq!(track.items.len(), 1);
    assert_eq!(track.items[0].start, 18.0);
    assert_eq!(stub.hits.load(Ordering::SeqCst), 1);

    let sent: CaptionsRequest = serde_json::from_value(stub.last_request.lock().clone().unwrap()).unwrap();
    assert_eq!(sent.url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    assert_eq!(sent.languages, Some(vec!["en".to_string()]));
}

#[tokio::test]
async fn test_fetchCaptions_serverError_shouldBeTransientWithDetail() {
    let (provider, _) = spawn_backend(StatusCode::SERVICE_UNAVAILABLE, json!({ "detail": "overloaded" })).await;

    let error = provider.fetch_captions(&video(), "en").await.unwrap_err();

    assert!(error.is_transient());
    assert_eq!(
        error,
        ProviderError::ApiError {
            status_code: 503,
            message: "overloaded".to_string(),
        }
    );
}

#[tokio::test]
async fn test_fetchCaptions_clientError_shouldNotBeTransient() {
    let (provider, _) = spawn_backend(StatusCode::NOT_FOUND, json!({ "detail": "Video not found" })).await;

    let error = provider.fetch_captions(&video(), "en").await.unwrap_err();

    assert!(!error.is_transient());
    assert_eq!(error.reason(), "Video not found");
}

#[tokio::test]
async fn test_fetchCaptions_missingSubtitles_shouldBeValidationError() {
    let (provider, _) = spawn_backend(StatusCode::OK, json!({ "title": "T" })).await;

    let error = provider.fetch_captions(&video(), "en").await.unwrap_err();

    assert!(matches!(error, ProviderError::ValidationError(_)));
    assert!(!error.is_transient());
}

#[tokio::test]
async fn test_fetchCaptions_unreachableBackend_shouldBeTransientConnectionError() {
    let provider = ManagedBackendProvider::new(common::unreachable_url(), Duration::from_secs(2));

    let error = provider.fetch_captions(&video(), "en").await.unwrap_err();

    assert!(matches!(error, ProviderError::ConnectionError(_)));
    assert!(error.is_transient());
}
