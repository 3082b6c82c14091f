/*!
 * Integration tests for the HTTP service routes
 */

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

use ytsubs::errors::ProviderError;
use ytsubs::providers::CaptionProvider;
use ytsubs::providers::mock::MockProvider;
use ytsubs::providers::youtube::OEmbedClient;
use ytsubs::retrieval::{RetrievalService, RetryPolicy};
use ytsubs::server::{AppState, create_router};

use crate::common;

fn state_with(captions: MockProvider, pipeline: Vec<MockProvider>) -> Arc<AppState> {
    let providers: Vec<Arc<dyn CaptionProvider>> = pipeline
        .into_iter()
        .map(|p| Arc::new(p) as Arc<dyn CaptionProvider>)
        .collect();
    let retrieval = RetrievalService::new(providers, RetryPolicy::new(1, Duration::from_millis(1)), "en");
    let oembed = OEmbedClient::new(common::unreachable_url(), reqwest::Client::new());

    Arc::new(AppState::new(Arc::new(captions), oembed, retrieval))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_raw(uri: &str, content_type: Option<&str>, body: &'static str) -> Request<Body> {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(Body::from(body)).unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_subtitles_success_shouldReturnTitleAndSegments() {
    common::init_logging();
    let app = create_router(state_with(MockProvider::working("direct"), vec![MockProvider::working("backend")]));

    let response = app
        .oneshot(post_json("/api/subtitles", json!({ "url": "https://youtu.be/abc123" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "title": "Sample video",
            "subtitles": [
                { "text": "Hello there", "timestamp": "0:00", "start": 0, "duration": 2.0 },
                { "text": "General Kenobi", "timestamp": "1:05", "start": 65, "duration": 2.0 }
            ]
        })
    );
}

#[tokio::test]
async fn test_subtitles_allProvidersFail_shouldReturnBadGateway() {
    let pipeline = vec![
        MockProvider::failing("backend", MockProvider::permanent_error()),
        MockProvider::failing("direct", ProviderError::NoCaptions("abc123".to_string())),
    ];
    let app = create_router(state_with(MockProvider::working("direct"), pipeline));

    let response = app
        .oneshot(post_json("/api/subtitles", json!({ "url": "https://youtu.be/abc123" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "direct failed: No captions available for video abc123" })
    );
}

#[tokio::test]
async fn test_subtitlesSrt_shouldReturnAttachment() {
    let app = create_router(state_with(MockProvider::working("direct"), vec![MockProvider::working("backend")]));

    let response = app
        .oneshot(post_json("/api/subtitles/srt", json!({ "url": "https://youtu.be/abc123" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"Sample video.srt\""
    );
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/x-subrip")
    );

    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.starts_with("1\n00:00:00,000 --> 00:00:02,000\nHello there\n\n2\n00:01:05,000"));
}

#[tokio::test]
async fn test_videoCaptions_shouldUseRequestedLanguage() {
    let captions = MockProvider::working("direct");
    let app = create_router(state_with(captions.clone(), vec![MockProvider::working("backend")]));

    let response = app
        .oneshot(post_json(
            "/video-captions",
            json!({ "url": "https://www.youtube.com/watch?v=abc123", "languages": ["de", "en"] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["title"], "Sample video");
    assert_eq!(captions.languages(), vec!["de".to_string()]);
}

#[tokio::test]
async fn test_videoCaptions_invalidUrl_shouldReturnDetail() {
    let app = create_router(state_with(MockProvider::working("direct"), vec![MockProvider::working("backend")]));

    let response = app
        .oneshot(post_json("/video-captions", json!({ "url": "https://example.com/nothing" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({ "detail": "Invalid YouTube URL" }));
}

#[tokio::test]
async fn test_subtitles_malformedBody_shouldReturnErrorJson() {
    let backend = MockProvider::working("backend");
    let app = create_router(state_with(MockProvider::working("direct"), vec![backend.clone()]));

    let response = app
        .oneshot(post_raw("/api/subtitles", Some("application/json"), "not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(body_json(response).await, json!({ "error": "Invalid request body" }));
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn test_subtitlesSrt_missingContentType_shouldReturnErrorJson() {
    let app = create_router(state_with(MockProvider::working("direct"), vec![MockProvider::working("backend")]));

    let response = app
        .oneshot(post_raw("/api/subtitles/srt", None, r#"{"url":"https://youtu.be/abc123"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({ "error": "Invalid request body" }));
}

#[tokio::test]
async fn test_videoCaptions_malformedBody_shouldReturnDetail() {
    let app = create_router(state_with(MockProvider::working("direct"), vec![MockProvider::working("backend")]));

    let response = app
        .oneshot(post_raw("/video-captions", Some("application/json"), "{\"url\": "))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({ "detail": "Invalid request body" }));
}

#[tokio::test]
async fn test_videoCaptions_upstreamFailure_shouldReturnServerError() {
    let captions = MockProvider::failing("direct", ProviderError::ExtractionError("captcha".to_string()));
    let app = create_router(state_with(captions, vec![MockProvider::working("backend")]));

    let response = app
        .oneshot(post_json("/video-captions", json!({ "url": "https://youtu.be/abc123" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body_json(response).await["detail"].as_str().unwrap().to_string();
    assert!(detail.starts_with("Error getting captions for video"));
    assert!(detail.contains("captcha"));
}

#[tokio::test]
async fn test_videoData_unreachableOembed_shouldReturnServerError() {
    let app = create_router(state_with(MockProvider::working("direct"), vec![MockProvider::working("backend")]));

    let response = app
        .oneshot(post_json("/video-data", json!({ "url": "https://youtu.be/abc123" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body_json(response).await["detail"]
            .as_str()
            .unwrap()
            .starts_with("Error getting video data")
    );
}

#[tokio::test]
async fn test_managedBackend_againstServedBackend_shouldRoundTrip() {
    use ytsubs::providers::backend::ManagedBackendProvider;
    use ytsubs::video_id::VideoReference;

    let app = create_router(state_with(MockProvider::working("direct"), vec![MockProvider::working("backend")]));
    let base_url = common::spawn_stub(app).await;
    let provider = ManagedBackendProvider::new(base_url, Duration::from_secs(5));

    let track = provider
        .fetch_captions(&VideoReference::parse_id("abc123").unwrap(), "en")
        .await
        .unwrap();

    assert_eq!(track.title, "Sample video");
    assert_eq!(track.items.len(), 2);
    assert_eq!(track.items[1].start, 65.0);
}
