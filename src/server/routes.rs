//! Axum router configuration

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use super::handlers::{
    AppState, health_check, subtitles, subtitles_srt, video_captions, video_data, video_timestamps,
};

/// Create the Axum router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    // Any origin, method and header: the service is called from browser front ends
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/", get(health_check))
        // Backend endpoints
        .route("/video-data", post(video_data))
        .route("/video-captions", post(video_captions))
        .route("/video-timestamps", post(video_timestamps))
        // Public endpoints
        .route("/api/subtitles", post(subtitles))
        .route("/api/subtitles/srt", post(subtitles_srt))
        .layer(cors)
        .with_state(state)
}
