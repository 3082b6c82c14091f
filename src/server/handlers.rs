//! HTTP request handlers
//!
//! Two families of endpoints share one state:
//! - the backend endpoints (`/video-data`, `/video-captions`,
//!   `/video-timestamps`) answer with `{ "detail": ... }` on failure and are
//!   what `ManagedBackendProvider` talks to;
//! - the public endpoints (`/api/subtitles`, `/api/subtitles/srt`) run the full
//!   retrieval pipeline and answer with `{ "error": ... }` on failure.
//!
//! Bodies that fail to extract as JSON get a 400 in the family's own shape.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::app_config::Config;
use crate::captions::{RetrievalResult, normalize};
use crate::errors::{ProviderError, RetrievalError};
use crate::providers::CaptionProvider;
use crate::providers::youtube::{DirectYouTubeProvider, OEmbedClient, VideoInfo};
use crate::retrieval::RetrievalService;
use crate::srt;
use crate::video_id::{self, VideoReference};

/// Shared state of the HTTP service
#[derive(Debug, Clone)]
pub struct AppState {
    /// Provider answering the backend endpoints
    captions: Arc<dyn CaptionProvider>,
    /// Metadata client for `/video-data`
    oembed: OEmbedClient,
    /// Pipeline behind the public endpoints
    retrieval: RetrievalService,
}

impl AppState {
    pub fn new(captions: Arc<dyn CaptionProvider>, oembed: OEmbedClient, retrieval: RetrievalService) -> Self {
        Self {
            captions,
            oembed,
            retrieval,
        }
    }

    /// Backend endpoints on the direct provider, public endpoints on the configured pipeline
    pub fn from_config(config: &Config) -> Self {
        let direct = DirectYouTubeProvider::from_config(&config.direct);
        let oembed = direct.oembed().clone();

        Self::new(Arc::new(direct), oembed, RetrievalService::from_config(config))
    }

    /// Language used when a request names none
    pub fn default_language(&self) -> &str {
        self.retrieval.language()
    }
}

/// Body of the backend endpoints
#[derive(Debug, Default, Deserialize)]
pub struct VideoRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub languages: Option<Vec<String>>,
}

/// Body of the public endpoints
#[derive(Debug, Default, Deserialize)]
pub struct SubtitlesRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Error of the backend endpoints, rendered as `{ "detail": ... }`
#[derive(Debug)]
pub enum DetailError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl DetailError {
    /// Map a provider failure, prefixing the message with what was being done
    fn upstream(context: &str, err: ProviderError) -> Self {
        let message = format!("{}: {}", context, err);
        match err {
            ProviderError::NoCaptions(_) => DetailError::NotFound(message),
            _ => {
                error!("{}", message);
                DetailError::Internal(message)
            }
        }
    }
}

impl IntoResponse for DetailError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            DetailError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            DetailError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            DetailError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<JsonRejection> for DetailError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        DetailError::BadRequest(INVALID_BODY.to_string())
    }
}

/// Message returned for a body that is not a JSON object of the expected shape
pub const INVALID_BODY: &str = "Invalid request body";

/// Error of the public endpoints, rendered as `{ "error": ... }`
#[derive(Debug)]
pub enum ErrorResponse {
    /// The pipeline failed
    Retrieval(RetrievalError),
    /// The body could not be read as a request
    InvalidBody,
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ErrorResponse::Retrieval(err) => {
                let status = match &err {
                    RetrievalError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
                    RetrievalError::ProviderFailed { .. } => StatusCode::BAD_GATEWAY,
                    RetrievalError::NoProviders => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.message())
            }
            ErrorResponse::InvalidBody => (StatusCode::BAD_REQUEST, INVALID_BODY.to_string()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<RetrievalError> for ErrorResponse {
    fn from(err: RetrievalError) -> Self {
        Self::Retrieval(err)
    }
}

impl From<JsonRejection> for ErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        Self::InvalidBody
    }
}

fn resolve_request(url: &str) -> Result<VideoReference, DetailError> {
    if url.trim().is_empty() {
        return Err(DetailError::BadRequest("No URL provided".to_string()));
    }

    video_id::resolve(url).map_err(|e| {
        warn!("{}", e);
        DetailError::BadRequest("Invalid YouTube URL".to_string())
    })
}

fn requested_language<'a>(request: &'a VideoRequest, state: &'a AppState) -> &'a str {
    request
        .languages
        .as_deref()
        .and_then(|languages| languages.iter().find(|l| !l.trim().is_empty()))
        .map(|l| l.trim())
        .unwrap_or_else(|| state.default_language())
}

async fn fetch_result(state: &AppState, request: &VideoRequest, context: &str) -> Result<RetrievalResult, DetailError> {
    let video = resolve_request(&request.url)?;
    let language = requested_language(request, state);

    let track = state
        .captions
        .fetch_captions(&video, language)
        .await
        .map_err(|e| DetailError::upstream(context, e))?;

    Ok(RetrievalResult::new(track.title, normalize(track.items)))
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "YouTube Subtitle API is running",
    })
}

/// oEmbed metadata of a video
pub async fn video_data(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VideoRequest>, JsonRejection>,
) -> Result<Json<VideoInfo>, DetailError> {
    let Json(request) = payload?;
    let video = resolve_request(&request.url)?;

    let info = state
        .oembed
        .fetch(&video)
        .await
        .map_err(|e| DetailError::upstream("Error getting video data", e))?;

    Ok(Json(info))
}

/// Title and normalized captions of a video
pub async fn video_captions(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VideoRequest>, JsonRejection>,
) -> Result<Json<RetrievalResult>, DetailError> {
    let Json(request) = payload?;
    fetch_result(&state, &request, "Error getting captions for video").await.map(Json)
}

/// Captions as `M:SS - text` lines
pub async fn video_timestamps(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VideoRequest>, JsonRejection>,
) -> Result<Json<Vec<String>>, DetailError> {
    let Json(request) = payload?;
    let result = fetch_result(&state, &request, "Error generating timestamps").await?;
    Ok(Json(result.timestamp_lines()))
}

/// Full retrieval pipeline with retry and failover
pub async fn subtitles(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SubtitlesRequest>, JsonRejection>,
) -> Result<Json<RetrievalResult>, ErrorResponse> {
    let Json(request) = payload?;
    let result = state.retrieval.retrieve(&request.url).await?;
    Ok(Json(result))
}

/// Same as [`subtitles`], delivered as an SRT attachment
pub async fn subtitles_srt(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SubtitlesRequest>, JsonRejection>,
) -> Result<Response, ErrorResponse> {
    let Json(request) = payload?;
    let result = state.retrieval.retrieve(&request.url).await?;
    let filename = srt::export_filename(&result.title);

    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("application/x-subrip; charset=utf-8")),
        (header::CONTENT_DISPOSITION, content_disposition(&filename)),
    ];

    Ok((headers, srt::serialize(&result)).into_response())
}

/// `attachment` disposition with an ASCII name plus the UTF-8 name for clients that read it
pub(crate) fn content_disposition(filename: &str) -> HeaderValue {
    let ascii: String = filename
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '_' })
        .collect();
    let encoded = url::form_urlencoded::byte_serialize(filename.as_bytes())
        .collect::<String>()
        .replace('+', "%20");

    let value = if ascii == filename {
        format!("attachment; filename=\"{}\"", ascii)
    } else {
        format!("attachment; filename=\"{}\"; filename*=UTF-8''{}", ascii, encoded)
    };

    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"subtitles.srt\""))
}
