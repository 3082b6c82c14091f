use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_config::BackendConfig;
use crate::captions::{CaptionTrack, RawCaptionItem};
use crate::errors::ProviderError;
use crate::providers::CaptionProvider;
use crate::video_id::VideoReference;

/// Client for a managed caption backend exposing `POST /video-captions`
#[derive(Debug, Clone)]
pub struct ManagedBackendProvider {
    /// Base URL of the backend, without trailing slash
    base_url: String,
    /// HTTP client for making requests
    client: Client,
}

/// Captions request body
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CaptionsRequest {
    /// Video URL
    pub url: String,
    /// Preferred languages, most preferred first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
}

/// Captions response body, every field optional so shape errors can be reported precisely
#[derive(Debug, Deserialize)]
struct CaptionsResponse {
    title: Option<String>,
    subtitles: Option<Vec<BackendSubtitle>>,
}

#[derive(Debug, Deserialize)]
struct BackendSubtitle {
    text: String,
    start: f64,
    duration: f64,
}

impl ManagedBackendProvider {
    /// Create a new backend client for the given base URL
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            base_url,
            client: Client::builder()
                .timeout(timeout)
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Create a backend client from configuration
    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(config.base_url.clone(), Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn captions_url(&self) -> String {
        format!("{}/video-captions", self.base_url)
    }
}

/// Map a non-success status and its body to a provider error
pub(crate) fn status_error(status: StatusCode, body: &str) -> ProviderError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| match value.get("detail") {
            Some(serde_json::Value::String(detail)) => Some(detail.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        })
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                body.trim().to_string()
            }
        });

    ProviderError::ApiError {
        status_code: status.as_u16(),
        message,
    }
}

/// Parse and validate a successful captions response body
pub(crate) fn parse_captions_body(body: &str) -> Result<CaptionTrack, ProviderError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ProviderError::ParseError(format!("Response is not valid JSON: {}", e)))?;

    let response: CaptionsResponse = serde_json::from_value(value)
        .map_err(|e| ProviderError::ValidationError(format!("Unexpected captions payload: {}", e)))?;

    let title = response
        .title
        .ok_or_else(|| ProviderError::ValidationError("Response is missing `title`".to_string()))?;
    let subtitles = response
        .subtitles
        .ok_or_else(|| ProviderError::ValidationError("Response is missing `subtitles`".to_string()))?;

    if title.trim().is_empty() && !subtitles.is_empty() {
        return Err(ProviderError::ValidationError(
            "Response has subtitles but an empty `title`".to_string(),
        ));
    }

    let items = subtitles
        .into_iter()
        .map(|s| RawCaptionItem::new(s.text, s.start, s.duration))
        .collect();

    Ok(CaptionTrack { title, items })
}

#[async_trait]
impl CaptionProvider for ManagedBackendProvider {
    fn name(&self) -> &str {
        "managed backend"
    }

    async fn fetch_captions(
        &self,
        video: &VideoReference,
        language: &str,
    ) -> Result<CaptionTrack, ProviderError> {
        let url = self.captions_url();
        let request = CaptionsRequest {
            url: video.watch_url(),
            languages: Some(vec![language.to_string()]),
        };

        debug!("Requesting captions for {} from {}", video, url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to send request to {}: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            let err = status_error(status, &body);
            error!("Caption backend error ({}): {}", status, err.reason());
            return Err(err);
        }

        parse_captions_body(&body)
    }
}
