/*!
 * Error types for the ytsubs application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// The URL does not reference a video in any of the supported shapes.
///
/// Malformed URLs and well-formed URLs without an identifier are reported
/// the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid YouTube URL: {url}")]
pub struct InvalidUrl {
    /// The rejected input
    pub url: String,
}

impl InvalidUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Errors that can occur when a caption provider is asked for captions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The request never produced a response (refused, reset, timed out)
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error returned by the upstream service itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error when parsing a response body fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// The response parsed but does not have the expected shape
    #[error("Invalid response shape: {0}")]
    ValidationError(String),

    /// The in-process extraction mechanism failed
    #[error("Caption extraction failed: {0}")]
    ExtractionError(String),

    /// The video exists but exposes no caption track
    #[error("No captions available for video {0}")]
    NoCaptions(String),
}

impl ProviderError {
    /// Whether retrying the same request unchanged may succeed.
    ///
    /// Only connection failures and server-side (5xx) statuses qualify.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionError(_) => true,
            Self::ApiError { status_code, .. } => (500..600).contains(status_code),
            Self::ParseError(_)
            | Self::ValidationError(_)
            | Self::ExtractionError(_)
            | Self::NoCaptions(_) => false,
        }
    }

    /// The upstream message without the variant prefix
    pub fn reason(&self) -> &str {
        match self {
            Self::ConnectionError(reason)
            | Self::ParseError(reason)
            | Self::ValidationError(reason)
            | Self::ExtractionError(reason)
            | Self::NoCaptions(reason) => reason,
            Self::ApiError { message, .. } => message,
        }
    }
}

/// Terminal outcome of a failed retrieval
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetrievalError {
    /// The URL could not be resolved to a video
    #[error(transparent)]
    InvalidUrl(#[from] InvalidUrl),

    /// Every provider was tried; this is the last one's error
    #[error("{provider} failed: {source}")]
    ProviderFailed {
        /// Name of the provider whose error is surfaced
        provider: String,
        #[source]
        source: ProviderError,
    },

    /// The service was built without any provider
    #[error("No caption providers configured")]
    NoProviders,
}

impl RetrievalError {
    /// Human readable message for the `{ "error": ... }` response shape
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Whether the caller, not an upstream, is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidUrl(_))
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the retrieval pipeline
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
