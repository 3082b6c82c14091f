/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with a fixed caption track
 * - `MockProvider::failing()` - Always fails with the given error
 * - `MockProvider::scripted()` - Plays back a queue of outcomes, one per call
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::captions::{CaptionTrack, RawCaptionItem};
use crate::errors::ProviderError;
use crate::providers::CaptionProvider;
use crate::video_id::VideoReference;

/// Behavior mode for the mock provider
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Always succeeds with the given track
    Working(CaptionTrack),
    /// Always fails with the given error
    Failing(ProviderError),
    /// Pops one outcome per call; once empty, every call succeeds with the fallback track
    Scripted {
        outcomes: Arc<Mutex<VecDeque<Result<CaptionTrack, ProviderError>>>>,
        fallback: CaptionTrack,
    },
}

/// Mock provider for testing retrieval behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Provider name reported to the retrieval service
    name: String,
    /// Behavior mode
    behavior: MockBehavior,
    /// Calls received, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Language hints received, shared between clones
    languages: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(name: impl Into<String>, behavior: MockBehavior) -> Self {
        Self {
            name: name.into(),
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            languages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider that always succeeds with [`MockProvider::sample_track`]
    pub fn working(name: impl Into<String>) -> Self {
        Self::new(name, MockBehavior::Working(Self::sample_track()))
    }

    /// Create a working mock provider returning the given track
    pub fn returning(name: impl Into<String>, track: CaptionTrack) -> Self {
        Self::new(name, MockBehavior::Working(track))
    }

    /// Create a failing mock provider that always errors
    pub fn failing(name: impl Into<String>, error: ProviderError) -> Self {
        Self::new(name, MockBehavior::Failing(error))
    }

    /// Create a mock that plays back `outcomes`, then succeeds with the sample track
    pub fn scripted(
        name: impl Into<String>,
        outcomes: impl IntoIterator<Item = Result<CaptionTrack, ProviderError>>,
    ) -> Self {
        Self::new(
            name,
            MockBehavior::Scripted {
                outcomes: Arc::new(Mutex::new(outcomes.into_iter().collect())),
                fallback: Self::sample_track(),
            },
        )
    }

    /// A server-side failure
    pub fn transient_error() -> ProviderError {
        ProviderError::ApiError {
            status_code: 503,
            message: "Simulated overload".to_string(),
        }
    }

    /// A client-side failure
    pub fn permanent_error() -> ProviderError {
        ProviderError::ApiError {
            status_code: 404,
            message: "Simulated missing video".to_string(),
        }
    }

    /// Track returned by working mocks
    pub fn sample_track() -> CaptionTrack {
        CaptionTrack {
            title: "Sample video".to_string(),
            items: vec![
                RawCaptionItem::new("Hello there", 0.5, 2.0),
                RawCaptionItem::new("General Kenobi", 65.7, 2.0),
            ],
        }
    }

    /// Number of calls received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Language hints received so far, in call order
    pub fn languages(&self) -> Vec<String> {
        self.languages.lock().clone()
    }
}

#[async_trait]
impl CaptionProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_captions(
        &self,
        _video: &VideoReference,
        language: &str,
    ) -> Result<CaptionTrack, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.languages.lock().push(language.to_string());

        match &self.behavior {
            MockBehavior::Working(track) => Ok(track.clone()),
            MockBehavior::Failing(error) => Err(error.clone()),
            MockBehavior::Scripted { outcomes, fallback } => {
                let next = outcomes.lock().pop_front();
                next.unwrap_or_else(|| Ok(fallback.clone()))
            }
        }
    }
}
