/*!
 * Caption retrieval with retry and failover.
 *
 * A [`RetrievalService`] holds an ordered list of providers. The first one is
 * the primary: transient failures are retried with exponential backoff up to
 * a fixed number of attempts. Once the primary fails for good, each remaining
 * provider is tried exactly once. Whatever succeeds first is normalized into
 * a [`RetrievalResult`].
 */

use log::{debug, info, warn};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{Config, ProviderKind, RetrievalConfig};
use crate::captions::{CaptionTrack, RetrievalResult, normalize};
use crate::errors::{ProviderError, RetrievalError};
use crate::providers::CaptionProvider;
use crate::providers::backend::ManagedBackendProvider;
use crate::providers::youtube::DirectYouTubeProvider;
use crate::video_id::{self, VideoReference};

/// Retry settings for the primary provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first try included
    pub max_attempts: u32,
    /// Wait before the first retry
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    /// Build a policy; zero values are raised to the smallest usable ones
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff: initial_backoff.max(Duration::from_millis(1)),
        }
    }

    fn start(&self) -> RetryState {
        RetryState {
            attempts_remaining: self.max_attempts,
            backoff: self.initial_backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}

impl From<&RetrievalConfig> for RetryPolicy {
    fn from(config: &RetrievalConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.retry_backoff_ms))
    }
}

/// Per-call retry bookkeeping, owned by a single `retrieve` call
#[derive(Debug)]
struct RetryState {
    attempts_remaining: u32,
    backoff: Duration,
}

impl RetryState {
    /// Consume one attempt
    fn begin_attempt(&mut self) {
        self.attempts_remaining = self.attempts_remaining.saturating_sub(1);
    }

    /// Return the wait before the next retry, or `None` when the failure ends the primary phase
    fn next_backoff(&mut self, error: &ProviderError) -> Option<Duration> {
        if !error.is_transient() || self.attempts_remaining == 0 {
            return None;
        }
        let wait = self.backoff;
        self.backoff = self.backoff.saturating_mul(2);
        Some(wait)
    }
}

/// Where a retrieval currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalState {
    Idle,
    TryingPrimary,
    RetryingPrimary { attempt: u32 },
    TryingFallback { index: usize },
    Succeeded,
    Failed,
}

impl fmt::Display for RetrievalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::TryingPrimary => write!(f, "trying primary"),
            Self::RetryingPrimary { attempt } => write!(f, "retrying primary (attempt {})", attempt),
            Self::TryingFallback { index } => write!(f, "trying fallback #{}", index),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Retrieves captions through an ordered list of providers
#[derive(Debug, Clone)]
pub struct RetrievalService {
    providers: Vec<Arc<dyn CaptionProvider>>,
    policy: RetryPolicy,
    language: String,
}

impl RetrievalService {
    /// Create a service; `providers[0]` is the primary
    pub fn new(providers: Vec<Arc<dyn CaptionProvider>>, policy: RetryPolicy, language: impl Into<String>) -> Self {
        Self {
            providers,
            policy,
            language: language.into(),
        }
    }

    /// Build the providers and policy described by the configuration
    pub fn from_config(config: &Config) -> Self {
        let providers = config
            .retrieval
            .providers
            .iter()
            .map(|kind| -> Arc<dyn CaptionProvider> {
                match kind {
                    ProviderKind::Backend => Arc::new(ManagedBackendProvider::from_config(&config.backend)),
                    ProviderKind::Direct => Arc::new(DirectYouTubeProvider::from_config(&config.direct)),
                }
            })
            .collect();

        Self::new(providers, RetryPolicy::from(&config.retrieval), config.language.clone())
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Same service with another language hint
    pub fn with_language(&self, language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..self.clone()
        }
    }

    /// Resolve `url` and retrieve its captions
    pub async fn retrieve(&self, url: &str) -> Result<RetrievalResult, RetrievalError> {
        let video = video_id::resolve(url).inspect_err(|e| warn!("{}", e))?;
        self.retrieve_reference(&video).await
    }

    /// Retrieve captions for an already resolved video
    pub async fn retrieve_reference(&self, video: &VideoReference) -> Result<RetrievalResult, RetrievalError> {
        let Some((primary, fallbacks)) = self.providers.split_first() else {
            return Err(RetrievalError::NoProviders);
        };

        let mut state = RetrievalState::Idle;
        transition(&mut state, RetrievalState::TryingPrimary, video);

        let mut last_error = match self.try_primary(primary.as_ref(), video, &mut state).await {
            Ok(track) => return Ok(self.finish(track, primary.name(), video, &mut state)),
            Err(error) => (primary.name().to_string(), error),
        };

        for (index, fallback) in fallbacks.iter().enumerate() {
            transition(&mut state, RetrievalState::TryingFallback { index: index + 1 }, video);
            info!("Falling back to {} for {}", fallback.name(), video);

            match fallback.fetch_captions(video, &self.language).await.and_then(validated) {
                Ok(track) => return Ok(self.finish(track, fallback.name(), video, &mut state)),
                Err(error) => {
                    warn!("{} failed for {}: {}", fallback.name(), video, error);
                    last_error = (fallback.name().to_string(), error);
                }
            }
        }

        transition(&mut state, RetrievalState::Failed, video);
        let (provider, source) = last_error;
        Err(RetrievalError::ProviderFailed { provider, source })
    }

    async fn try_primary(
        &self,
        primary: &dyn CaptionProvider,
        video: &VideoReference,
        state: &mut RetrievalState,
    ) -> Result<CaptionTrack, ProviderError> {
        let mut retry = self.policy.start();
        let mut attempt = 1;

        loop {
            retry.begin_attempt();

            let error = match primary.fetch_captions(video, &self.language).await.and_then(validated) {
                Ok(track) => return Ok(track),
                Err(error) => error,
            };

            match retry.next_backoff(&error) {
                Some(wait) => {
                    warn!(
                        "{} failed for {} (attempt {}/{}): {}. Retrying in {} ms",
                        primary.name(),
                        video,
                        attempt,
                        self.policy.max_attempts,
                        error,
                        wait.as_millis()
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                    transition(state, RetrievalState::RetryingPrimary { attempt }, video);
                }
                None => {
                    warn!("{} failed for {}: {}", primary.name(), video, error);
                    return Err(error);
                }
            }
        }
    }

    fn finish(
        &self,
        track: CaptionTrack,
        provider: &str,
        video: &VideoReference,
        state: &mut RetrievalState,
    ) -> RetrievalResult {
        transition(state, RetrievalState::Succeeded, video);
        info!("Retrieved {} caption items for {} from {}", track.items.len(), video, provider);
        RetrievalResult::new(track.title, normalize(track.items))
    }
}

/// Reject tracks that carry captions but no title
fn validated(track: CaptionTrack) -> Result<CaptionTrack, ProviderError> {
    if track.title.trim().is_empty() && !track.items.is_empty() {
        return Err(ProviderError::ValidationError("Captions returned without a title".to_string()));
    }
    Ok(track)
}

fn transition(state: &mut RetrievalState, next: RetrievalState, video: &VideoReference) {
    debug!("Retrieval of {}: {} -> {}", video, state, next);
    *state = next;
}
