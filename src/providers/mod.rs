/*!
 * Caption provider implementations.
 *
 * This module contains the adapters the retrieval service can try:
 * - `backend`: a managed caption backend reached over HTTP
 * - `youtube`: in-process extraction straight from the video site
 * - `mock`: scripted provider for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::captions::CaptionTrack;
use crate::errors::ProviderError;
use crate::video_id::VideoReference;

/// Common trait for all caption providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the retrieval service.
#[async_trait]
pub trait CaptionProvider: Send + Sync + Debug {
    /// Short name used in logs and error messages
    fn name(&self) -> &str;

    /// Fetch the captions of a video
    ///
    /// # Arguments
    /// * `video` - The video to fetch captions for
    /// * `language` - Preferred caption language code
    ///
    /// # Returns
    /// * `Result<CaptionTrack, ProviderError>` - Title and raw items, or an error
    ///   whose `is_transient()` tells the caller whether a retry may help
    async fn fetch_captions(
        &self,
        video: &VideoReference,
        language: &str,
    ) -> Result<CaptionTrack, ProviderError>;
}

pub mod backend;
pub mod mock;
pub mod youtube;
