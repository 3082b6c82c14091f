/*!
 * # ytsubs - YouTube subtitle retrieval
 *
 * A Rust library that turns a video URL into timestamped captions.
 *
 * ## Features
 *
 * - Resolve every common video URL shape to a video identifier
 * - Retrieve captions through an ordered list of providers:
 *   - a managed caption backend over HTTP, retried on transient failures
 *   - in-process extraction from the video site as fallback
 * - Normalize captions into `{ text, timestamp, start, duration }` segments
 * - Export captions as SRT
 * - Serve all of the above over HTTP
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `video_id`: URL to video identifier resolution
 * - `providers`: Caption provider implementations:
 *   - `providers::backend`: managed backend client
 *   - `providers::youtube`: direct extraction and oEmbed metadata
 *   - `providers::mock`: scripted provider for tests
 * - `retrieval`: retry and failover across providers
 * - `captions`: caption data model and normalization
 * - `srt`: SRT serialization and file export
 * - `server`: HTTP service
 * - `app_config`: Configuration management
 * - `app_controller`: Command line workflows
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod captions;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod srt;
pub mod video_id;

// Re-exports for convenience
pub use app_config::Config;
pub use app_controller::Controller;
pub use captions::{CaptionSegment, RetrievalResult};
pub use errors::{AppError, InvalidUrl, ProviderError, RetrievalError};
pub use retrieval::{RetrievalService, RetryPolicy};
pub use srt::serialize;
pub use video_id::{VideoReference, resolve};
