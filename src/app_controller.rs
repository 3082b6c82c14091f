use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_config::Config;
use crate::captions::RetrievalResult;
use crate::errors::AppError;
use crate::providers::youtube::{DirectYouTubeProvider, VideoInfo};
use crate::retrieval::RetrievalService;
use crate::srt;
use crate::video_id;

// @module: Application controller for the command line workflows

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Retrieval pipeline built from the configuration
    service: RetrievalService,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        config
            .validate()
            .map_err(|e| AppError::Config(format!("{:#}", e)))?;
        let service = RetrievalService::from_config(&config);

        Ok(Self { config, service })
    }

    /// Create a controller around an existing retrieval service
    pub fn with_service(config: Config, service: RetrievalService) -> Self {
        Self { config, service }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Retrieve the captions of `url`
    pub async fn fetch(&self, url: &str) -> Result<RetrievalResult, AppError> {
        let spinner = Self::spinner(format!("Fetching captions for {}", url));
        let result = self.service.retrieve(url).await;
        spinner.finish_and_clear();

        let result = result?;
        if result.is_empty() {
            warn!("No captions found for {}", url);
        }
        Ok(result)
    }

    /// Retrieve the captions of `url` and write them as SRT into `output_dir`.
    ///
    /// Returns `None` when the file already exists and `force_overwrite` is off.
    pub async fn export(&self, url: &str, output_dir: &Path, force_overwrite: bool) -> Result<Option<PathBuf>, AppError> {
        let result = self.fetch(url).await?;
        let output_path = output_dir.join(srt::export_filename(&result.title));

        if output_path.exists() && !force_overwrite {
            warn!("Output file already exists: {:?}. Use -f to force overwrite.", output_path);
            return Ok(None);
        }

        srt::write_srt_file(&result, &output_path).map_err(|e| AppError::File(format!("{:#}", e)))?;
        info!("Wrote {} subtitles to {:?}", result.segments.len(), output_path);

        Ok(Some(output_path))
    }

    /// oEmbed metadata of `url`
    pub async fn video_info(&self, url: &str) -> Result<VideoInfo, AppError> {
        let video = video_id::resolve(url).map_err(crate::errors::RetrievalError::from)?;
        let provider = DirectYouTubeProvider::from_config(&self.config.direct);

        Ok(provider.oembed().fetch(&video).await?)
    }

    fn spinner(message: String) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}
