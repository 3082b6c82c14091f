/*!
 * In-process caption extraction from the public video site.
 *
 * The watch page embeds the list of caption tracks in its player response.
 * Each track has a timed-text URL; requesting it with `fmt=json3` returns the
 * captions as JSON events. The title comes from the oEmbed endpoint.
 *
 * Nothing here retries: every failure is reported as non-transient and the
 * retrieval service decides what happens next.
 */

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::app_config::DirectConfig;
use crate::captions::{CaptionTrack, RawCaptionItem};
use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::CaptionProvider;
use crate::video_id::VideoReference;

/// Public site root
pub const DEFAULT_SITE_URL: &str = "https://www.youtube.com";

const CAPTION_TRACKS_KEY: &str = "\"captionTracks\":";
const RECAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";

// Desktop browser UA; the site serves a reduced page without caption data otherwise.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// oEmbed metadata of a video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub title: Option<String>,
    pub author_name: Option<String>,
    pub author_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub height: Option<u32>,
    pub width: Option<u32>,
    pub version: Option<String>,
    pub provider_name: Option<String>,
    pub provider_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Caption track advertised by the watch page
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrackInfo {
    pub base_url: String,
    pub language_code: String,
    /// `"asr"` for auto-generated tracks
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrackInfo {
    pub fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

#[derive(Debug, Deserialize)]
struct Json3Document {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Option<Vec<Json3Segment>>,
    #[serde(default)]
    a_append: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Client for the oEmbed metadata endpoint
#[derive(Debug, Clone)]
pub struct OEmbedClient {
    site_url: String,
    client: Client,
}

impl OEmbedClient {
    pub fn new(site_url: impl Into<String>, client: Client) -> Self {
        Self {
            site_url: site_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Fetch oEmbed metadata for a video
    pub async fn fetch(&self, video: &VideoReference) -> Result<VideoInfo, ProviderError> {
        let url = format!("{}/oembed", self.site_url);
        let watch_url = video.watch_url();

        let response = self
            .client
            .get(&url)
            .query(&[("format", "json"), ("url", watch_url.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::ExtractionError(format!("Failed to reach oEmbed endpoint: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::ExtractionError(format!(
                "oEmbed endpoint returned {} for video {}",
                status, video
            )));
        }

        response
            .json::<VideoInfo>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse oEmbed response: {}", e)))
    }
}

/// Caption provider talking to the video site directly
#[derive(Debug, Clone)]
pub struct DirectYouTubeProvider {
    site_url: String,
    client: Client,
    oembed: OEmbedClient,
}

impl DirectYouTubeProvider {
    /// Create a provider against the given site root
    pub fn new(site_url: impl Into<String>, timeout: Duration) -> Self {
        let site_url = site_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            oembed: OEmbedClient::new(site_url.clone(), client.clone()),
            site_url,
            client,
        }
    }

    /// Create a provider from configuration
    pub fn from_config(config: &DirectConfig) -> Self {
        Self::new(config.site_url.clone(), Duration::from_secs(config.timeout_secs))
    }

    pub fn oembed(&self) -> &OEmbedClient {
        &self.oembed
    }

    async fn get_text(&self, url: &str, what: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| ProviderError::ExtractionError(format!("Failed to fetch {}: {}", what, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::ExtractionError(format!("{} returned {}", what, status)));
        }

        response
            .text()
            .await
            .map_err(|e| ProviderError::ExtractionError(format!("Failed to read {}: {}", what, e)))
    }

    async fn fetch_title(&self, video: &VideoReference) -> String {
        match self.oembed.fetch(video).await {
            Ok(VideoInfo { title: Some(title), .. }) if !title.trim().is_empty() => title,
            Ok(_) => {
                warn!("oEmbed response for {} has no title, using the video id", video);
                video.to_string()
            }
            Err(e) => {
                warn!("Could not read title of {}: {}", video, e);
                video.to_string()
            }
        }
    }
}

/// Pull the caption track list out of a watch page
pub fn extract_caption_tracks(html: &str, video: &VideoReference) -> Result<Vec<CaptionTrackInfo>, ProviderError> {
    let Some(start) = html.find(CAPTION_TRACKS_KEY) else {
        if html.contains(RECAPTCHA_MARKER) {
            return Err(ProviderError::ExtractionError(
                "Too many requests, the site answered with a captcha".to_string(),
            ));
        }
        return Err(ProviderError::NoCaptions(video.to_string()));
    };

    let rest = &html[start + CAPTION_TRACKS_KEY.len()..];
    let tracks = serde_json::Deserializer::from_str(rest)
        .into_iter::<Vec<CaptionTrackInfo>>()
        .next()
        .ok_or_else(|| ProviderError::ParseError("Caption track list is truncated".to_string()))?
        .map_err(|e| ProviderError::ParseError(format!("Failed to parse caption track list: {}", e)))?;

    if tracks.is_empty() {
        return Err(ProviderError::NoCaptions(video.to_string()));
    }

    Ok(tracks)
}

/// Pick the track to download.
///
/// Exact language code first, then the same base language, manual tracks
/// ahead of generated ones at each step. Without a match the first track wins.
pub fn select_track<'a>(tracks: &'a [CaptionTrackInfo], language: &str) -> Option<&'a CaptionTrackInfo> {
    let wanted = language.trim();
    let wanted_base = language_utils::base_language(wanted);

    preferred(tracks, |t| t.language_code.eq_ignore_ascii_case(wanted))
        .or_else(|| {
            preferred(tracks, |t| {
                language_utils::language_codes_match(language_utils::base_language(&t.language_code), wanted_base)
            })
        })
        .or_else(|| tracks.first())
}

fn preferred<'a>(
    tracks: &'a [CaptionTrackInfo],
    matches: impl Fn(&CaptionTrackInfo) -> bool,
) -> Option<&'a CaptionTrackInfo> {
    tracks
        .iter()
        .filter(|t| matches(t))
        .min_by_key(|t| t.is_generated())
}

/// Timed-text URL of a track in the `json3` format
pub fn json3_url(base_url: &str) -> Result<String, ProviderError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ProviderError::ParseError(format!("Invalid caption track URL: {}", e)))?;

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "fmt")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut().clear().extend_pairs(pairs).append_pair("fmt", "json3");
    Ok(url.to_string())
}

/// Convert a `json3` timed-text document into raw caption items
pub fn parse_json3(body: &str) -> Result<Vec<RawCaptionItem>, ProviderError> {
    let document: Json3Document = serde_json::from_str(body)
        .map_err(|e| ProviderError::ParseError(format!("Failed to parse timed text: {}", e)))?;

    let items = document
        .events
        .into_iter()
        // Append events only carry line breaks between caption windows
        .filter(|event| event.a_append != Some(1))
        .filter_map(|event| {
            let segs = event.segs?;
            let text: String = segs.into_iter().map(|s| s.utf8).collect();
            Some(RawCaptionItem::new(
                text,
                event.t_start_ms as f64 / 1000.0,
                event.d_duration_ms as f64 / 1000.0,
            ))
        })
        .collect();

    Ok(items)
}

#[async_trait]
impl CaptionProvider for DirectYouTubeProvider {
    fn name(&self) -> &str {
        "direct"
    }

    async fn fetch_captions(
        &self,
        video: &VideoReference,
        language: &str,
    ) -> Result<CaptionTrack, ProviderError> {
        let watch_url = format!("{}/watch?v={}", self.site_url, video);
        let html = self.get_text(&watch_url, "watch page").await?;

        let tracks = extract_caption_tracks(&html, video)?;
        debug!(
            "Video {} has caption tracks: {}",
            video,
            tracks.iter().map(|t| t.language_code.as_str()).collect::<Vec<_>>().join(", ")
        );

        let track = select_track(&tracks, language).ok_or_else(|| ProviderError::NoCaptions(video.to_string()))?;
        if !track.language_code.eq_ignore_ascii_case(language) {
            warn!(
                "No '{}' captions for {}, using '{}' instead",
                language, video, track.language_code
            );
        }

        let body = self.get_text(&json3_url(&track.base_url)?, "timed text").await?;
        let items = parse_json3(&body)?;
        let title = self.fetch_title(video).await;

        Ok(CaptionTrack { title, items })
    }
}
