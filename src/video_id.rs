use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::errors::InvalidUrl;

// @module: Video identifier resolution

// @const: Upstream identifier alphabet
static VIDEO_ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

const SHORT_HOST: &str = "youtu.be";
const STANDARD_HOSTS: [&str; 3] = ["youtube.com", "www.youtube.com", "m.youtube.com"];

/// A validated video identifier
///
/// Only [`resolve`] and [`VideoReference::parse_id`] construct one, so holding
/// a value means the identifier matched the upstream syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoReference(String);

impl VideoReference {
    /// Validate a bare identifier
    pub fn parse_id(id: &str) -> Result<Self, InvalidUrl> {
        if VIDEO_ID_REGEX.is_match(id) {
            Ok(Self(id.to_string()))
        } else {
            Err(InvalidUrl::new(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch page URL for this video
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for VideoReference {
    type Error = InvalidUrl;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_id(&value)
    }
}

impl From<VideoReference> for String {
    fn from(value: VideoReference) -> Self {
        value.0
    }
}

/// Extract the video identifier from a URL.
///
/// Supported shapes:
/// - `https://youtu.be/<id>`
/// - `https://www.youtube.com/watch?v=<id>`
/// - `https://www.youtube.com/embed/<id>`
/// - `https://www.youtube.com/v/<id>`
pub fn resolve(url: &str) -> Result<VideoReference, InvalidUrl> {
    let invalid = || InvalidUrl::new(url);

    let parsed = Url::parse(url.trim()).map_err(|_| invalid())?;
    let host = parsed.host_str().ok_or_else(invalid)?.to_ascii_lowercase();
    let path = parsed.path();

    let candidate = if host == SHORT_HOST {
        path.strip_prefix('/').map(str::to_string)
    } else if STANDARD_HOSTS.contains(&host.as_str()) {
        if path == "/watch" {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())
        } else if let Some(rest) = path
            .strip_prefix("/embed/")
            .or_else(|| path.strip_prefix("/v/"))
        {
            rest.split('/').next().map(str::to_string)
        } else {
            None
        }
    } else {
        None
    };

    let id = candidate.ok_or_else(invalid)?;
    VideoReference::parse_id(&id).map_err(|_| invalid())
}
