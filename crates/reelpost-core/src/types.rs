use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A trending video found by the search step.
///
/// `url` points at the source platform's CDN and is time-limited, so it must be
/// staged within the same run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoCandidate {
    pub title: String,
    pub description: String,
    pub hashtags: String,
    pub url: String,
}

impl VideoCandidate {
    /// Caption posted alongside the reel.
    #[must_use]
    pub fn caption(&self) -> String {
        build_caption(&self.description, &self.hashtags)
    }
}

/// Joins a description and its hashtag line with a blank line between them.
#[must_use]
pub fn build_caption(description: &str, hashtags: &str) -> String {
    format!("{description}\n\n{hashtags}")
}

/// A video re-hosted in object storage under a public URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedAsset {
    pub file_name: String,
    pub public_url: String,
}

/// Processing state of a remote media container as reported by `status_code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContainerStatus {
    InProgress,
    Finished,
    Error,
    Expired,
    Published,
    #[serde(other)]
    Unknown,
}

/// Bounds for the container status poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between consecutive status checks.
    pub interval: Duration,
    /// Maximum number of status checks, including the first.
    pub max_attempts: u32,
    /// Wall-clock ceiling for the whole loop.
    pub timeout: Duration,
}
