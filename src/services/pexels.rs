// Pexels video search provider
// API Documentation: https://www.pexels.com/api/documentation/

use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::config::DownloadConfig;

const PEXELS_API_BASE: &str = "https://api.pexels.com";

/// Pexels API client
pub struct PexelsClient {
    client: Client,
    api_key: String,
    search_timeout: Duration,
    download_timeout: Duration,
}

/// Search response envelope
#[derive(Debug, Deserialize)]
pub struct VideoSearchResults {
    #[serde(default)]
    pub videos: Vec<VideoResult>,
}

/// One candidate video, with the encodings the provider offers for it
#[derive(Debug, Clone, Deserialize)]
pub struct VideoResult {
    pub id: i64,
    #[serde(default)]
    pub video_files: Vec<VideoFile>,
}

/// One encoded rendition (resolution/quality) of a candidate video
#[derive(Debug, Clone, Deserialize)]
pub struct VideoFile {
    /// "hd", "sd", or absent
    pub quality: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub link: String,
}

impl VideoFile {
    fn is_hd(&self) -> bool {
        self.quality.as_deref() == Some("hd")
    }

    fn is_portrait(&self) -> bool {
        self.height.unwrap_or(0) > self.width.unwrap_or(0)
    }
}

/// Pick the best variant URL from a candidate's encodings.
///
/// Preference order, first match wins:
/// 1. HD portrait
/// 2. any portrait
/// 3. the first variant, regardless of orientation
pub fn select_variant(video_files: &[VideoFile]) -> Option<&str> {
    if let Some(file) = video_files.iter().find(|f| f.is_hd() && f.is_portrait()) {
        return Some(&file.link);
    }

    if let Some(file) = video_files.iter().find(|f| f.is_portrait()) {
        return Some(&file.link);
    }

    video_files.first().map(|f| f.link.as_str())
}

impl PexelsClient {
    pub fn new(api_key: String, config: &DownloadConfig) -> Self {
        Self {
            client: Client::new(),
            api_key,
            search_timeout: Duration::from_secs(config.search_timeout_secs),
            download_timeout: Duration::from_secs(config.download_timeout_secs),
        }
    }

    /// Search for short portrait videos matching `query`.
    ///
    /// Any transport, timeout or non-2xx failure is logged and yields an
    /// empty candidate list - retrying with a different query is the
    /// caller's job, not this method's.
    pub async fn search(&self, query: &str, per_page: u32) -> Vec<VideoResult> {
        let url = format!(
            "{}/videos/search?query={}&orientation=portrait&size=medium&per_page={}",
            PEXELS_API_BASE,
            urlencoding::encode(query),
            per_page
        );

        let response = match self
            .client
            .get(&url)
            .header("Authorization", &self.api_key)
            .timeout(self.search_timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Pexels search for '{}' failed: {}", query, e);
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                "Pexels search for '{}' returned status {}",
                query,
                response.status()
            );
            return Vec::new();
        }

        match response.json::<VideoSearchResults>().await {
            Ok(results) => results.videos,
            Err(e) => {
                tracing::warn!("Failed to parse Pexels response for '{}': {}", query, e);
                Vec::new()
            }
        }
    }

    /// Stream a video to `path`, returning the number of bytes written.
    ///
    /// The body is written to a sibling `.part` file and renamed into place
    /// only after the whole stream has been consumed, so an interrupted
    /// download never leaves a file the idempotence check would mistake for
    /// a finished episode.
    pub async fn download_to(&self, url: &str, path: &Path) -> Result<u64> {
        let tmp_path = path.with_extension("mp4.part");

        match self.stream_to_file(url, &tmp_path).await {
            Ok(written) => {
                tokio::fs::rename(&tmp_path, path)
                    .await
                    .with_context(|| format!("Failed to move {} into place", tmp_path.display()))?;
                Ok(written)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&tmp_path).await;
                Err(e)
            }
        }
    }

    async fn stream_to_file(&self, url: &str, tmp_path: &Path) -> Result<u64> {
        let response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await
            .context("Failed to request video")?
            .error_for_status()
            .context("Video download returned an error status")?;

        let mut file = tokio::fs::File::create(tmp_path)
            .await
            .with_context(|| format!("Failed to create {}", tmp_path.display()))?;

        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Transport error while streaming video")?;
            file.write_all(&chunk)
                .await
                .context("Failed to write video chunk")?;
            written += chunk.len() as u64;
        }

        file.flush().await.context("Failed to flush video file")?;
        Ok(written)
    }
}
