use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

use crate::config::DownloadConfig;
use crate::models::{DownloadSummary, EpisodeSlot, Series, SlotOutcome};
use crate::services::pexels::{select_variant, PexelsClient};

/// Drive every episode slot of one series through search, selection and
/// download, returning a tagged outcome per slot.
///
/// A slot whose file already exists is skipped without touching the network
/// or the query rotation - presence of the file is the only idempotence
/// signal, so re-running a partially complete batch only retries the holes.
pub async fn download_series(
    pexels: &PexelsClient,
    series: &Series,
    output_dir: &Path,
    config: &DownloadConfig,
) -> Result<DownloadSummary> {
    let series_dir = output_dir.join(series.slug);
    tokio::fs::create_dir_all(&series_dir)
        .await
        .with_context(|| format!("Failed to create {}", series_dir.display()))?;

    tracing::info!(
        "Series '{}' ({}): {} slots",
        series.display_name,
        series.slug,
        config.episodes_per_series
    );

    let mut summary = DownloadSummary::new(series.slug);
    let mut query_index: usize = 0;

    for episode_number in 1..=config.episodes_per_series {
        let slot = EpisodeSlot::new(series.slug, episode_number);
        let path = slot.local_path(output_dir);

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!("Episode {:02}: already downloaded, skipping", episode_number);
            summary.record(episode_number, SlotOutcome::Skipped);
            continue;
        }

        let query = series.query_at(query_index);
        query_index += 1;

        tracing::info!("Episode {:02}: searching '{}'", episode_number, query);

        match attempt_slot(pexels, query, &path, config).await {
            Ok(()) => {
                tracing::info!("Episode {:02}: downloaded", episode_number);
                summary.record(episode_number, SlotOutcome::Downloaded);
            }
            Err(reason) => {
                tracing::warn!("Episode {:02}: {}", episode_number, reason);
                summary.record(episode_number, SlotOutcome::Failed(reason));
            }
        }

        // Provider rate limit: fixed pause after every slot that hit the
        // network, whether or not the attempt succeeded.
        tokio::time::sleep(Duration::from_secs(config.request_delay_secs)).await;
    }

    tracing::info!(
        "Series '{}' done: {} downloaded, {} skipped, {} failed",
        summary.series_slug,
        summary.downloaded(),
        summary.skipped(),
        summary.failed()
    );

    Ok(summary)
}

/// One search-and-download attempt for a slot. Only the first candidate
/// returned by the search is considered; a miss rotates to the next query
/// at the caller.
async fn attempt_slot(
    pexels: &PexelsClient,
    query: &str,
    path: &Path,
    config: &DownloadConfig,
) -> std::result::Result<(), String> {
    let videos = pexels.search(query, config.per_page).await;

    let Some(video) = videos.first() else {
        return Err(format!("no results for '{query}'"));
    };

    tracing::debug!("Top candidate: video {}", video.id);

    let Some(url) = select_variant(&video.video_files) else {
        return Err(format!("no playable variant for '{query}'"));
    };

    match pexels.download_to(url, path).await {
        Ok(bytes) => {
            tracing::debug!(
                "Wrote {} ({:.1} MB)",
                path.display(),
                bytes as f64 / 1024.0 / 1024.0
            );
            Ok(())
        }
        Err(e) => Err(format!("download failed: {e:#}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rerun_skips_existing_files_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let series = Series {
            slug: "tech-life",
            display_name: "Tech Life",
            queries: &["office work"],
        };
        let config = DownloadConfig {
            episodes_per_series: 4,
            request_delay_secs: 0,
            ..Default::default()
        };

        let series_dir = dir.path().join(series.slug);
        std::fs::create_dir_all(&series_dir).unwrap();
        for episode in 1..=4u32 {
            std::fs::write(series_dir.join(format!("ep{episode:02}.mp4")), b"video").unwrap();
        }

        // The key is nonsense: every slot must take the skip path before
        // the client could ever be asked to search.
        let pexels = PexelsClient::new("placeholder".to_string(), &config);

        let summary = download_series(&pexels, &series, dir.path(), &config)
            .await
            .unwrap();

        assert_eq!(summary.skipped(), 4);
        assert_eq!(summary.downloaded(), 0);
        assert_eq!(summary.failed(), 0);
        assert!(summary
            .outcomes
            .iter()
            .all(|(_, outcome)| *outcome == SlotOutcome::Skipped));
    }

    #[tokio::test]
    async fn test_outcomes_are_recorded_in_slot_order() {
        let dir = tempfile::tempdir().unwrap();
        let series = Series {
            slug: "urban-dreams",
            display_name: "Urban Dreams",
            queries: &["city life"],
        };
        let config = DownloadConfig {
            episodes_per_series: 3,
            request_delay_secs: 0,
            ..Default::default()
        };

        let series_dir = dir.path().join(series.slug);
        std::fs::create_dir_all(&series_dir).unwrap();
        for episode in 1..=3u32 {
            std::fs::write(series_dir.join(format!("ep{episode:02}.mp4")), b"video").unwrap();
        }

        let pexels = PexelsClient::new("placeholder".to_string(), &config);
        let summary = download_series(&pexels, &series, dir.path(), &config)
            .await
            .unwrap();

        let episodes: Vec<u32> = summary.outcomes.iter().map(|(n, _)| *n).collect();
        assert_eq!(episodes, vec![1, 2, 3]);
    }
}
