use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::models::{content_type_for, EpisodeSlot, UploadSummary};
use crate::services::storage::StorageClient;

static RE_EPISODE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ep(\d{2})\.mp4$").unwrap());

/// Episode files in a series directory, sorted by episode number.
/// Names that don't match the `epNN.mp4` layout are ignored.
pub async fn list_episode_files(series_dir: &Path) -> Result<Vec<(u32, PathBuf)>> {
    let mut entries = tokio::fs::read_dir(series_dir)
        .await
        .with_context(|| format!("Failed to read {}", series_dir.display()))?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };

        if let Some(caps) = RE_EPISODE_FILE.captures(name) {
            if let Ok(episode_number) = caps[1].parse::<u32>() {
                files.push((episode_number, entry.path()));
            }
        }
    }

    files.sort_by_key(|(episode_number, _)| *episode_number);
    Ok(files)
}

/// Publish every downloaded episode of a series to the videos bucket.
///
/// The storage key is the series slug plus the local file name, which is
/// exactly the key the catalog synchronizer recomputes later - the two
/// stages never talk to each other, they just agree on the convention.
/// A single failed upload is recorded and the rest of the batch continues.
pub async fn upload_series(
    storage: &StorageClient,
    bucket: &str,
    series_slug: &str,
    output_dir: &Path,
) -> Result<UploadSummary> {
    let series_dir = output_dir.join(series_slug);
    let mut summary = UploadSummary::new(series_slug);

    if !tokio::fs::try_exists(&series_dir).await.unwrap_or(false) {
        tracing::warn!(
            "No local directory for '{}' at {}, nothing to upload",
            series_slug,
            series_dir.display()
        );
        return Ok(summary);
    }

    let files = list_episode_files(&series_dir).await?;
    tracing::info!("Series '{}': {} local episodes", series_slug, files.len());

    for (episode_number, path) in files {
        let slot = EpisodeSlot::new(series_slug, episode_number);
        let key = slot.video_key();

        match upload_one(storage, bucket, &key, &path).await {
            Ok(url) => {
                tracing::info!("Uploaded {} -> {}", key, url);
                summary.uploaded += 1;
            }
            Err(e) => {
                tracing::warn!("Failed to upload {}: {:#}", key, e);
                summary.failed.push((slot.file_name(), format!("{e:#}")));
            }
        }
    }

    Ok(summary)
}

async fn upload_one(
    storage: &StorageClient,
    bucket: &str,
    key: &str,
    path: &Path,
) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    storage
        .upload(bucket, key, bytes, content_type_for(path))
        .await?;

    Ok(storage.public_url(bucket, key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_episode_files_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "ep03.mp4",
            "ep01.mp4",
            "ep1.mp4",     // not two digits
            "ep02.webm",   // wrong extension
            "ep04.mp4.part", // unfinished download
            "notes.txt",
        ] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let files = list_episode_files(dir.path()).await.unwrap();
        let numbers: Vec<u32> = files.iter().map(|(n, _)| *n).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_list_episode_files_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let files = list_episode_files(dir.path()).await.unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_upload_key_matches_sync_convention() {
        // The key derived from a listed file must be byte-identical to the
        // key the synchronizer computes for the same slot.
        let slot = EpisodeSlot::new("urban-dreams", 3);
        assert_eq!(
            format!("{}/{}", slot.series_slug, slot.file_name()),
            slot.video_key()
        );
    }
}
