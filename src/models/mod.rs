use std::path::{Path, PathBuf};

use uuid::Uuid;

/// A themed collection of episode slots, identified by slug.
///
/// Series are defined statically in [`crate::catalog`]; the query list is
/// the ordered fallback rotation used by the download executor.
#[derive(Debug, Clone)]
pub struct Series {
    pub slug: &'static str,
    pub display_name: &'static str,
    pub queries: &'static [&'static str],
}

impl Series {
    /// Query to try at the given rotation index. The index wraps modulo the
    /// query list, so rotation never runs out of queries.
    pub fn query_at(&self, query_index: usize) -> &'static str {
        self.queries[query_index % self.queries.len()]
    }
}

/// One numbered position within a series awaiting a video asset.
///
/// The slot maps deterministically to a local file path and to the storage
/// keys of its published assets. The upload publisher and the catalog
/// synchronizer never communicate directly; agreeing on these keys is what
/// keeps them consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeSlot {
    pub series_slug: String,
    pub episode_number: u32,
}

impl EpisodeSlot {
    pub fn new(series_slug: impl Into<String>, episode_number: u32) -> Self {
        Self {
            series_slug: series_slug.into(),
            episode_number,
        }
    }

    /// Local file name, `ep{NN}.mp4` with a two-digit 1-based number.
    pub fn file_name(&self) -> String {
        format!("ep{:02}.mp4", self.episode_number)
    }

    /// Local path under the output root: `<output_dir>/<slug>/ep<NN>.mp4`.
    pub fn local_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.series_slug).join(self.file_name())
    }

    /// Storage key of the video asset in the videos bucket.
    pub fn video_key(&self) -> String {
        format!("{}/ep{:02}.mp4", self.series_slug, self.episode_number)
    }

    /// Storage key of the thumbnail asset in the images bucket.
    pub fn thumbnail_key(&self) -> String {
        format!("episodes/{}-ep{:02}.jpg", self.series_slug, self.episode_number)
    }
}

/// What happened to one episode slot during a download run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotOutcome {
    /// The local file already existed; no network call was made.
    Skipped,
    Downloaded,
    /// Left undownloaded this run; a re-run will retry it.
    Failed(String),
}

/// Per-series result of the download executor, one tagged outcome per slot.
#[derive(Debug)]
pub struct DownloadSummary {
    pub series_slug: String,
    pub outcomes: Vec<(u32, SlotOutcome)>,
}

impl DownloadSummary {
    pub fn new(series_slug: impl Into<String>) -> Self {
        Self {
            series_slug: series_slug.into(),
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, episode_number: u32, outcome: SlotOutcome) {
        self.outcomes.push((episode_number, outcome));
    }

    pub fn downloaded(&self) -> usize {
        self.count(|o| matches!(o, SlotOutcome::Downloaded))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, SlotOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SlotOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&SlotOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Per-series result of the upload publisher.
#[derive(Debug)]
pub struct UploadSummary {
    pub series_slug: String,
    pub uploaded: usize,
    /// (file name, reason) for each upload that failed.
    pub failed: Vec<(String, String)>,
}

impl UploadSummary {
    pub fn new(series_slug: impl Into<String>) -> Self {
        Self {
            series_slug: series_slug.into(),
            uploaded: 0,
            failed: Vec::new(),
        }
    }
}

/// Whole-batch result of the catalog synchronizer.
#[derive(Debug, Default)]
pub struct SyncSummary {
    pub series_synced: usize,
    /// Slugs that had no catalog record (or could not be looked up).
    pub series_skipped: Vec<String>,
    pub records_updated: usize,
    /// (episode id, reason) for each record update that failed.
    pub failed: Vec<(Uuid, String)>,
}

/// MIME type for an asset file, by extension. Unknown extensions fall back
/// to a generic binary type.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_file_name_zero_padded() {
        assert_eq!(EpisodeSlot::new("tech-life", 1).file_name(), "ep01.mp4");
        assert_eq!(EpisodeSlot::new("tech-life", 15).file_name(), "ep15.mp4");
    }

    #[test]
    fn test_storage_keys() {
        let slot = EpisodeSlot::new("tech-life", 7);
        assert_eq!(slot.video_key(), "tech-life/ep07.mp4");
        assert_eq!(slot.thumbnail_key(), "episodes/tech-life-ep07.jpg");
    }

    #[test]
    fn test_video_key_matches_local_file_name() {
        // The published key must be the slug plus the exact local file name,
        // otherwise the synchronizer would point at objects that were never
        // uploaded.
        let slot = EpisodeSlot::new("urban-dreams", 3);
        assert_eq!(
            slot.video_key(),
            format!("{}/{}", slot.series_slug, slot.file_name())
        );
    }

    #[test]
    fn test_local_path_layout() {
        let slot = EpisodeSlot::new("love-and-coffee", 2);
        let path = slot.local_path(Path::new("demo-videos"));
        assert_eq!(path, Path::new("demo-videos/love-and-coffee/ep02.mp4"));
    }

    #[test]
    fn test_query_rotation_wraps() {
        let series = Series {
            slug: "s",
            display_name: "S",
            queries: &["q0", "q1", "q2"],
        };
        assert_eq!(series.query_at(0), "q0");
        assert_eq!(series.query_at(1), "q1");
        assert_eq!(series.query_at(2), "q2");
        assert_eq!(series.query_at(3), "q0");
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for(Path::new("ep01.mp4")), "video/mp4");
        assert_eq!(content_type_for(Path::new("clip.WEBM")), "video/webm");
        assert_eq!(content_type_for(Path::new("thumb.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("logo.svg")), "image/svg+xml");
        assert_eq!(
            content_type_for(Path::new("unknown.bin")),
            "application/octet-stream"
        );
        assert_eq!(
            content_type_for(Path::new("no_extension")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_download_summary_counts() {
        let mut summary = DownloadSummary::new("tech-life");
        summary.record(1, SlotOutcome::Skipped);
        summary.record(2, SlotOutcome::Downloaded);
        summary.record(3, SlotOutcome::Failed("no results".into()));
        summary.record(4, SlotOutcome::Downloaded);

        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.downloaded(), 2);
        assert_eq!(summary.failed(), 1);
    }
}
