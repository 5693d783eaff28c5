use sqlx::PgPool;
use uuid::Uuid;

use crate::catalog;
use crate::models::{EpisodeSlot, SyncSummary};
use crate::services::storage::StorageClient;

#[derive(Debug, sqlx::FromRow)]
struct EpisodeRow {
    id: Uuid,
    episode_number: i32,
}

/// Rewrite the video and thumbnail URLs of every episode record to match
/// the published storage layout.
///
/// This is a blind overwrite: prior values are not compared and there is no
/// concurrency control - the storage-key convention is the single source of
/// truth. A series with no catalog record is skipped; a failed record
/// update is logged and the remaining records still get written.
pub async fn sync_catalog(
    pool: &PgPool,
    storage: &StorageClient,
    videos_bucket: &str,
    images_bucket: &str,
) -> SyncSummary {
    let mut summary = SyncSummary::default();

    for series in catalog::SERIES {
        tracing::info!("Series: {}", series.slug);

        let series_id = match sqlx::query_as::<_, (Uuid,)>("SELECT id FROM series WHERE slug = $1")
            .bind(series.slug)
            .fetch_optional(pool)
            .await
        {
            Ok(Some((id,))) => id,
            Ok(None) => {
                tracing::warn!("Series '{}' not found in catalog, skipping", series.slug);
                summary.series_skipped.push(series.slug.to_string());
                continue;
            }
            Err(e) => {
                tracing::warn!("Failed to look up series '{}': {}", series.slug, e);
                summary.series_skipped.push(series.slug.to_string());
                continue;
            }
        };

        let episodes = match sqlx::query_as::<_, EpisodeRow>(
            "SELECT id, episode_number FROM episodes WHERE series_id = $1 ORDER BY episode_number",
        )
        .bind(series_id)
        .fetch_all(pool)
        .await
        {
            Ok(episodes) => episodes,
            Err(e) => {
                tracing::warn!("Failed to list episodes for '{}': {}", series.slug, e);
                summary.series_skipped.push(series.slug.to_string());
                continue;
            }
        };

        tracing::info!("Found {} episode records", episodes.len());

        for episode in episodes {
            let slot = EpisodeSlot::new(series.slug, episode.episode_number as u32);
            let video_url = storage.public_url(videos_bucket, &slot.video_key());
            let thumbnail_url = storage.public_url(images_bucket, &slot.thumbnail_key());

            match sqlx::query("UPDATE episodes SET video_url = $1, thumbnail_url = $2 WHERE id = $3")
                .bind(&video_url)
                .bind(&thumbnail_url)
                .bind(episode.id)
                .execute(pool)
                .await
            {
                Ok(_) => {
                    tracing::debug!("Episode {:02}: URLs updated", episode.episode_number);
                    summary.records_updated += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to update episode {}: {}", episode.id, e);
                    summary.failed.push((episode.id, e.to_string()));
                }
            }
        }

        summary.series_synced += 1;
    }

    summary
}
