use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod catalog;
mod config;
mod error;
mod models;
mod pipeline;
mod services;

use config::AppConfig;
use error::SeedError;
use models::Series;
use services::pexels::PexelsClient;
use services::storage::StorageClient;

/// Seeds a demo media catalog: downloads one stock clip per episode slot,
/// publishes the files to object storage, and points the catalog's episode
/// records at the public URLs.
#[derive(Parser)]
#[command(name = "catalog-seeder", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download one clip per episode slot for every series
    Download {
        /// Only process this series slug
        #[arg(long)]
        series: Option<String>,
    },
    /// Upload downloaded episodes to the videos bucket
    Upload {
        /// Only process this series slug
        #[arg(long)]
        series: Option<String>,
    },
    /// Rewrite catalog episode URLs to match the published storage layout
    Sync,
    /// Download, upload and sync in one run
    Run,
}

/// How a stage (or the whole run) ended. Partial failure is an accepted,
/// resumable outcome: a re-run retries only what is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStatus {
    Complete,
    PartialFailure,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_seeder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::load();
    config.log_config();

    match run(cli.command, &config).await {
        Ok(RunStatus::Complete) => ExitCode::SUCCESS,
        Ok(RunStatus::PartialFailure) => {
            tracing::warn!("Run finished with failures; re-run to retry the missing items");
            ExitCode::from(2)
        }
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(command: Command, config: &AppConfig) -> Result<RunStatus> {
    match command {
        Command::Download { series } => download_stage(config, series.as_deref()).await,
        Command::Upload { series } => upload_stage(config, series.as_deref()).await,
        Command::Sync => sync_stage(config).await,
        Command::Run => {
            let mut clean = download_stage(config, None).await? == RunStatus::Complete;
            clean &= upload_stage(config, None).await? == RunStatus::Complete;
            clean &= sync_stage(config).await? == RunStatus::Complete;

            Ok(if clean {
                RunStatus::Complete
            } else {
                RunStatus::PartialFailure
            })
        }
    }
}

fn selected_series(only: Option<&str>) -> Result<Vec<&'static Series>, SeedError> {
    match only {
        Some(slug) => Ok(vec![catalog::find_series(slug)?]),
        None => Ok(catalog::SERIES.iter().collect()),
    }
}

async fn download_stage(config: &AppConfig, only: Option<&str>) -> Result<RunStatus> {
    let api_key = config.require_pexels_api_key()?;
    let series_list = selected_series(only)?;

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;

    let pexels = PexelsClient::new(api_key.to_string(), &config.download);

    let started = Instant::now();
    let mut downloaded = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for (i, series) in series_list.iter().enumerate() {
        let summary = pipeline::download::download_series(
            &pexels,
            series,
            &config.output_dir,
            &config.download,
        )
        .await?;

        downloaded += summary.downloaded();
        skipped += summary.skipped();
        failed += summary.failed();

        if i + 1 < series_list.len() {
            tracing::info!(
                "Waiting {}s before next series...",
                config.download.series_delay_secs
            );
            tokio::time::sleep(Duration::from_secs(config.download.series_delay_secs)).await;
        }
    }

    tracing::info!(
        "Download complete: {} downloaded, {} skipped, {} failed ({:.1} min)",
        downloaded,
        skipped,
        failed,
        started.elapsed().as_secs_f64() / 60.0
    );

    Ok(if failed == 0 {
        RunStatus::Complete
    } else {
        RunStatus::PartialFailure
    })
}

async fn upload_stage(config: &AppConfig, only: Option<&str>) -> Result<RunStatus> {
    let (url, key) = config.require_storage()?;
    let series_list = selected_series(only)?;

    let storage = StorageClient::new(url, key);

    let mut uploaded = 0usize;
    let mut failed = 0usize;

    for series in &series_list {
        let summary = pipeline::upload::upload_series(
            &storage,
            &config.videos_bucket,
            series.slug,
            &config.output_dir,
        )
        .await?;

        tracing::info!(
            "Series '{}': {} uploaded, {} failed",
            summary.series_slug,
            summary.uploaded,
            summary.failed.len()
        );

        uploaded += summary.uploaded;
        failed += summary.failed.len();
    }

    tracing::info!("Upload complete: {} uploaded, {} failed", uploaded, failed);

    Ok(if failed == 0 {
        RunStatus::Complete
    } else {
        RunStatus::PartialFailure
    })
}

async fn sync_stage(config: &AppConfig) -> Result<RunStatus> {
    let (url, key) = config.require_storage()?;
    let database_url = config.require_database_url()?;

    let storage = StorageClient::new(url, key);

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
        .map_err(SeedError::CatalogConnect)?;

    let summary = pipeline::sync::sync_catalog(
        &pool,
        &storage,
        &config.videos_bucket,
        &config.images_bucket,
    )
    .await;

    tracing::info!(
        "Catalog sync complete: {} series synced, {} skipped, {} records updated, {} failed",
        summary.series_synced,
        summary.series_skipped.len(),
        summary.records_updated,
        summary.failed.len()
    );

    Ok(
        if summary.failed.is_empty() && summary.series_skipped.is_empty() {
            RunStatus::Complete
        } else {
            RunStatus::PartialFailure
        },
    )
}
