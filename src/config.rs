// Configuration module for catalog-seeder
// Handles the TOML configuration file and environment variable overrides

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::SeedError;

const APP_NAME: &str = "catalog-seeder";
const CONFIG_FILENAME: &str = "config.toml";
const DEFAULT_OUTPUT_DIR: &str = "demo-videos";

/// TOML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Search provider configuration
    pub pexels: PexelsConfig,

    /// Object storage configuration
    pub storage: StorageConfig,

    /// Catalog store configuration
    pub catalog: CatalogConfig,

    /// Directory paths
    pub paths: PathsConfig,

    /// Download executor tuning
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PexelsConfig {
    /// Pexels API key (free tier: https://www.pexels.com/api/)
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base URL of the storage service, e.g. https://<project>.supabase.co
    pub url: Option<String>,

    /// Service API key used for uploads
    pub api_key: Option<String>,

    /// Bucket for video assets (default: "videos")
    pub videos_bucket: String,

    /// Bucket for image assets (default: "images")
    pub images_bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            videos_bucket: "videos".to_string(),
            images_bucket: "images".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Postgres connection string for the catalog database
    pub database_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Override the local directory downloads land in
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Episode slots per series (default: 15)
    pub episodes_per_series: u32,

    /// Candidates requested per search (default: 5)
    pub per_page: u32,

    /// Fixed pause after each slot that touched the network, in seconds
    /// (default: 2). The provider's free tier is rate limited.
    pub request_delay_secs: u64,

    /// Fixed pause between series, in seconds (default: 10)
    pub series_delay_secs: u64,

    /// Timeout for search/API calls, in seconds (default: 10)
    pub search_timeout_secs: u64,

    /// Timeout for a bulk video download, in seconds (default: 60)
    pub download_timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            episodes_per_series: 15,
            per_page: 5,
            request_delay_secs: 2,
            series_delay_secs: 10,
            search_timeout_secs: 10,
            download_timeout_secs: 60,
        }
    }
}

/// Application configuration - combines the TOML file with environment
/// overrides.
///
/// Priority (highest to lowest):
/// 1. Environment variables
/// 2. TOML config file
/// 3. Default values
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Pexels API key (required by the download stage)
    pub pexels_api_key: Option<String>,

    /// Storage service base URL (required by upload and sync stages)
    pub storage_url: Option<String>,

    /// Storage service API key (required by upload and sync stages)
    pub storage_api_key: Option<String>,

    /// Bucket for video assets
    pub videos_bucket: String,

    /// Bucket for image assets
    pub images_bucket: String,

    /// Catalog database connection string (required by the sync stage)
    pub database_url: Option<String>,

    /// Local directory downloads land in
    pub output_dir: PathBuf,

    /// Download executor tuning
    pub download: DownloadConfig,
}

impl AppConfig {
    /// Load configuration from the TOML file and environment
    pub fn load() -> Self {
        let config_dir = Self::find_config_dir();
        let config_file = Self::load_config_file(&config_dir);
        Self::build(config_file)
    }

    /// Find the config directory (for locating config.toml)
    fn find_config_dir() -> PathBuf {
        // Environment variable takes priority
        if let Ok(path) = std::env::var("SEEDER_CONFIG_DIR") {
            return PathBuf::from(path);
        }

        // Then XDG/platform config dir
        if let Some(dir) = dirs::config_dir() {
            return dir.join(APP_NAME);
        }

        // Fallback to current directory
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }

    /// Load and parse the TOML config file
    fn load_config_file(config_dir: &Path) -> ConfigFile {
        let config_path = config_dir.join(CONFIG_FILENAME);

        if !config_path.exists() {
            tracing::debug!(
                "No config file found at {}, using defaults",
                config_path.display()
            );
            return ConfigFile::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse config file {}: {}. Using defaults.",
                        config_path.display(),
                        e
                    );
                    ConfigFile::default()
                }
            },
            Err(e) => {
                tracing::warn!(
                    "Failed to read config file {}: {}. Using defaults.",
                    config_path.display(),
                    e
                );
                ConfigFile::default()
            }
        }
    }

    /// Build configuration from the config file with environment overrides
    fn build(config_file: ConfigFile) -> Self {
        let pexels_api_key = std::env::var("PEXELS_API_KEY")
            .ok()
            .or(config_file.pexels.api_key);

        let storage_url = std::env::var("SUPABASE_URL")
            .ok()
            .or(config_file.storage.url);

        let storage_api_key = std::env::var("SUPABASE_KEY")
            .ok()
            .or(config_file.storage.api_key);

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .or(config_file.catalog.database_url);

        let output_dir = std::env::var("SEEDER_OUTPUT_DIR")
            .ok()
            .map(PathBuf::from)
            .or(config_file.paths.output_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        Self {
            pexels_api_key,
            storage_url,
            storage_api_key,
            videos_bucket: config_file.storage.videos_bucket,
            images_bucket: config_file.storage.images_bucket,
            database_url,
            output_dir,
            download: config_file.download,
        }
    }

    /// API key for the search provider, or a fatal configuration error.
    pub fn require_pexels_api_key(&self) -> Result<&str, SeedError> {
        require_credential(self.pexels_api_key.as_deref(), "PEXELS_API_KEY")
    }

    /// Storage base URL and API key, or a fatal configuration error.
    pub fn require_storage(&self) -> Result<(&str, &str), SeedError> {
        let url = require_credential(self.storage_url.as_deref(), "SUPABASE_URL")?;
        let key = require_credential(self.storage_api_key.as_deref(), "SUPABASE_KEY")?;
        Ok((url, key))
    }

    /// Catalog connection string, or a fatal configuration error.
    pub fn require_database_url(&self) -> Result<&str, SeedError> {
        require_credential(self.database_url.as_deref(), "DATABASE_URL")
    }

    /// Log configuration status
    pub fn log_config(&self) {
        tracing::info!("Output directory: {}", self.output_dir.display());
        tracing::info!(
            "Storage buckets: videos='{}', images='{}'",
            self.videos_bucket,
            self.images_bucket
        );

        if self
            .pexels_api_key
            .as_deref()
            .is_some_and(|k| !is_placeholder(k))
        {
            tracing::debug!("Search provider key: configured");
        } else {
            tracing::info!(
                "Search provider key: not set (set PEXELS_API_KEY or pexels.api_key in config.toml)"
            );
        }

        match self.storage_url.as_deref().filter(|u| !is_placeholder(u)) {
            Some(url) => tracing::debug!("Storage service: {}", url),
            None => tracing::info!("Storage service: not set (set SUPABASE_URL / SUPABASE_KEY)"),
        }

        if self.database_url.is_none() {
            tracing::debug!("Catalog database: not set (set DATABASE_URL)");
        }
    }
}

/// Treats unset values, empty strings and template placeholders left in a
/// config file (e.g. "YOUR_PEXELS_API_KEY") as missing, so a forgotten key
/// aborts before the first network call instead of failing 45 requests in.
fn require_credential<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, SeedError> {
    match value {
        Some(v) if !is_placeholder(v) => Ok(v),
        _ => Err(SeedError::MissingCredential(name)),
    }
}

fn is_placeholder(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v.starts_with("YOUR_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file() {
        let config = ConfigFile::default();
        assert_eq!(config.storage.videos_bucket, "videos");
        assert_eq!(config.storage.images_bucket, "images");
        assert_eq!(config.download.episodes_per_series, 15);
        assert_eq!(config.download.per_page, 5);
        assert_eq!(config.download.request_delay_secs, 2);
        assert_eq!(config.download.series_delay_secs, 10);
        assert_eq!(config.download.search_timeout_secs, 10);
        assert_eq!(config.download.download_timeout_secs, 60);
        assert!(config.pexels.api_key.is_none());
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[pexels]
api_key = "test_key"

[storage]
url = "https://project.supabase.co"
api_key = "anon_key"
videos_bucket = "demo-videos"

[catalog]
database_url = "postgres://localhost/catalog"

[paths]
output_dir = "/tmp/videos"

[download]
episodes_per_series = 5
request_delay_secs = 0
"#;
        let config: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(config.pexels.api_key, Some("test_key".to_string()));
        assert_eq!(config.storage.videos_bucket, "demo-videos");
        assert_eq!(config.storage.images_bucket, "images"); // default
        assert_eq!(
            config.catalog.database_url,
            Some("postgres://localhost/catalog".to_string())
        );
        assert_eq!(config.paths.output_dir, Some(PathBuf::from("/tmp/videos")));
        assert_eq!(config.download.episodes_per_series, 5);
        assert_eq!(config.download.request_delay_secs, 0);
        assert_eq!(config.download.series_delay_secs, 10); // default
    }

    #[test]
    fn test_partial_config_toml() {
        // Partial configs work: only specify what you need
        let toml_str = r#"
[pexels]
api_key = "abc"
"#;
        let config: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(config.pexels.api_key, Some("abc".to_string()));
        assert_eq!(config.download.episodes_per_series, 15); // default
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(is_placeholder(""));
        assert!(is_placeholder("   "));
        assert!(is_placeholder("YOUR_PEXELS_API_KEY"));
        assert!(is_placeholder("YOUR_SUPABASE_KEY"));
        assert!(!is_placeholder("gqEis2HkN2zF"));
    }

    #[test]
    fn test_require_credential() {
        assert!(require_credential(None, "PEXELS_API_KEY").is_err());
        assert!(require_credential(Some("YOUR_PEXELS_API_KEY"), "PEXELS_API_KEY").is_err());
        assert_eq!(
            require_credential(Some("real-key"), "PEXELS_API_KEY").unwrap(),
            "real-key"
        );
    }
}
