// Object storage client (Supabase Storage)
// Uploads are keyed and idempotent; public URLs are deterministic and
// computed locally, no round-trip needed.

use anyhow::Result;
use reqwest::Client;
use std::time::Duration;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Storage service client
pub struct StorageClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl StorageClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Upload raw bytes under `key` in `bucket`. Re-uploading the same key
    /// overwrites the object rather than duplicating it.
    pub async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, key);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            // Overwrite on key collision instead of returning 409
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .timeout(UPLOAD_TIMEOUT)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("upload of {}/{} failed with status {}: {}", bucket, key, status, body);
        }

        Ok(())
    }

    /// Public URL for an object. Objects in a public bucket are served at a
    /// fixed path under the project URL.
    pub fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, bucket, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_shape() {
        let client = StorageClient::new("https://project.supabase.co", "key");
        assert_eq!(
            client.public_url("videos", "tech-life/ep01.mp4"),
            "https://project.supabase.co/storage/v1/object/public/videos/tech-life/ep01.mp4"
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = StorageClient::new("https://project.supabase.co/", "key");
        assert_eq!(
            client.public_url("images", "episodes/tech-life-ep01.jpg"),
            "https://project.supabase.co/storage/v1/object/public/images/episodes/tech-life-ep01.jpg"
        );
    }
}
