//! HTTP client for the Supabase Storage REST API.
//!
//! Objects live at `/storage/v1/object/{bucket}/{name}` and are publicly
//! readable at `/storage/v1/object/public/{bucket}/{name}`.

use std::time::Duration;

use reelpost_core::{AppConfig, StagedAsset, DEFAULT_USER_AGENT};
use reqwest::{Client, Url};
use serde::Serialize;

use crate::error::StorageError;

const VIDEO_CONTENT_TYPE: &str = "video/mp4";

#[derive(Serialize)]
struct RemoveObjectsRequest<'a> {
    prefixes: [&'a str; 1],
}

/// Upload/delete client bound to a single bucket.
pub struct StorageClient {
    client: Client,
    base_url: Url,
    api_key: String,
    bucket: String,
}

impl StorageClient {
    /// Builds a client from the process configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`StorageError::InvalidUrl`] if `supabase_url` does not parse.
    pub fn from_config(config: &AppConfig) -> Result<Self, StorageError> {
        Self::build(
            &config.supabase_key,
            &config.bucket,
            &config.supabase_url,
            config.http_timeout_secs,
            &config.user_agent,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`StorageClient::from_config`].
    pub fn with_base_url(
        api_key: &str,
        bucket: &str,
        base_url: &str,
        timeout_secs: u64,
    ) -> Result<Self, StorageError> {
        Self::build(api_key, bucket, base_url, timeout_secs, DEFAULT_USER_AGENT)
    }

    fn build(
        api_key: &str,
        bucket: &str,
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let invalid = |reason: String| StorageError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("URL cannot be used as a base".to_string()));
        }

        Ok(Self {
            client,
            base_url: parsed,
            api_key: api_key.to_owned(),
            bucket: bucket.to_owned(),
        })
    }

    /// Public URL an object named `file_name` is served from.
    #[must_use]
    pub fn public_url(&self, file_name: &str) -> String {
        self.storage_url(&["object", "public", self.bucket.as_str(), file_name])
            .to_string()
    }

    /// Downloads `source_url` and stores the bytes as `file_name`.
    ///
    /// The storage write is only attempted once the download succeeded.
    ///
    /// # Errors
    ///
    /// - [`StorageError::SourceFetch`] if the download returns a non-2xx status.
    /// - [`StorageError::UnexpectedStatus`] if the storage API rejects the upload.
    /// - [`StorageError::Http`] on network failure.
    pub async fn upload(
        &self,
        source_url: &str,
        file_name: &str,
    ) -> Result<StagedAsset, StorageError> {
        let response = self.client.get(source_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::SourceFetch {
                status: status.as_u16(),
                url: source_url.to_string(),
            });
        }
        let bytes = response.bytes().await?;
        tracing::debug!(
            source_url,
            size_bytes = bytes.len(),
            "downloaded source video"
        );

        let object_url = self.storage_url(&["object", self.bucket.as_str(), file_name]);
        let response = self
            .authorized(self.client.post(object_url))
            .header(reqwest::header::CONTENT_TYPE, VIDEO_CONTENT_TYPE)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(file_name, status = status.as_u16(), body = body.as_str(), "upload response");
        if !status.is_success() {
            return Err(StorageError::UnexpectedStatus {
                operation: "upload",
                object: file_name.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let public_url = self.public_url(file_name);
        tracing::info!(
            bucket = self.bucket.as_str(),
            public_url = public_url.as_str(),
            "uploaded video to storage"
        );
        Ok(StagedAsset {
            file_name: file_name.to_string(),
            public_url,
        })
    }

    /// Removes `file_name` from the bucket. Removing an absent object is not
    /// an error.
    ///
    /// # Errors
    ///
    /// - [`StorageError::UnexpectedStatus`] if the storage API rejects the delete.
    /// - [`StorageError::Http`] on network failure.
    pub async fn delete(&self, file_name: &str) -> Result<(), StorageError> {
        let url = self.storage_url(&["object", self.bucket.as_str()]);
        let response = self
            .authorized(self.client.delete(url))
            .json(&RemoveObjectsRequest {
                prefixes: [file_name],
            })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(file_name, status = status.as_u16(), body = body.as_str(), "delete response");
        if !status.is_success() {
            return Err(StorageError::UnexpectedStatus {
                operation: "delete",
                object: file_name.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(bucket = self.bucket.as_str(), file_name, "deleted video from storage");
        Ok(())
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(&self.api_key)
            .header("apikey", self.api_key.as_str())
    }

    /// `{base}/storage/v1/{segments..}` with each segment percent-encoded.
    fn storage_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["storage", "v1"]).extend(segments);
        }
        url
    }
}
