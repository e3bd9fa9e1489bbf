//! HTTP client for the Instagram Graph API media endpoints.

use std::time::Duration;

use reelpost_core::{AppConfig, ContainerStatus, PollPolicy, DEFAULT_USER_AGENT};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::PublishError;
use crate::poll::poll_until_finished;
use crate::types::{IdResponse, PublishReceipt, StatusResponse};

/// Client for container creation, status checks, and publishing on behalf
/// of one Instagram account.
pub struct GraphClient {
    client: Client,
    base_url: Url,
    ig_user_id: String,
    access_token: String,
}

impl GraphClient {
    /// Builds a client from the process configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`PublishError::InvalidBaseUrl`] if `graph_base_url` does not parse.
    pub fn from_config(config: &AppConfig) -> Result<Self, PublishError> {
        Self::build(
            &config.ig_user_id,
            &config.access_token,
            &config.graph_base_url,
            config.http_timeout_secs,
            &config.user_agent,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`GraphClient::from_config`].
    pub fn with_base_url(
        ig_user_id: &str,
        access_token: &str,
        base_url: &str,
        timeout_secs: u64,
    ) -> Result<Self, PublishError> {
        Self::build(
            ig_user_id,
            access_token,
            base_url,
            timeout_secs,
            DEFAULT_USER_AGENT,
        )
    }

    fn build(
        ig_user_id: &str,
        access_token: &str,
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, PublishError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let invalid = |reason: String| PublishError::InvalidBaseUrl {
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
            ig_user_id: ig_user_id.to_owned(),
            access_token: access_token.to_owned(),
        })
    }

    /// Submits a Reels container for `video_url` and returns its id.
    ///
    /// Returns `Ok(None)` when the response carries no id; a Graph `error`
    /// object in that response is logged rather than raised.
    ///
    /// # Errors
    ///
    /// - [`PublishError::Http`] on network failure.
    /// - [`PublishError::Deserialize`] if the body is not JSON.
    pub async fn create_container(
        &self,
        video_url: &str,
        caption: &str,
    ) -> Result<Option<String>, PublishError> {
        let url = self.graph_url(&[self.ig_user_id.as_str(), "media"]);
        let form = [
            ("media_type", "REELS"),
            ("video_url", video_url),
            ("caption", caption),
            ("access_token", self.access_token.as_str()),
        ];
        let response = self.client.post(url).form(&form).send().await?;
        let parsed: IdResponse = Self::read_json(response, "create_container").await?;

        if let Some(err) = &parsed.error {
            tracing::warn!(error = err.describe().as_str(), "container creation rejected");
        }
        match &parsed.id {
            Some(id) => tracing::info!(container_id = id.as_str(), "created media container"),
            None => tracing::warn!("container creation response carried no id"),
        }
        Ok(parsed.id)
    }

    /// Reads the container's current `status_code`; `None` if the field is absent.
    ///
    /// # Errors
    ///
    /// - [`PublishError::Api`] if the response carries a Graph `error` object.
    /// - [`PublishError::Http`] on network failure.
    /// - [`PublishError::Deserialize`] if the body is not JSON.
    pub async fn fetch_status(
        &self,
        container_id: &str,
    ) -> Result<Option<ContainerStatus>, PublishError> {
        let mut url = self.graph_url(&[container_id]);
        url.query_pairs_mut()
            .append_pair("fields", "status_code")
            .append_pair("access_token", &self.access_token);
        let response = self.client.get(url).send().await?;
        let parsed: StatusResponse = Self::read_json(response, "fetch_status").await?;

        if let Some(err) = parsed.error {
            return Err(PublishError::Api(err.describe()));
        }
        Ok(parsed.status_code)
    }

    /// Polls the container under `policy` until it reports `FINISHED`.
    ///
    /// Returns the number of status checks made.
    ///
    /// # Errors
    ///
    /// See [`poll_until_finished`]; errors from [`GraphClient::fetch_status`]
    /// propagate unchanged.
    pub async fn wait_until_finished(
        &self,
        container_id: &str,
        policy: &PollPolicy,
    ) -> Result<u32, PublishError> {
        poll_until_finished(container_id, policy, || self.fetch_status(container_id)).await
    }

    /// Triggers publication of a finished container.
    ///
    /// The outcome is returned for reporting only; a Graph `error` object in
    /// the response does not fail the call.
    ///
    /// # Errors
    ///
    /// - [`PublishError::Http`] on network failure.
    /// - [`PublishError::Deserialize`] if the body is not JSON.
    pub async fn publish(&self, container_id: &str) -> Result<PublishReceipt, PublishError> {
        let url = self.graph_url(&[self.ig_user_id.as_str(), "media_publish"]);
        let form = [
            ("creation_id", container_id),
            ("access_token", self.access_token.as_str()),
        ];
        let response = self.client.post(url).form(&form).send().await?;
        let parsed: IdResponse = Self::read_json(response, "publish").await?;

        let receipt = PublishReceipt {
            media_id: parsed.id,
            error: parsed.error.map(|e| e.describe()),
        };
        tracing::info!(
            container_id,
            media_id = receipt.media_id.as_deref().unwrap_or("-"),
            error = receipt.error.as_deref().unwrap_or("-"),
            "publish response"
        );
        Ok(receipt)
    }

    /// Reads the body as JSON regardless of HTTP status, since the Graph API
    /// reports failures as JSON `error` objects.
    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
        context: &str,
    ) -> Result<T, PublishError> {
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(
            context,
            status = status.as_u16(),
            body = body.as_str(),
            "graph response"
        );
        serde_json::from_str(&body).map_err(|e| PublishError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    fn graph_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
