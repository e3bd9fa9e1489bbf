//! HTTP client for the RapidAPI-hosted Twitter search endpoint.

use std::time::Duration;

use reelpost_core::{AppConfig, VideoCandidate, DEFAULT_EXTRA_HASHTAGS, DEFAULT_USER_AGENT};
use reqwest::{Client, Url};

use crate::error::SearchError;
use crate::select::select_candidate;
use crate::types::SearchResponse;

/// Client for `GET /search.php`.
///
/// Use [`SearchClient::from_config`] in production; tests point
/// `search_base_url` at a wiremock server.
pub struct SearchClient {
    client: Client,
    base_url: Url,
    host: String,
    api_key: String,
    extra_hashtags: String,
}

impl SearchClient {
    /// Builds a client from the process configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`SearchError::InvalidBaseUrl`] if `search_base_url` does not parse.
    pub fn from_config(config: &AppConfig) -> Result<Self, SearchError> {
        Self::build(
            &config.rapidapi_key,
            &config.rapidapi_host,
            &config.search_base_url,
            config.http_timeout_secs,
            &config.user_agent,
            &config.extra_hashtags,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock),
    /// using the default User-Agent and extra hashtags.
    ///
    /// # Errors
    ///
    /// Same as [`SearchClient::from_config`].
    pub fn with_base_url(
        api_key: &str,
        host: &str,
        base_url: &str,
        timeout_secs: u64,
    ) -> Result<Self, SearchError> {
        Self::build(
            api_key,
            host,
            base_url,
            timeout_secs,
            DEFAULT_USER_AGENT,
            DEFAULT_EXTRA_HASHTAGS,
        )
    }

    fn build(
        api_key: &str,
        host: &str,
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        extra_hashtags: &str,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so the endpoint name appends to any base path.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| SearchError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: parsed,
            host: host.to_owned(),
            api_key: api_key.to_owned(),
            extra_hashtags: extra_hashtags.to_owned(),
        })
    }

    /// Finds the first trending video for `query`, swallowing failures.
    ///
    /// Any transport or decoding error is logged and reported as "not found",
    /// so a failed search ends the run cleanly instead of aborting it.
    pub async fn locate(&self, query: &str) -> Option<VideoCandidate> {
        match self.search(query).await {
            Ok(Some(candidate)) => {
                tracing::info!(
                    query,
                    title = candidate.title.as_str(),
                    url = candidate.url.as_str(),
                    "located trending video"
                );
                Some(candidate)
            }
            Ok(None) => {
                tracing::info!(query, "no timeline entry carried an MP4 video");
                None
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "trending video search failed");
                None
            }
        }
    }

    /// Runs the search and returns the first qualifying candidate.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Http`] on network failure or a non-2xx status.
    /// - [`SearchError::Deserialize`] if the body is not a JSON object.
    pub async fn search(&self, query: &str) -> Result<Option<VideoCandidate>, SearchError> {
        let url = self.search_url(query);
        let response = self
            .client
            .get(url)
            .header("x-rapidapi-host", self.host.as_str())
            .header("x-rapidapi-key", self.api_key.as_str())
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        tracing::debug!(query, body = body.as_str(), "search response");

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| SearchError::Deserialize {
                context: format!("search(query={query})"),
                source: e,
            })?;
        let items = parsed.into_items();
        tracing::debug!(query, entries = items.len(), "decoded timeline entries");

        Ok(select_candidate(&items, query, &self.extra_hashtags))
    }

    /// `{base}/search.php?query=..&search_type=Top` with the query percent-encoded.
    fn search_url(&self, query: &str) -> Url {
        let mut url = self.base_url.clone();
        let path = format!("{}search.php", url.path());
        url.set_path(&path);
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("search_type", "Top");
        url
    }
}
