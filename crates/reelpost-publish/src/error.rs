use thiserror::Error;

/// Errors returned by the Graph API client.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The Graph API answered with an `error` object.
    #[error("Graph API error: {0}")]
    Api(String),

    /// Remote encoding reported `ERROR`.
    #[error("media container {container_id} failed processing")]
    ContainerFailed { container_id: String },

    #[error("media container {container_id} not finished after {attempts} status checks")]
    PollExhausted { container_id: String, attempts: u32 },

    #[error("media container {container_id} not finished after {elapsed_secs}s")]
    PollTimedOut {
        container_id: String,
        elapsed_secs: u64,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
