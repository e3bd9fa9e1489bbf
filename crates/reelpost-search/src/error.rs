use thiserror::Error;

/// Errors returned by the search client.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network, TLS, or non-2xx status from the search endpoint.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not a JSON object we could read.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
