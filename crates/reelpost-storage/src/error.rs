use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Downloading the source video returned a non-2xx status.
    #[error("failed to fetch video from {url}: HTTP {status}")]
    SourceFetch { status: u16, url: String },

    /// The storage API rejected an upload or delete.
    #[error("storage {operation} for '{object}' returned HTTP {status}: {body}")]
    UnexpectedStatus {
        operation: &'static str,
        object: String,
        status: u16,
        body: String,
    },

    #[error("invalid storage URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}
