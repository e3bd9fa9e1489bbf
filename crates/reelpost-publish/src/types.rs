use reelpost_core::ContainerStatus;
use serde::Deserialize;

/// Response to `POST /{ig-user-id}/media` and `/media_publish`.
#[derive(Debug, Deserialize)]
pub(crate) struct IdResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub error: Option<GraphApiError>,
}

/// Response to `GET /{container-id}?fields=status_code`.
#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    #[serde(default)]
    pub status_code: Option<ContainerStatus>,
    #[serde(default)]
    pub error: Option<GraphApiError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphApiError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
}

impl GraphApiError {
    pub(crate) fn describe(&self) -> String {
        let message = self.message.as_deref().unwrap_or("unknown error");
        match self.code {
            Some(code) => format!("{message} (code {code})"),
            None => message.to_string(),
        }
    }
}

/// Outcome of the publish call. Reported as-is; nothing is verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    /// Id of the published media, when the API returned one.
    pub media_id: Option<String>,
    /// Graph API error message, when the API returned one.
    pub error: Option<String>,
}
