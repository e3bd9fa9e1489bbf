use std::time::Duration;

use crate::types::PollPolicy;

#[derive(Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_key: String,
    pub bucket: String,
    pub ig_user_id: String,
    pub access_token: String,
    pub rapidapi_key: String,
    pub rapidapi_host: String,
    pub search_base_url: String,
    pub graph_base_url: String,
    pub query: String,
    pub file_name: String,
    pub extra_hashtags: String,
    pub log_level: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub poll_interval_secs: u64,
    pub poll_max_attempts: u32,
    pub poll_timeout_secs: u64,
}

impl AppConfig {
    /// Container status polling policy derived from the `REELPOST_POLL_*` settings.
    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_attempts: self.poll_max_attempts,
            timeout: Duration::from_secs(self.poll_timeout_secs),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("supabase_url", &self.supabase_url)
            .field("supabase_key", &"[redacted]")
            .field("bucket", &self.bucket)
            .field("ig_user_id", &self.ig_user_id)
            .field("access_token", &"[redacted]")
            .field("rapidapi_key", &"[redacted]")
            .field("rapidapi_host", &self.rapidapi_host)
            .field("search_base_url", &self.search_base_url)
            .field("graph_base_url", &self.graph_base_url)
            .field("query", &self.query)
            .field("file_name", &self.file_name)
            .field("extra_hashtags", &self.extra_hashtags)
            .field("log_level", &self.log_level)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("poll_max_attempts", &self.poll_max_attempts)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}
