use reqwest::Url;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// User-Agent sent by every HTTP client unless overridden.
pub const DEFAULT_USER_AGENT: &str = "reelpost/0.1 (trend-republisher)";

/// Hashtags appended after the query-derived tag unless overridden.
pub const DEFAULT_EXTRA_HASHTAGS: &str = "#Telugu #Politics #AP";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so callers (and tests in other crates)
/// can feed a `HashMap` lookup instead of mutating process state.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` when a required variable is absent and
/// `ConfigError::InvalidEnvVar` when a value fails to parse.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };

    // Blank values count as unset.
    let or_default = |var: &str, default: &str| -> String {
        match lookup(var) {
            Ok(v) if !v.trim().is_empty() => v,
            _ => default.to_string(),
        }
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let supabase_url = http_url("SUPABASE_URL", &require("SUPABASE_URL")?)?;
    let supabase_key = require("SUPABASE_KEY")?;
    let ig_user_id = require("IG_USER_ID")?;
    let access_token = require("ACCESS_TOKEN")?;
    let rapidapi_key = require("RAPIDAPI_KEY")?;

    let bucket = or_default("REELPOST_BUCKET", "VIDEOS");
    let rapidapi_host = or_default("RAPIDAPI_HOST", "twitter-api45.p.rapidapi.com");
    let search_base_url = http_url(
        "REELPOST_SEARCH_BASE_URL",
        &or_default("REELPOST_SEARCH_BASE_URL", &format!("https://{rapidapi_host}")),
    )?;
    let graph_base_url = http_url(
        "REELPOST_GRAPH_BASE_URL",
        &or_default("REELPOST_GRAPH_BASE_URL", "https://graph.instagram.com/v23.0"),
    )?;

    let query = or_default("REELPOST_QUERY", "YS Jagan");
    let file_name = or_default("REELPOST_FILE_NAME", "trending.mp4");
    // An explicitly empty value disables the extra hashtags.
    let extra_hashtags =
        lookup("REELPOST_EXTRA_HASHTAGS").unwrap_or_else(|_| DEFAULT_EXTRA_HASHTAGS.to_string());
    let log_level = or_default("REELPOST_LOG_LEVEL", "info");

    let http_timeout_secs = parse_u64("REELPOST_HTTP_TIMEOUT_SECS", "120")?;
    let user_agent = or_default("REELPOST_USER_AGENT", DEFAULT_USER_AGENT);

    let poll_interval_secs = parse_u64("REELPOST_POLL_INTERVAL_SECS", "20")?;
    let poll_max_attempts = parse_u32("REELPOST_POLL_MAX_ATTEMPTS", "45")?;
    if poll_max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "REELPOST_POLL_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let poll_timeout_secs = parse_u64("REELPOST_POLL_TIMEOUT_SECS", "900")?;

    Ok(AppConfig {
        supabase_url,
        supabase_key,
        bucket,
        ig_user_id,
        access_token,
        rapidapi_key,
        rapidapi_host,
        search_base_url,
        graph_base_url,
        query,
        file_name,
        extra_hashtags,
        log_level,
        http_timeout_secs,
        user_agent,
        poll_interval_secs,
        poll_max_attempts,
        poll_timeout_secs,
    })
}

/// Accepts only absolute `http`/`https` URLs with a host and strips any
/// trailing slash.
fn http_url(var: &str, raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| invalid(format!("'{raw}' is not a URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid(format!("expected an http(s) URL, got '{raw}'")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
