//! Wire types for the `search.php` response.
//!
//! The upstream schema is undocumented, so every field is optional and decoded
//! on its own. A field with an unexpected type becomes `None` and a list entry
//! that does not fit is dropped, without discarding its neighbours or parent.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Top-level envelope. Only `timeline` is read.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub timeline: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TimelineItem {
    #[serde(default, deserialize_with = "lenient")]
    pub screen_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub media: Option<Media>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Media {
    #[serde(default, deserialize_with = "lenient_list")]
    pub video: Option<Vec<VideoMedia>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoMedia {
    #[serde(default, deserialize_with = "lenient_list")]
    pub variants: Option<Vec<Variant>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Variant {
    #[serde(default, deserialize_with = "lenient")]
    pub content_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_bitrate")]
    pub bitrate: Option<u64>,
}

impl SearchResponse {
    /// Decodes each timeline entry independently, dropping the ones that are
    /// not JSON objects.
    pub fn into_items(self) -> Vec<TimelineItem> {
        self.timeline
            .unwrap_or_default()
            .into_iter()
            .filter_map(|v| match serde_json::from_value::<TimelineItem>(v) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping malformed timeline entry");
                    None
                }
            })
            .collect()
    }
}

/// Any value that does not decode as `T` becomes `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Decodes list elements one by one; a non-array becomes `None`.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(entries) => Ok(Some(
            entries
                .into_iter()
                .filter_map(|v| serde_json::from_value(v).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

/// Accepts integer, float, or numeric-string bitrates; floats truncate.
fn lenient_bitrate<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let bitrate = match &value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let truncated = f as u64;
                    truncated
                })
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(bitrate)
}
