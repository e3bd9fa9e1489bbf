//! Picks the first timeline entry carrying a playable MP4 and builds the
//! [`VideoCandidate`] for it.

use reelpost_core::VideoCandidate;

use crate::types::{TimelineItem, Variant};

const MP4_CONTENT_TYPE: &str = "video/mp4";

/// Returns the highest-bitrate `video/mp4` variant that has a URL.
///
/// A missing bitrate counts as 0. On equal bitrates the earlier variant wins.
#[must_use]
pub fn best_mp4_variant(variants: &[Variant]) -> Option<&Variant> {
    variants
        .iter()
        .filter(|v| v.content_type.as_deref() == Some(MP4_CONTENT_TYPE) && v.url.is_some())
        .fold(None, |best: Option<&Variant>, v| match best {
            Some(b) if b.bitrate.unwrap_or(0) >= v.bitrate.unwrap_or(0) => Some(b),
            _ => Some(v),
        })
}

/// Builds a candidate from one timeline entry, or `None` if none of its
/// attached videos has a qualifying variant.
///
/// Videos are checked in listed order; the first with any MP4 variant decides.
#[must_use]
pub fn candidate_from_item(
    item: &TimelineItem,
    query: &str,
    extra_hashtags: &str,
) -> Option<VideoCandidate> {
    let videos = item.media.as_ref()?.video.as_deref()?;
    let url = videos.iter().find_map(|video| {
        let variants = video.variants.as_deref()?;
        best_mp4_variant(variants).and_then(|v| v.url.clone())
    })?;

    let handle = item.screen_name.as_deref().unwrap_or(query);
    Some(VideoCandidate {
        title: format!("*{handle}*"),
        description: item
            .text
            .clone()
            .unwrap_or_else(|| "No description".to_string()),
        hashtags: hashtags_for(query, extra_hashtags),
        url,
    })
}

/// Scans entries in API order and returns the first usable candidate.
#[must_use]
pub fn select_candidate(
    items: &[TimelineItem],
    query: &str,
    extra_hashtags: &str,
) -> Option<VideoCandidate> {
    items
        .iter()
        .find_map(|item| candidate_from_item(item, query, extra_hashtags))
}

fn hashtags_for(query: &str, extra_hashtags: &str) -> String {
    let tag: String = query.chars().filter(|c| !c.is_whitespace()).collect();
    let extra = extra_hashtags.trim();
    if extra.is_empty() {
        format!("#{tag}")
    } else {
        format!("#{tag} {extra}")
    }
}
