//! Trending video locator backed by the RapidAPI Twitter search endpoint.

pub mod client;
pub mod error;
pub mod select;
pub mod types;

pub use client::SearchClient;
pub use error::SearchError;
pub use select::{best_mp4_variant, candidate_from_item, select_candidate};
