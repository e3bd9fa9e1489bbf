//! Reels publisher for the Instagram Graph API.
//!
//! Publishing is a three-step exchange: create a media container from a public
//! video URL, poll the container until remote encoding finishes, then publish it.

pub mod client;
pub mod error;
pub mod poll;
pub mod types;

pub use client::GraphClient;
pub use error::PublishError;
pub use types::PublishReceipt;
