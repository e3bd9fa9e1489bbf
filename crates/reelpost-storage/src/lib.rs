//! Staging store: re-hosts a source video in a Supabase Storage bucket.

pub mod client;
pub mod error;

pub use client::StorageClient;
pub use error::StorageError;
