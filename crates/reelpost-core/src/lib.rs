//! Shared configuration and domain types for the reelpost pipeline.

pub mod app_config;
pub mod config;
pub mod error;
pub mod types;

pub use app_config::AppConfig;
pub use config::{
    build_app_config, load_app_config, load_app_config_from_env, DEFAULT_EXTRA_HASHTAGS,
    DEFAULT_USER_AGENT,
};
pub use error::ConfigError;
pub use types::{build_caption, ContainerStatus, PollPolicy, StagedAsset, VideoCandidate};
