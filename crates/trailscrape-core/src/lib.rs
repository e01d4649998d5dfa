//! Shared configuration and domain types for the trailscrape workspace.

pub mod app_config;
pub mod config;
pub mod region;

use thiserror::Error;

pub use app_config::{AppConfig, Credentials};
pub use config::{load_app_config, load_app_config_from_env};
pub use region::{RegionInfo, RegionSlug};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid region slug \"{slug}\": {reason}")]
    InvalidRegionSlug { slug: String, reason: String },
}
