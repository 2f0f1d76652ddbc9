//! Luma-Harvest: event roster extraction
//!
//! This crate crawls public event pages, discovers the participant and host
//! profiles linked from each event, and resolves every profile to an external
//! social-network URL. The result is a flat set of event and participant
//! records ready for CSV or JSON export.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod records;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Luma-Harvest operations
///
/// Only fatal conditions surface here. Failed events and failed profiles are
/// recovered inside the pipeline and never reach the caller as errors.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No seed URL given")]
    EmptySeed,

    #[error("Invalid seed URL '{url}': {message}")]
    InvalidSeed { url: String, message: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// Failure of a single page fetch after all retry attempts
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url} after {attempts} attempt(s)")]
    Status {
        url: String,
        status: u16,
        attempts: u32,
    },

    #[error("Transport error for {url} after {attempts} attempt(s): {message}")]
    Transport {
        url: String,
        message: String,
        attempts: u32,
    },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Harvester, HarvestReport, RunOptions};
pub use records::{EventHarvest, EventRecord, ParticipantRow, ResolvedProfile};
pub use state::{ProfileCache, ResolutionState};
pub use url::normalize_profile_link;
