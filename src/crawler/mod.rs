//! Crawler module for page fetching and harvest orchestration
//!
//! This module contains the network-facing pipeline, including:
//! - HTTP fetching with retry and a politeness delay
//! - Profile resolution through the run-scoped cache
//! - Per-event processing with a bounded profile worker pool
//! - Batch orchestration over seeds and listing pages

mod coordinator;
mod event;
mod fetcher;
mod pool;
mod resolver;

pub use coordinator::{HarvestReport, Harvester};
pub use event::EventProcessor;
pub use fetcher::{build_http_client, Fetcher, RawPage};
pub use pool::resolve_all;
pub use resolver::ProfileResolver;

use crate::config::{Config, HarvestConfig};
use crate::HarvestError;

/// Per-run harvest options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Keep only the first N participant links of each event
    pub max_participants_per_event: Option<usize>,

    /// Keep the event description in the output
    pub include_description: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_participants_per_event: None,
            include_description: true,
        }
    }
}

impl From<&HarvestConfig> for RunOptions {
    fn from(config: &HarvestConfig) -> Self {
        Self {
            max_participants_per_event: config.max_participants_per_event,
            include_description: config.include_description,
        }
    }
}

/// Runs a complete harvest over the given seeds
///
/// This is the main entry point for library callers. It will:
/// 1. Build the fetcher, extractor and a fresh profile cache
/// 2. Expand listing seeds into event URLs
/// 3. Process every event, resolving profiles concurrently
/// 4. Return the collected events and failures
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `seeds` - Event or listing URLs
///
/// # Returns
///
/// * `Ok(HarvestReport)` - Harvest completed; individual events may have failed
/// * `Err(HarvestError)` - Fatal misconfiguration
///
/// # Example
///
/// ```no_run
/// use luma_harvest::config::load_config;
/// use luma_harvest::crawler::harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("luma-harvest.toml"))?;
/// let report = harvest(&config, &["https://lu.ma/discover".to_string()]).await?;
/// println!("{} events", report.events.len());
/// # Ok(())
/// # }
/// ```
pub async fn harvest(config: &Config, seeds: &[String]) -> Result<HarvestReport, HarvestError> {
    let harvester = Harvester::new(config)?;
    let options = RunOptions::from(&config.harvest);
    harvester.run_all(seeds, &options).await
}
