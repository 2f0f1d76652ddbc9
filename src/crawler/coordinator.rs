//! Batch orchestration
//!
//! This module drives a whole run:
//! - Validating seeds
//! - Detecting listing pages and expanding them into event URLs
//! - Processing events one after another
//! - Collecting per-event results and failures into a report

use crate::config::Config;
use crate::crawler::{EventProcessor, Fetcher, ProfileResolver, RawPage, RunOptions};
use crate::extract::{LinkExtractor, PageRole};
use crate::records::EventHarvest;
use crate::state::ProfileCache;
use crate::url::is_listing_url;
use crate::HarvestError;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Outcome of a run over one or more seeds
#[derive(Debug, Clone)]
pub struct HarvestReport {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the last event finished
    pub finished_at: DateTime<Utc>,

    /// Successfully processed events, in processing order
    pub events: Vec<EventHarvest>,

    /// URLs of events (or listing seeds) whose page could not be fetched
    pub failed_events: Vec<String>,
}

impl HarvestReport {
    fn start() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            events: Vec::new(),
            failed_events: Vec::new(),
        }
    }

    /// Total participant rows across all events
    pub fn total_participants(&self) -> usize {
        self.events.iter().map(|e| e.participants.len()).sum()
    }

    /// Participant rows that carry an external URL
    pub fn participants_with_external_url(&self) -> usize {
        self.events
            .iter()
            .flat_map(|e| &e.participants)
            .filter(|row| row.has_external_url())
            .count()
    }
}

/// What a seed turned out to be
enum SeedPlan {
    /// A listing page and the event URLs found on it
    Listing(Vec<String>),

    /// A single event whose page has already been fetched
    Event(RawPage),

    /// The seed page could not be fetched
    Unreachable,
}

/// Runs harvests with one shared fetcher, extractor and profile cache
pub struct Harvester {
    fetcher: Arc<Fetcher>,
    extractor: Arc<LinkExtractor>,
    processor: EventProcessor,
    cache: Arc<ProfileCache>,
    listing_markers: Vec<String>,
}

impl Harvester {
    /// Creates a harvester with a fresh profile cache
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to run
    /// * `Err(HarvestError)` - The site rules or HTTP client could not be built
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        Self::with_cache(config, Arc::new(ProfileCache::new()))
    }

    /// Creates a harvester that reads and fills the given profile cache
    pub fn with_cache(config: &Config, cache: Arc<ProfileCache>) -> Result<Self, HarvestError> {
        let fetcher = Arc::new(Fetcher::new(&config.http)?);
        let extractor = Arc::new(LinkExtractor::new(&config.site)?);
        let resolver = ProfileResolver::new(
            Arc::clone(&fetcher),
            Arc::clone(&extractor),
            Arc::clone(&cache),
        );
        let processor = EventProcessor::new(
            Arc::clone(&fetcher),
            Arc::clone(&extractor),
            resolver,
            config.harvest.max_concurrent_profiles,
        );

        Ok(Self {
            fetcher,
            extractor,
            processor,
            cache,
            listing_markers: config.site.listing_markers.clone(),
        })
    }

    /// The profile cache shared by every event of this harvester
    pub fn cache(&self) -> &Arc<ProfileCache> {
        &self.cache
    }

    /// Harvests a single seed URL
    pub async fn run(&self, seed: &str, options: &RunOptions) -> Result<HarvestReport, HarvestError> {
        self.run_all(&[seed.to_string()], options).await
    }

    /// Harvests several seed URLs in order
    ///
    /// Seeds are validated up front; an empty seed list or a malformed seed
    /// aborts the run before anything is fetched. After that, failures are
    /// per event: a failed event is recorded in the report and the run moves
    /// on to the next one.
    pub async fn run_all(
        &self,
        seeds: &[String],
        options: &RunOptions,
    ) -> Result<HarvestReport, HarvestError> {
        let seeds = validate_seeds(seeds)?;
        let mut report = HarvestReport::start();
        let mut seen = HashSet::new();

        tracing::info!("Starting harvest of {} seed(s)", seeds.len());

        for seed in &seeds {
            match self.plan_seed(seed).await {
                SeedPlan::Unreachable => {
                    report.failed_events.push(seed.clone());
                }
                SeedPlan::Event(page) => {
                    if seen.insert(seed.clone()) {
                        tracing::info!("Processing event: {}", seed);
                        let harvest = self.processor.process_page(seed, &page, options).await;
                        report.events.push(harvest);
                    }
                }
                SeedPlan::Listing(event_urls) => {
                    let fresh: Vec<String> = event_urls
                        .into_iter()
                        .filter(|url| seen.insert(url.clone()))
                        .collect();
                    tracing::info!("Found {} events from {}", fresh.len(), seed);

                    for (index, event_url) in fresh.iter().enumerate() {
                        tracing::info!(
                            "Processing event {}/{}: {}",
                            index + 1,
                            fresh.len(),
                            event_url
                        );
                        match self.processor.process(event_url, options).await {
                            Some(harvest) => report.events.push(harvest),
                            None => report.failed_events.push(event_url.clone()),
                        }
                    }
                }
            }
        }

        report.finished_at = Utc::now();
        tracing::info!(
            "Harvest finished: {} event(s), {} failed, {} profile fetch(es)",
            report.events.len(),
            report.failed_events.len(),
            self.cache.computations()
        );

        Ok(report)
    }

    /// Fetches a seed once and decides whether it is a listing or an event
    ///
    /// A seed is a listing if its URL carries a listing marker, or if its
    /// page has no participant links but does link to events.
    async fn plan_seed(&self, seed: &str) -> SeedPlan {
        let page = match self.fetcher.fetch(seed).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!("Failed to load seed {}: {}", seed, e);
                return SeedPlan::Unreachable;
            }
        };

        if is_listing_url(seed, &self.listing_markers) {
            tracing::info!("Processing listing page: {}", seed);
            return SeedPlan::Listing(self.listing_links(seed, &page));
        }

        let participants = self.extractor.extract_links(page.markup(), PageRole::Event);
        if participants.is_empty() {
            let events = self.listing_links(seed, &page);
            if !events.is_empty() {
                tracing::info!("Seed {} has no participants but links to events", seed);
                return SeedPlan::Listing(events);
            }
        }

        SeedPlan::Event(page)
    }

    fn listing_links(&self, seed: &str, page: &RawPage) -> Vec<String> {
        self.extractor
            .extract_links(page.markup(), PageRole::Listing)
            .into_iter()
            .filter(|link| link != seed)
            .collect()
    }
}

/// Trims seeds and rejects empty or malformed ones
fn validate_seeds(seeds: &[String]) -> Result<Vec<String>, HarvestError> {
    if seeds.is_empty() {
        return Err(HarvestError::EmptySeed);
    }

    seeds
        .iter()
        .map(|seed| {
            let seed = seed.trim();
            if seed.is_empty() {
                return Err(HarvestError::EmptySeed);
            }
            let parsed = Url::parse(seed).map_err(|e| HarvestError::InvalidSeed {
                url: seed.to_string(),
                message: e.to_string(),
            })?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(HarvestError::InvalidSeed {
                    url: seed.to_string(),
                    message: format!("unsupported scheme '{}'", parsed.scheme()),
                });
            }
            Ok(seed.to_string())
        })
        .collect()
}
