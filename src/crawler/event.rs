//! Single-event processing
//!
//! Fetches one event page, extracts its metadata and participant links, and
//! fans the links out to the profile worker pool. One row is produced per
//! submitted link, including links whose profile failed to resolve.

use crate::crawler::pool::resolve_all;
use crate::crawler::{Fetcher, ProfileResolver, RawPage, RunOptions};
use crate::extract::LinkExtractor;
use crate::records::{EventHarvest, EventRecord, ParticipantRow};
use std::collections::HashMap;
use std::sync::Arc;

/// Processes event pages into event records and participant rows
#[derive(Debug, Clone)]
pub struct EventProcessor {
    fetcher: Arc<Fetcher>,
    extractor: Arc<LinkExtractor>,
    resolver: ProfileResolver,
    workers: usize,
}

impl EventProcessor {
    /// Creates a processor resolving at most `workers` profiles at a time
    pub fn new(
        fetcher: Arc<Fetcher>,
        extractor: Arc<LinkExtractor>,
        resolver: ProfileResolver,
        workers: usize,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            resolver,
            workers: workers.max(1),
        }
    }

    /// Fetches and processes one event
    ///
    /// # Returns
    ///
    /// * `Some(EventHarvest)` - The event and its participant rows
    /// * `None` - The event page could not be fetched; nothing else was attempted
    pub async fn process(&self, event_url: &str, options: &RunOptions) -> Option<EventHarvest> {
        match self.fetcher.fetch(event_url).await {
            Ok(page) => Some(self.process_page(event_url, &page, options).await),
            Err(e) => {
                tracing::warn!("Failed to load event {}: {}", event_url, e);
                None
            }
        }
    }

    /// Processes an event page that was already fetched
    pub async fn process_page(
        &self,
        event_url: &str,
        page: &RawPage,
        options: &RunOptions,
    ) -> EventHarvest {
        let extracted = self.extractor.extract_event(page.markup());

        let mut event = EventRecord::new(event_url);
        event.title = extracted.title;
        event.occurs_at = extracted.occurs_at;
        if options.include_description {
            event.description = extracted.description;
        }
        event.participant_count = extracted.participant_links.len();

        tracing::info!(
            "Event: {} - Found {} participant profiles",
            event.title,
            event.participant_count
        );

        let mut links = extracted.participant_links;
        if let Some(cap) = options.max_participants_per_event {
            if links.len() > cap {
                tracing::info!(
                    "Limiting {} to the first {} of {} participants",
                    event.canonical_id,
                    cap,
                    links.len()
                );
                links.truncate(cap);
            }
        }

        let outcomes: HashMap<String, _> = resolve_all(&self.resolver, links.clone(), self.workers)
            .await
            .into_iter()
            .collect();

        let participants = links
            .iter()
            .map(|link| {
                let profile = outcomes.get(link).and_then(|outcome| outcome.as_deref());
                ParticipantRow::new(&event, link, profile)
            })
            .collect();

        EventHarvest {
            event,
            participants,
        }
    }
}
