//! Profile resolution
//!
//! Turns a participant profile link into a display name and an external URL,
//! consulting the run-scoped cache so each normalized link is fetched at most
//! once per run.

use crate::crawler::Fetcher;
use crate::extract::LinkExtractor;
use crate::records::ResolvedProfile;
use crate::state::{CachedProfile, ProfileCache, ResolutionState};
use crate::url::normalize_profile_link;
use std::sync::Arc;

/// Resolves profile links through the shared cache
///
/// Cloning is cheap; every clone shares the same fetcher, extractor and cache.
#[derive(Debug, Clone)]
pub struct ProfileResolver {
    fetcher: Arc<Fetcher>,
    extractor: Arc<LinkExtractor>,
    cache: Arc<ProfileCache>,
}

impl ProfileResolver {
    pub fn new(
        fetcher: Arc<Fetcher>,
        extractor: Arc<LinkExtractor>,
        cache: Arc<ProfileCache>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            cache,
        }
    }

    /// The cache this resolver reads and fills
    pub fn cache(&self) -> &Arc<ProfileCache> {
        &self.cache
    }

    /// Resolves a profile link
    ///
    /// Never fails: a link that cannot be normalized or fetched resolves to
    /// `None`, and that outcome is cached like any other.
    pub async fn resolve(&self, profile_link: &str) -> CachedProfile {
        let key = match normalize_profile_link(profile_link) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!("Skipping unusable profile link {}: {}", profile_link, e);
                return None;
            }
        };

        if let Some(cached) = self.cache.get(&key) {
            let state = terminal_state(&cached);
            debug_assert!(state.is_terminal());
            log_transition(&key, ResolutionState::Pending, state);
            return cached;
        }

        self.cache
            .get_or_create(&key, || self.fetch_profile(&key))
            .await
    }

    /// Fetches and parses one profile page; runs at most once per key
    async fn fetch_profile(&self, key: &str) -> Option<ResolvedProfile> {
        log_transition(key, ResolutionState::Pending, ResolutionState::Fetching);

        let page = match self.fetcher.fetch(key).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Error resolving profile {}: {}", key, e);
                log_transition(key, ResolutionState::Fetching, ResolutionState::Failed);
                return None;
            }
        };

        let details = self.extractor.extract_profile(page.markup());
        match &details.external_url {
            Some(url) => tracing::debug!("Found external URL for {}: {}", key, url),
            None => tracing::debug!("No external URL found for {}", key),
        }
        log_transition(key, ResolutionState::Fetching, ResolutionState::Resolved);

        Some(ResolvedProfile {
            profile_link: key.to_string(),
            display_name: details.display_name,
            external_url: details.external_url,
        })
    }
}

fn terminal_state(cached: &CachedProfile) -> ResolutionState {
    if cached.is_some() {
        ResolutionState::Resolved
    } else {
        ResolutionState::Failed
    }
}

fn log_transition(key: &str, from: ResolutionState, to: ResolutionState) {
    debug_assert!(from.can_transition_to(to), "{} -> {}", from, to);
    tracing::trace!("Profile {}: {} -> {}", key, from, to);
}
