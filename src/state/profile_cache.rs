//! Run-scoped cache of resolved profiles
//!
//! Profiles are keyed by their normalized link. Each key owns a once-cell, so
//! the first caller for a key runs the computation and every concurrent or
//! later caller awaits and shares its result. Failed resolutions are stored as
//! `None` and never retried within the same run.

use crate::records::ResolvedProfile;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OnceCell;

/// Cached outcome of one profile resolution
pub type CachedProfile = Option<Arc<ResolvedProfile>>;

type Slot = Arc<OnceCell<CachedProfile>>;

/// Shared profile cache, created once per run and passed to every resolver
#[derive(Debug, Default)]
pub struct ProfileCache {
    /// Normalized link -> resolution slot
    slots: Mutex<HashMap<String, Slot>>,

    /// Number of times a computation actually ran
    computations: AtomicUsize,
}

impl ProfileCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached result for `key`, running `compute` only if no result exists
    ///
    /// The map lock is held only while looking up or inserting the slot, never
    /// across the computation itself.
    ///
    /// # Arguments
    ///
    /// * `key` - The normalized profile link
    /// * `compute` - Produces the profile, or `None` when resolution failed
    pub async fn get_or_create<F, Fut>(&self, key: &str, compute: F) -> CachedProfile
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<ResolvedProfile>>,
    {
        let slot = {
            let mut slots = self.lock();
            slots.entry(key.to_string()).or_default().clone()
        };

        slot.get_or_init(|| async move {
            self.computations.fetch_add(1, Ordering::SeqCst);
            compute().await.map(Arc::new)
        })
        .await
        .clone()
    }

    /// Looks up a finished entry without computing anything
    ///
    /// Returns `None` for unknown keys and for keys still being resolved;
    /// `Some(None)` means the profile is known to have failed.
    pub fn get(&self, key: &str) -> Option<CachedProfile> {
        let slots = self.lock();
        slots.get(key).and_then(|slot| slot.get().cloned())
    }

    /// Number of finished entries
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    /// Returns true if no entry has finished yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of computations that ran, i.e. cache misses
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
