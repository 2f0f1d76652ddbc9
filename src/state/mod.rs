//! State module for tracking resolution progress
//!
//! # Components
//!
//! - `ResolutionState`: Tracks the state of a single profile (pending, fetching, resolved, failed)
//! - `ProfileCache`: Run-scoped map from normalized profile link to resolution result

mod profile_cache;
mod resolution_state;

// Re-export main types
pub use profile_cache::{CachedProfile, ProfileCache};
pub use resolution_state::ResolutionState;
