//! URL handling module for Luma-Harvest
//!
//! This module provides profile-link normalization (the cache key), event id
//! derivation, relative link resolution, and listing-page detection.

mod normalize;

pub use normalize::{canonical_id, extract_user_id, normalize_profile_link, resolve_link};

/// Returns true when the URL carries one of the configured listing markers
///
/// Markers are matched case-insensitively against the full URL text, so both
/// path fragments (`/calendar/`) and host-relative prefixes work.
///
/// # Examples
///
/// ```
/// use luma_harvest::url::is_listing_url;
///
/// let markers = vec!["/discover".to_string()];
/// assert!(is_listing_url("https://lu.ma/discover?city=blr", &markers));
/// assert!(!is_listing_url("https://lu.ma/18tw2f7h", &markers));
/// ```
pub fn is_listing_url(url: &str, markers: &[String]) -> bool {
    let lowered = url.to_lowercase();
    markers
        .iter()
        .any(|marker| lowered.contains(&marker.to_lowercase()))
}
