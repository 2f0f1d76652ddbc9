//! Records produced by the harvest pipeline
//!
//! These are the structured values handed to the export layer. They are
//! built once and never mutated after construction.

use crate::url::{canonical_id, extract_user_id};
use serde::Serialize;

/// Title used when no heading rule matches on an event page
pub const UNKNOWN_EVENT: &str = "Unknown Event";

/// Metadata extracted from a single event page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    /// The URL the event was fetched from
    #[serde(rename = "event_url")]
    pub source_url: String,

    /// Event id derived from the URL path
    #[serde(rename = "event_id")]
    pub canonical_id: String,

    /// Event title, or [`UNKNOWN_EVENT`]
    #[serde(rename = "event_name")]
    pub title: String,

    /// Free-text date token as shown on the page
    #[serde(rename = "event_date")]
    pub occurs_at: Option<String>,

    /// Description block, unless descriptions are disabled
    #[serde(rename = "event_description")]
    pub description: Option<String>,

    /// Number of profile links discovered, before any cap or resolution
    pub participant_count: usize,
}

impl EventRecord {
    /// Creates a record with sentinel values for everything but the URL
    pub fn new(source_url: &str) -> Self {
        Self {
            source_url: source_url.to_string(),
            canonical_id: canonical_id(source_url),
            title: UNKNOWN_EVENT.to_string(),
            occurs_at: None,
            description: None,
            participant_count: 0,
        }
    }
}

/// A profile page resolved to a display name and an external URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedProfile {
    /// Normalized profile link this result belongs to
    pub profile_link: String,

    /// Name shown on the profile page
    pub display_name: Option<String>,

    /// External social-network URL found on the profile page
    pub external_url: Option<String>,
}

/// One participant of one event, the atomic unit of the export
///
/// Field order is the export column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantRow {
    pub event_name: String,
    pub event_url: String,
    pub event_id: String,
    pub event_date: Option<String>,

    #[serde(rename = "participant_name")]
    pub display_name: Option<String>,

    /// Profile link exactly as discovered on the event page
    #[serde(rename = "luma_profile")]
    pub profile_link: String,

    /// Site user id (`usr-...`) when the link carries one
    pub user_id: Option<String>,

    #[serde(rename = "linkedin_url")]
    pub external_url: Option<String>,
}

impl ParticipantRow {
    /// Joins an event with the result of resolving one of its profile links
    ///
    /// A failed resolution (`None`) still yields a row, with the name and
    /// external URL left absent.
    pub fn new(event: &EventRecord, profile_link: &str, profile: Option<&ResolvedProfile>) -> Self {
        Self {
            event_name: event.title.clone(),
            event_url: event.source_url.clone(),
            event_id: event.canonical_id.clone(),
            event_date: event.occurs_at.clone(),
            display_name: profile.and_then(|p| p.display_name.clone()),
            profile_link: profile_link.to_string(),
            user_id: extract_user_id(profile_link),
            external_url: profile.and_then(|p| p.external_url.clone()),
        }
    }

    /// Returns true if an external URL was found for this participant
    pub fn has_external_url(&self) -> bool {
        self.external_url.is_some()
    }
}

/// An event together with all of its participant rows
#[derive(Debug, Clone, Serialize)]
pub struct EventHarvest {
    pub event: EventRecord,
    pub participants: Vec<ParticipantRow>,
}
