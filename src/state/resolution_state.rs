/// Resolution state definitions for a single profile link
///
/// A profile moves `Pending -> Fetching -> {Resolved, Failed}`. A cache hit
/// goes straight from `Pending` to the stored terminal state.
use std::fmt;

/// Represents the current state of a profile in the resolution process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionState {
    /// Link is known but no work has started
    Pending,

    /// Profile page is being fetched and parsed
    Fetching,

    /// Profile page was fetched; name and external URL may still be absent
    Resolved,

    /// Profile page could not be fetched
    Failed,
}

impl ResolutionState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Failed)
    }

    /// Returns true if moving to `next` follows the state machine
    pub fn can_transition_to(&self, next: ResolutionState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Fetching)
                | (Self::Pending, Self::Resolved)
                | (Self::Pending, Self::Failed)
                | (Self::Fetching, Self::Resolved)
                | (Self::Fetching, Self::Failed)
        )
    }

    /// Short lowercase label used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Resolved => "resolved",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
