//! Run statistics
//!
//! Summarizes a finished harvest report for the end-of-run printout.

use crate::crawler::HarvestReport;

/// Harvest statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestStatistics {
    /// Events that produced a record
    pub events_processed: usize,

    /// Events (or listing seeds) whose page could not be fetched
    pub events_failed: usize,

    /// Participant rows across all events
    pub total_participants: usize,

    /// Participant rows with an external URL
    pub with_external_url: usize,

    /// Distinct profile pages actually requested
    pub profiles_fetched: usize,

    /// Wall-clock duration of the run in seconds
    pub duration_seconds: i64,
}

impl HarvestStatistics {
    /// Builds statistics from a report and the number of profile fetches
    pub fn from_report(report: &HarvestReport, profiles_fetched: usize) -> Self {
        Self {
            events_processed: report.events.len(),
            events_failed: report.failed_events.len(),
            total_participants: report.total_participants(),
            with_external_url: report.participants_with_external_url(),
            profiles_fetched,
            duration_seconds: (report.finished_at - report.started_at).num_seconds(),
        }
    }

    /// Share of participants with an external URL, in percent
    pub fn hit_rate(&self) -> f64 {
        if self.total_participants > 0 {
            (self.with_external_url as f64 / self.total_participants as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Events:");
    println!("  Processed: {}", stats.events_processed);
    println!("  Failed: {}", stats.events_failed);
    println!();

    println!("Participants:");
    println!("  Total: {}", stats.total_participants);
    println!("  With external URL: {}", stats.with_external_url);
    println!("  Profile pages fetched: {}", stats.profiles_fetched);
    println!();

    println!(
        "Hit Rate: {:.1}% ({} / {} participants) in {}s",
        stats.hit_rate(),
        stats.with_external_url,
        stats.total_participants,
        stats.duration_seconds
    );
}
