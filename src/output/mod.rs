//! Output module for exporting harvest results
//!
//! This module handles:
//! - Writing participant rows as CSV
//! - Writing the full report as JSON
//! - Summarizing a run as printable statistics

mod csv_output;
mod json_output;
pub mod stats;
mod traits;

pub use csv_output::{write_rows, CsvReportWriter, CSV_COLUMNS};
pub use json_output::{JsonReport, JsonReportWriter};
pub use stats::{print_statistics, HarvestStatistics};
pub use traits::{ensure_parent_dir, ReportWriter};

use crate::config::OutputConfig;

/// Builds the writers for the configured output paths
///
/// The CSV writer is always present; the JSON writer is added when `json` is
/// true.
pub fn writers_for(config: &OutputConfig, json: bool) -> Vec<Box<dyn ReportWriter>> {
    let mut writers: Vec<Box<dyn ReportWriter>> =
        vec![Box::new(CsvReportWriter::new(&config.csv_path))];
    if json {
        writers.push(Box::new(JsonReportWriter::new(config.resolved_json_path())));
    }
    writers
}
