//! CSV export of participant rows
//!
//! One line per participant, events in processing order. Missing values are
//! written as empty cells. The header is always written, even for a run that
//! found nobody.

use crate::crawler::HarvestReport;
use crate::output::traits::{ensure_parent_dir, ReportWriter};
use crate::records::ParticipantRow;
use crate::HarvestError;
use std::io;
use std::path::{Path, PathBuf};

/// Column order of the participant export
pub const CSV_COLUMNS: [&str; 8] = [
    "event_name",
    "event_url",
    "event_id",
    "event_date",
    "participant_name",
    "luma_profile",
    "user_id",
    "linkedin_url",
];

/// Writes participant rows to a CSV file
#[derive(Debug, Clone)]
pub struct CsvReportWriter {
    path: PathBuf,
}

impl CsvReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportWriter for CsvReportWriter {
    fn format_name(&self) -> &'static str {
        "CSV"
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, report: &HarvestReport) -> Result<(), HarvestError> {
        ensure_parent_dir(&self.path)?;
        let file = std::fs::File::create(&self.path)?;
        let rows = report.events.iter().flat_map(|e| &e.participants);
        let written = write_rows(file, rows)?;

        tracing::info!("Wrote {} participant row(s) to {}", written, self.path.display());
        Ok(())
    }
}

/// Writes the header and the given rows to any writer
///
/// # Returns
///
/// The number of rows written, header excluded
pub fn write_rows<'a, W, I>(writer: W, rows: I) -> Result<usize, HarvestError>
where
    W: io::Write,
    I: IntoIterator<Item = &'a ParticipantRow>,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(CSV_COLUMNS)?;

    let mut count = 0;
    for row in rows {
        csv_writer.serialize(row)?;
        count += 1;
    }
    csv_writer.flush()?;

    Ok(count)
}
