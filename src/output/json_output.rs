//! JSON export of the whole report

use crate::crawler::HarvestReport;
use crate::output::traits::{ensure_parent_dir, ReportWriter};
use crate::records::{EventRecord, ParticipantRow};
use crate::HarvestError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Serialized shape of the JSON export
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub events: Vec<&'a EventRecord>,
    /// Event URL -> participant rows of that event
    pub participants_by_event: BTreeMap<&'a str, &'a [ParticipantRow]>,
    pub failed_events: &'a [String],
}

impl<'a> From<&'a HarvestReport> for JsonReport<'a> {
    fn from(report: &'a HarvestReport) -> Self {
        Self {
            started_at: report.started_at,
            finished_at: report.finished_at,
            events: report.events.iter().map(|e| &e.event).collect(),
            participants_by_event: report
                .events
                .iter()
                .map(|e| (e.event.source_url.as_str(), e.participants.as_slice()))
                .collect(),
            failed_events: &report.failed_events,
        }
    }
}

/// Writes the report as pretty-printed JSON
#[derive(Debug, Clone)]
pub struct JsonReportWriter {
    path: PathBuf,
}

impl JsonReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportWriter for JsonReportWriter {
    fn format_name(&self) -> &'static str {
        "JSON"
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, report: &HarvestReport) -> Result<(), HarvestError> {
        ensure_parent_dir(&self.path)?;
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, &JsonReport::from(report))?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::info!(
            "Wrote {} event(s) to {}",
            report.events.len(),
            self.path.display()
        );
        Ok(())
    }
}
