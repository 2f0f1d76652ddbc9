//! Report writer trait
//!
//! Every export format implements [`ReportWriter`] so the binary can write
//! all configured outputs the same way.

use crate::crawler::HarvestReport;
use crate::HarvestError;
use std::fs;
use std::path::Path;

/// A destination for a finished harvest report
pub trait ReportWriter {
    /// Short format name used in log output
    fn format_name(&self) -> &'static str;

    /// Where the report is written
    fn path(&self) -> &Path;

    /// Writes the whole report, replacing any existing file
    fn write(&self, report: &HarvestReport) -> Result<(), HarvestError>;
}

/// Creates the parent directory of `path` if it does not exist yet
pub fn ensure_parent_dir(path: &Path) -> Result<(), HarvestError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
