//! JSON match report writer.
//!
//! A report file records one matcher run: which counter it bumped and the
//! classification of every page. Page images are not embedded.

use crate::matcher::{MatchResult, SnapshotCounter};
use crate::reconcile::{OutcomeKind, ReportSummary};
use crate::utils::config::REPORT_SCHEMA_VERSION;
use crate::utils::error::OutputError;
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// On-disk report of a matcher run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportFile {
    /// Schema version of this file
    pub version: String,

    pub test_name: String,

    pub pass: bool,

    pub counter: SnapshotCounter,

    pub summary: ReportSummary,

    pub pages: Vec<PageEntry>,

    /// ISO 8601 timestamp
    pub generated_at: String,
}

/// One page line of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageEntry {
    /// 1-based page number
    pub page: usize,

    pub outcome: OutcomeKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_ratio: Option<f64>,
}

impl ReportFile {
    pub fn from_result(test_name: &str, result: &MatchResult) -> Self {
        let pages = result
            .report
            .iter()
            .map(|(page, outcome)| PageEntry {
                page,
                outcome: outcome.kind(),
                diff_ratio: outcome.diff_ratio(),
            })
            .collect();

        Self {
            version: REPORT_SCHEMA_VERSION.to_string(),
            test_name: test_name.to_string(),
            pass: result.pass,
            counter: result.counter,
            summary: result.report.summary(),
            pages,
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Write a report to a JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_report(report: &ReportFile, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing report to: {}", output_path.display());

    super::validate_path(output_path)?;
    super::ensure_parent(output_path)?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, report).map_err(OutputError::SerializationFailed)?;

    Ok(())
}

/// Read a report back from a JSON file
pub fn read_report(input_path: impl AsRef<Path>) -> Result<ReportFile, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading report from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let report: ReportFile =
        serde_json::from_reader(file).map_err(OutputError::SerializationFailed)?;

    Ok(report)
}
