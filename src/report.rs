//! # Report Module
//!
//! This module records what happened to each processed file and can write the
//! results as a JSON or CSV report.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::document::HeaderOutcome;

/// Information about a processed file for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
  /// Path to the file
  #[serde(with = "path_serialization")]
  pub path: PathBuf,
  /// What happened to the file
  pub action: FileAction,
  /// Why the file was skipped or failed, if applicable
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
}

impl FileReport {
  pub fn new(path: impl Into<PathBuf>, action: FileAction) -> Self {
    Self {
      path: path.into(),
      action,
      reason: None,
    }
  }

  pub fn with_reason(path: impl Into<PathBuf>, action: FileAction, reason: impl Into<String>) -> Self {
    Self {
      path: path.into(),
      action,
      reason: Some(reason.into()),
    }
  }
}

/// Possible results for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
  /// The header already matched
  Unchanged,
  /// A header was added
  Inserted,
  /// An existing header was replaced
  Replaced,
  /// A header was removed
  Removed,
  /// Check mode: the file has no header
  Missing,
  /// Check mode: the file has a header that differs from the template
  Outdated,
  /// The file was not processed (unknown language, no header definition)
  Skipped,
  /// The header definition for this file type is not a comment in its language
  InvalidHeader,
  /// Reading or writing the file failed
  Failed,
  /// Processing was cancelled before the file was changed
  Cancelled,
}

impl FileAction {
  /// Whether this result makes a check run fail.
  pub const fn is_check_failure(self) -> bool {
    matches!(self, Self::Missing | Self::Outdated)
  }

  /// Whether this result is an error in any mode.
  pub const fn is_error(self) -> bool {
    matches!(self, Self::Failed | Self::InvalidHeader)
  }

  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Unchanged => "unchanged",
      Self::Inserted => "inserted",
      Self::Replaced => "replaced",
      Self::Removed => "removed",
      Self::Missing => "missing",
      Self::Outdated => "outdated",
      Self::Skipped => "skipped",
      Self::InvalidHeader => "invalid_header",
      Self::Failed => "failed",
      Self::Cancelled => "cancelled",
    }
  }
}

impl fmt::Display for FileAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl From<HeaderOutcome> for FileAction {
  fn from(outcome: HeaderOutcome) -> Self {
    match outcome {
      HeaderOutcome::Unchanged => Self::Unchanged,
      HeaderOutcome::Inserted => Self::Inserted,
      HeaderOutcome::Replaced => Self::Replaced,
      HeaderOutcome::Removed => Self::Removed,
    }
  }
}

/// Helper module for serializing/deserializing PathBuf
mod path_serialization {
  use std::path::PathBuf;

  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S>(path: &std::path::Path, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_str(&path.to_string_lossy())
  }

  pub fn deserialize<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
  where
    D: Deserializer<'de>,
  {
    let s = String::deserialize(deserializer)?;
    Ok(PathBuf::from(s))
  }
}

/// Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
  /// JSON format for machine readability
  Json,
  /// CSV format for spreadsheet compatibility
  Csv,
}

impl fmt::Display for ReportFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Json => write!(f, "JSON"),
      Self::Csv => write!(f, "CSV"),
    }
  }
}

/// Report Generator for writing processing reports
pub struct ReportGenerator<'a> {
  format: ReportFormat,
  output_path: &'a Path,
}

impl<'a> ReportGenerator<'a> {
  /// Create a new report generator
  ///
  /// # Parameters
  ///
  /// * `format` - The format to use for the report
  /// * `output_path` - The path where the report will be saved
  pub const fn new(format: ReportFormat, output_path: &'a Path) -> Self {
    Self { format, output_path }
  }

  /// Generate a report from a collection of file reports
  ///
  /// # Returns
  ///
  /// `Ok(())` if the report was generated successfully, or an error if the
  /// report couldn't be written to disk.
  pub async fn generate(&self, files: &[FileReport], summary: &ProcessingSummary) -> Result<()> {
    let content = match self.format {
      ReportFormat::Json => Self::generate_json(files, summary)?,
      ReportFormat::Csv => Self::generate_csv(files, summary),
    };

    tokio::fs::write(self.output_path, content)
      .await
      .with_context(|| format!("Failed to write {} report to {}", self.format, self.output_path.display()))
  }

  fn generate_json(files: &[FileReport], summary: &ProcessingSummary) -> Result<String> {
    let report = serde_json::json!({
      "generated": Local::now().to_rfc3339(),
      "summary": summary,
      "files": files,
    });

    Ok(serde_json::to_string_pretty(&report)?)
  }

  fn generate_csv(files: &[FileReport], summary: &ProcessingSummary) -> String {
    let mut csv = String::from("file_path,action,reason\n");

    for file in files {
      let path = file.path.to_string_lossy().replace(',', "%2C");
      let reason = file.reason.as_deref().unwrap_or("").replace(',', "%2C");
      csv.push_str(&format!("{path},{},{reason}\n", file.action));
    }

    csv.push_str("\n# Summary\n");
    csv.push_str(&format!("Total files,{}\n", summary.total_files));
    csv.push_str(&format!("Unchanged,{}\n", summary.unchanged));
    csv.push_str(&format!("Inserted,{}\n", summary.inserted));
    csv.push_str(&format!("Replaced,{}\n", summary.replaced));
    csv.push_str(&format!("Removed,{}\n", summary.removed));
    csv.push_str(&format!("Missing,{}\n", summary.missing));
    csv.push_str(&format!("Outdated,{}\n", summary.outdated));
    csv.push_str(&format!("Skipped,{}\n", summary.skipped));
    csv.push_str(&format!("Invalid header,{}\n", summary.invalid_header));
    csv.push_str(&format!("Failed,{}\n", summary.failed));
    csv.push_str(&format!("Cancelled,{}\n", summary.cancelled));
    csv.push_str(&format!("Processing time (seconds),{:.2}\n", summary.processing_time_secs));

    csv
  }
}

/// Summary of the processing results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessingSummary {
  pub total_files: usize,
  pub unchanged: usize,
  pub inserted: usize,
  pub replaced: usize,
  pub removed: usize,
  pub missing: usize,
  pub outdated: usize,
  pub skipped: usize,
  pub invalid_header: usize,
  pub failed: usize,
  pub cancelled: usize,
  #[serde(skip_serializing)]
  pub processing_time: Duration,
  #[serde(rename = "processing_time_seconds")]
  pub processing_time_secs: f64,
}

impl ProcessingSummary {
  /// Create a ProcessingSummary from a collection of FileReports
  pub fn from_reports(files: &[FileReport], processing_time: Duration) -> Self {
    let mut summary = Self {
      total_files: files.len(),
      processing_time,
      processing_time_secs: processing_time.as_secs_f64(),
      ..Self::default()
    };

    for file in files {
      let counter = match file.action {
        FileAction::Unchanged => &mut summary.unchanged,
        FileAction::Inserted => &mut summary.inserted,
        FileAction::Replaced => &mut summary.replaced,
        FileAction::Removed => &mut summary.removed,
        FileAction::Missing => &mut summary.missing,
        FileAction::Outdated => &mut summary.outdated,
        FileAction::Skipped => &mut summary.skipped,
        FileAction::InvalidHeader => &mut summary.invalid_header,
        FileAction::Failed => &mut summary.failed,
        FileAction::Cancelled => &mut summary.cancelled,
      };
      *counter += 1;
    }

    summary
  }

  /// Files that were looked at and not skipped.
  pub const fn processed(&self) -> usize {
    self.total_files - self.skipped
  }
}
