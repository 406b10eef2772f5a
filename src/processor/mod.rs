//! # Processor Module
//!
//! This module drives the header engine over many files.
//!
//! The module is organized into:
//! - [`file_collector`] - File collection, glob expansion, and directory traversal
//!
//! The [`Processor`] struct is the main entry point. It resolves the language
//! and header template for each file, builds a [`Document`] per file and runs
//! them concurrently, collecting a [`FileReport`] for every file it sees.

pub mod file_collector;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Local};
pub use file_collector::FileCollector;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::diff::DiffManager;
use crate::document::{Document, DocumentInput, HeaderOutcome};
use crate::error::HeaderError;
use crate::header::HeaderProperties;
use crate::language::{Language, LanguageResolver};
use crate::report::{FileAction, FileReport};
use crate::templates::TemplateManager;

/// What the processor does to each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
  /// Report missing and outdated headers without writing anything
  #[default]
  Check,
  /// Insert or replace headers so they match the template
  Modify,
  /// Remove existing headers
  Remove,
}

impl Mode {
  pub const fn writes(self) -> bool {
    !matches!(self, Self::Check)
  }
}

/// Configuration for creating a Processor instance.
pub struct ProcessorConfig {
  pub template_manager: TemplateManager,
  pub resolver: Box<dyn LanguageResolver>,
  pub workspace_root: PathBuf,

  pub mode: Mode,

  /// Keyword filter for existing headers; `None` accepts any leading comment
  pub keywords: Option<Vec<String>>,

  /// Placeholder values from config and the command line
  pub properties: HeaderProperties,

  /// Overrides `%CurrentYear%`
  pub year: Option<String>,

  /// Maximum number of files processed at once
  pub jobs: usize,

  pub ignore_patterns: Vec<String>,
  pub diff_manager: DiffManager,
  pub cancel: CancellationToken,
}

impl ProcessorConfig {
  /// Creates a new ProcessorConfig with required fields and sensible defaults.
  ///
  /// Use struct update syntax to override specific fields:
  /// ```ignore
  /// ProcessorConfig {
  ///     mode: Mode::Modify,
  ///     ..ProcessorConfig::new(template_manager, resolver, workspace_root)
  /// }
  /// ```
  pub fn new(template_manager: TemplateManager, resolver: Box<dyn LanguageResolver>, workspace_root: PathBuf) -> Self {
    Self {
      template_manager,
      resolver,
      workspace_root,
      mode: Mode::Check,
      keywords: None,
      properties: HeaderProperties::new(),
      year: None,
      jobs: num_cpus::get(),
      ignore_patterns: vec![],
      diff_manager: DiffManager::default(),
      cancel: CancellationToken::new(),
    }
  }
}

/// Results of a processing run.
#[derive(Debug, Default)]
pub struct ProcessResult {
  /// One report per file, sorted by path
  pub reports: Vec<FileReport>,
  /// Unified diffs of the changes check mode would make, in path order
  pub diffs: Vec<String>,
  /// Extensions whose header template is not a valid comment in their language
  pub invalid_extensions: BTreeSet<String>,
}

struct FileOutcome {
  report: FileReport,
  diff: Option<String>,
}

impl FileOutcome {
  fn report(report: FileReport) -> Self {
    Self { report, diff: None }
  }
}

/// Processor for running header operations over many files.
///
/// The `Processor` is responsible for:
/// - Collecting files from paths, directories and globs
/// - Resolving each file's language and header template
/// - Checking, inserting, replacing or removing headers
/// - Stopping cleanly when the cancellation token fires
/// - Collecting report data about processed files
pub struct Processor {
  template_manager: TemplateManager,
  resolver: Box<dyn LanguageResolver>,
  file_collector: FileCollector,
  mode: Mode,
  keywords: Option<Vec<String>>,
  properties: HeaderProperties,
  year: Option<String>,
  jobs: usize,
  diff_manager: DiffManager,
  cancel: CancellationToken,
}

impl Processor {
  /// Creates a new processor with the specified configuration.
  ///
  /// # Errors
  ///
  /// Returns an error if any of the ignore patterns are invalid.
  pub fn new(config: ProcessorConfig) -> Result<Self> {
    let file_collector = FileCollector::new(config.workspace_root, &config.ignore_patterns)?;

    Ok(Self {
      template_manager: config.template_manager,
      resolver: config.resolver,
      file_collector,
      mode: config.mode,
      keywords: config.keywords,
      properties: config.properties,
      year: config.year,
      jobs: config.jobs.max(1),
      diff_manager: config.diff_manager,
      cancel: config.cancel,
    })
  }

  pub fn workspace_root(&self) -> &Path {
    self.file_collector.workspace_root()
  }

  pub const fn mode(&self) -> Mode {
    self.mode
  }

  pub const fn diff_manager(&self) -> &DiffManager {
    &self.diff_manager
  }

  /// Collects the files named by `patterns`.
  ///
  /// # Errors
  ///
  /// Returns an error if a glob pattern is invalid.
  pub fn collect_files(&self, patterns: &[String]) -> Result<Vec<PathBuf>> {
    self.file_collector.collect(patterns)
  }

  /// Processes a list of file or directory patterns.
  ///
  /// This is the main entry point for processing files. It handles:
  /// - Individual files
  /// - Directories (recursively)
  /// - Glob patterns
  ///
  /// # Errors
  ///
  /// Returns an error only if the patterns cannot be expanded. Per-file
  /// failures are recorded in the reports.
  pub async fn process(&self, patterns: &[String]) -> Result<ProcessResult> {
    let files = self.collect_files(patterns)?;
    Ok(self.process_files(files).await)
  }

  /// Processes an already collected list of files.
  pub async fn process_files(&self, files: Vec<PathBuf>) -> ProcessResult {
    if files.is_empty() {
      debug!("No files to process");
      return ProcessResult::default();
    }

    let now = Local::now();
    debug!("Processing {} files with {} jobs in {:?} mode", files.len(), self.jobs, self.mode);

    let mut outcomes: Vec<FileOutcome> = stream::iter(files)
      .map(|path| self.process_file(path, now))
      .buffer_unordered(self.jobs)
      .collect()
      .await;

    outcomes.sort_by(|a, b| a.report.path.cmp(&b.report.path));

    let invalid_extensions: BTreeSet<String> = outcomes
      .iter()
      .filter(|outcome| outcome.report.action == FileAction::InvalidHeader)
      .map(|outcome| extension_label(&outcome.report.path))
      .collect();

    for extension in &invalid_extensions {
      warn!("The header template for {} files is not a valid comment", extension);
    }

    let mut result = ProcessResult {
      invalid_extensions,
      ..ProcessResult::default()
    };
    for outcome in outcomes {
      result.diffs.extend(outcome.diff);
      result.reports.push(outcome.report);
    }

    result
  }

  async fn process_file(&self, path: PathBuf, now: DateTime<Local>) -> FileOutcome {
    if self.cancel.is_cancelled() {
      return FileOutcome::report(FileReport::new(path, FileAction::Cancelled));
    }

    if let Ok(metadata) = tokio::fs::symlink_metadata(&path).await
      && metadata.file_type().is_symlink()
    {
      trace!("Skipping: {} (symlink)", path.display());
      return FileOutcome::report(FileReport::with_reason(path, FileAction::Skipped, "Symlink"));
    }

    let Some(language) = self.resolver.resolve(&path) else {
      trace!("Skipping: {} (unknown file type)", path.display());
      return FileOutcome::report(FileReport::with_reason(path, FileAction::Skipped, "Unknown file type"));
    };

    let header_lines = match self.mode {
      Mode::Remove => Vec::new(),
      Mode::Check | Mode::Modify => match self.template_manager.header_lines(&path, &language) {
        Some(lines) => lines,
        None => {
          trace!("Skipping: {} (no header definition)", path.display());
          return FileOutcome::report(FileReport::with_reason(
            path,
            FileAction::Skipped,
            "No header definition for this file type",
          ));
        }
      },
    };

    let properties = self.properties_for(&path, now).await;
    let mut document = self.document_for(&path, language, header_lines, properties);

    match self.run_document(&path, &mut document).await {
      Ok(outcome) => outcome,
      Err(e) if e.is_cancelled() => FileOutcome::report(FileReport::new(path, FileAction::Cancelled)),
      Err(e) => {
        debug!("Failed to process {}: {}", path.display(), e);
        FileOutcome::report(FileReport::with_reason(path, FileAction::Failed, failure_reason(&e)))
      }
    }
  }

  async fn run_document(&self, path: &Path, document: &mut Document) -> Result<FileOutcome, HeaderError> {
    if !document.header_is_well_formed().await? {
      return Ok(FileOutcome::report(FileReport::with_reason(
        path,
        FileAction::InvalidHeader,
        format!("Header template is not a {} comment", document.language().name()),
      )));
    }

    match self.mode {
      Mode::Check => {
        let change = document.preview().await?;
        let action = match change.outcome {
          HeaderOutcome::Unchanged => FileAction::Unchanged,
          HeaderOutcome::Inserted => FileAction::Missing,
          HeaderOutcome::Replaced | HeaderOutcome::Removed => FileAction::Outdated,
        };
        let diff = (self.diff_manager.is_enabled() && change.outcome.is_change())
          .then(|| DiffManager::render(path, &change.original, &change.updated));

        Ok(FileOutcome {
          report: FileReport::new(path, action),
          diff,
        })
      }
      Mode::Modify | Mode::Remove => {
        let outcome = document.replace_header_if_necessary_path(&self.cancel).await?;
        if outcome.is_change() {
          trace!("{}: header {:?}", path.display(), outcome);
        }
        Ok(FileOutcome::report(FileReport::new(path, outcome.into())))
      }
    }
  }

  async fn properties_for(&self, path: &Path, now: DateTime<Local>) -> HeaderProperties {
    let mut properties = HeaderProperties::for_path(path, now).await;
    properties.extend(self.properties.iter());
    if let Some(year) = &self.year {
      properties.insert_named("CurrentYear", year.as_str());
    }
    properties
  }

  fn document_for(
    &self,
    path: &Path,
    language: Arc<Language>,
    header_lines: Vec<String>,
    properties: HeaderProperties,
  ) -> Document {
    Document::new(
      DocumentInput::path(path),
      language,
      Some(header_lines),
      Some(properties),
      self.keywords.clone(),
    )
  }
}

fn failure_reason(error: &HeaderError) -> String {
  match error {
    HeaderError::Read { source, .. } => format!("Failed to read file: {source}"),
    HeaderError::Write { source, .. } => format!("Failed to write file: {source}"),
    other => other.to_string(),
  }
}

/// `.rs`, or the file name for files without an extension.
fn extension_label(path: &Path) -> String {
  match path.extension() {
    Some(ext) => format!(".{}", ext.to_string_lossy().to_lowercase()),
    None => path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_default(),
  }
}
