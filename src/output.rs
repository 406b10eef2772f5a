//! # Output Module
//!
//! This module centralizes all user-facing output for the licenseheader tool.
//! It provides consistent formatting, colors, and symbols for terminal output.
//!
//! ## Design Goals
//!
//! - **Informative**: Show actionable information without requiring flags
//! - **Scannable**: Use formatting to make output easy to parse visually
//! - **Progressive**: More detail with `-v`, silence with `-q`
//! - **Scriptable**: Keep stdout predictable for piping/automation

use std::path::Path;

use owo_colors::{OwoColorize, Stream};

use crate::logging::{is_quiet, is_verbose};
use crate::report::{FileAction, FileReport, ProcessingSummary};

/// Symbols used in output
pub mod symbols {
  /// Header present/written
  pub const SUCCESS: &str = "\u{2713}"; // ✓
  /// Missing header/failure
  pub const FAILURE: &str = "\u{2717}"; // ✗
  /// Skipped
  pub const IGNORED: &str = "-";
  /// Header replaced or outdated
  pub const UPDATED: &str = "\u{21bb}"; // ↻
}

/// Maximum number of files to show in the default output before truncating
const DEFAULT_FILE_LIST_LIMIT: usize = 20;

/// Print the initial "Checking N files..." or "Processing N files..." message.
pub fn print_start_message(file_count: usize, modify_mode: bool) {
  if is_quiet() {
    return;
  }

  let verb = if modify_mode { "Processing" } else { "Checking" };
  println!("{} {} {}...", verb, file_count, plural(file_count));
}

/// Print a blank line for visual separation (respects quiet mode).
pub fn print_blank_line() {
  if !is_quiet() {
    println!();
  }
}

/// Print the list of files with no header.
///
/// In quiet mode only the bare paths are printed, one per line, so the output
/// can be piped into other tools.
pub fn print_missing_files(files: &[&FileReport], workspace_root: Option<&Path>) {
  if is_quiet() {
    print_bare_paths(files, workspace_root);
    return;
  }

  let symbol = symbols::FAILURE.if_supports_color(Stream::Stdout, |s| s.red()).to_string();
  print_file_list(files, workspace_root, &symbol, "missing license headers");
}

/// Print the list of files whose header differs from the template.
pub fn print_outdated_files(files: &[&FileReport], workspace_root: Option<&Path>) {
  if is_quiet() {
    print_bare_paths(files, workspace_root);
    return;
  }

  let symbol = symbols::UPDATED.if_supports_color(Stream::Stdout, |s| s.yellow()).to_string();
  print_file_list(files, workspace_root, &symbol, "with outdated license headers");
}

/// Print the list of files that had headers inserted.
pub fn print_inserted_files(files: &[&FileReport], workspace_root: Option<&Path>) {
  if is_quiet() {
    return;
  }

  let symbol = symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()).to_string();
  print_file_list(files, workspace_root, &symbol, "received a license header");
}

/// Print the list of files that had headers replaced.
pub fn print_replaced_files(files: &[&FileReport], workspace_root: Option<&Path>) {
  if is_quiet() {
    return;
  }

  let symbol = symbols::UPDATED.if_supports_color(Stream::Stdout, |s| s.yellow()).to_string();
  print_file_list(files, workspace_root, &symbol, "had their license header replaced");
}

/// Print the list of files that had headers removed.
pub fn print_removed_files(files: &[&FileReport], workspace_root: Option<&Path>) {
  if is_quiet() {
    return;
  }

  let symbol = symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()).to_string();
  print_file_list(files, workspace_root, &symbol, "had their license header removed");
}

/// Print files that could not be processed, with the reason for each.
///
/// Errors go to stderr and are shown even in quiet mode.
pub fn print_failed_files(files: &[&FileReport], workspace_root: Option<&Path>) {
  for file in sorted(files) {
    let reason = file.reason.as_deref().unwrap_or("unknown error");
    eprintln!(
      "{} {}: {} ({})",
      symbols::FAILURE.if_supports_color(Stream::Stderr, |s| s.red()),
      make_relative_path(&file.path, workspace_root),
      reason,
      file.action
    );
  }
}

/// Print skipped files with their reason. Only shown in verbose mode.
pub fn print_skipped_files(files: &[&FileReport], workspace_root: Option<&Path>) {
  if !is_verbose() {
    return;
  }

  for file in sorted(files) {
    let path = make_relative_path(&file.path, workspace_root);
    println!(
      "  {} {} (skipped: {})",
      symbols::IGNORED.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      path.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      file.reason.as_deref().unwrap_or("no reason given")
    );
  }
}

/// Print the success message when all files have the expected header.
pub fn print_all_files_ok() {
  if is_quiet() {
    return;
  }

  println!(
    "{} All files have up-to-date license headers.",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green())
  );
}

/// Print the processing summary.
///
/// Format: "Summary: X OK, Y changed, Z missing, W outdated, V skipped, U failed"
/// In verbose mode, also shows timing.
pub fn print_summary(summary: &ProcessingSummary) {
  if is_quiet() {
    return;
  }

  let changed = summary.inserted + summary.replaced + summary.removed;
  let failed = summary.failed + summary.invalid_header;

  let mut summary_line = format!(
    "Summary: {} OK, {} changed, {} missing, {} outdated, {} skipped, {} failed",
    summary.unchanged.if_supports_color(Stream::Stdout, |s| s.cyan()),
    changed.if_supports_color(Stream::Stdout, |s| s.green()),
    highlight_count(summary.missing),
    highlight_count(summary.outdated),
    summary.skipped.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    highlight_count(failed),
  );

  if summary.cancelled > 0 {
    summary_line.push_str(&format!(", {} cancelled", summary.cancelled));
  }

  if is_verbose() {
    summary_line.push_str(&format!(" ({:.2}s)", summary.processing_time.as_secs_f64()));
  }

  println!("{}", summary_line);
}

/// Print a hint for the user about what to do next.
pub fn print_hint(message: &str) {
  if is_quiet() {
    return;
  }

  println!("{}", message.if_supports_color(Stream::Stdout, |s| s.yellow()));
}

/// File reports grouped by result, for output.
#[derive(Debug, Default)]
pub struct CategorizedReports<'a> {
  pub missing: Vec<&'a FileReport>,
  pub outdated: Vec<&'a FileReport>,
  pub inserted: Vec<&'a FileReport>,
  pub replaced: Vec<&'a FileReport>,
  pub removed: Vec<&'a FileReport>,
  pub ok: Vec<&'a FileReport>,
  pub skipped: Vec<&'a FileReport>,
  /// Failed, invalid-header and cancelled files
  pub failed: Vec<&'a FileReport>,
}

impl<'a> CategorizedReports<'a> {
  /// Categorize a slice of file reports.
  pub fn from_reports(reports: &'a [FileReport]) -> Self {
    let mut categorized = Self::default();

    for report in reports {
      let bucket = match report.action {
        FileAction::Missing => &mut categorized.missing,
        FileAction::Outdated => &mut categorized.outdated,
        FileAction::Inserted => &mut categorized.inserted,
        FileAction::Replaced => &mut categorized.replaced,
        FileAction::Removed => &mut categorized.removed,
        FileAction::Unchanged => &mut categorized.ok,
        FileAction::Skipped => &mut categorized.skipped,
        FileAction::Failed | FileAction::InvalidHeader | FileAction::Cancelled => &mut categorized.failed,
      };
      bucket.push(report);
    }

    categorized
  }

  /// Whether a check run found nothing to fix.
  pub fn all_ok(&self) -> bool {
    self.missing.is_empty() && self.outdated.is_empty() && self.failed.is_empty()
  }
}

fn print_file_list(files: &[&FileReport], workspace_root: Option<&Path>, symbol: &str, description: &str) {
  if files.is_empty() {
    return;
  }

  let files = sorted(files);
  let count = files.len();
  println!("{} {} {} {}:", symbol, count, plural(count), description);

  let show_all = is_verbose();
  let limit = if show_all { count } else { DEFAULT_FILE_LIST_LIMIT };

  for file in files.iter().take(limit) {
    println!("  {}", make_relative_path(&file.path, workspace_root));
  }

  if !show_all && count > limit {
    println!(
      "  {} ... and {} more (use -v to see all)",
      "".if_supports_color(Stream::Stdout, |s| s.dimmed()),
      count - limit
    );
  }
}

fn print_bare_paths(files: &[&FileReport], workspace_root: Option<&Path>) {
  for file in sorted(files) {
    println!("{}", make_relative_path(&file.path, workspace_root));
  }
}

fn sorted<'a>(files: &[&'a FileReport]) -> Vec<&'a FileReport> {
  let mut files = files.to_vec();
  files.sort_by(|a, b| a.path.cmp(&b.path));
  files
}

fn highlight_count(count: usize) -> String {
  if count > 0 {
    count.if_supports_color(Stream::Stdout, |s| s.red()).to_string()
  } else {
    count.if_supports_color(Stream::Stdout, |s| s.cyan()).to_string()
  }
}

const fn plural(count: usize) -> &'static str {
  if count == 1 { "file" } else { "files" }
}

/// Make a path relative to the workspace root for display.
///
/// Paths outside the root are shown with `..` components; relative paths are
/// shown unchanged.
pub fn make_relative_path(path: &Path, workspace_root: Option<&Path>) -> String {
  match workspace_root {
    Some(root) if path.is_absolute() == root.is_absolute() => pathdiff::diff_paths(path, root)
      .map(|p| p.to_string_lossy().to_string())
      .unwrap_or_else(|| path.to_string_lossy().to_string()),
    _ => path.to_string_lossy().to_string(),
  }
}
