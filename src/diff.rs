//! # Diff Module
//!
//! This module contains functionality for creating and rendering diffs between original and rewritten content.
//! It's used in check mode to show what a header rewrite would change.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use similar::TextDiff;

/// Manages diff creation and rendering for header changes.
///
/// This struct handles:
/// - Generating unified diffs between original and rewritten content
/// - Displaying diffs to stderr with colorization
/// - Saving diffs to a file
#[derive(Debug, Clone, Default)]
pub struct DiffManager {
  /// Whether to show diffs on stderr
  pub show_diff: bool,

  /// Path to save the combined diff to
  pub save_diff_path: Option<PathBuf>,
}

impl DiffManager {
  /// Creates a new DiffManager with the specified configuration.
  ///
  /// # Parameters
  ///
  /// * `show_diff` - Whether to show diffs on stderr
  /// * `save_diff_path` - Path to save the diff to
  pub const fn new(show_diff: bool, save_diff_path: Option<PathBuf>) -> Self {
    Self {
      show_diff,
      save_diff_path,
    }
  }

  /// Whether any diff output was requested.
  pub const fn is_enabled(&self) -> bool {
    self.show_diff || self.save_diff_path.is_some()
  }

  /// Renders a unified diff for one file.
  ///
  /// # Parameters
  ///
  /// * `path` - Path to the file, used in the `---`/`+++` lines
  /// * `original` - Current file content
  /// * `updated` - Content after the header rewrite
  pub fn render(path: &Path, original: &str, updated: &str) -> String {
    let name = path.display().to_string();
    TextDiff::from_lines(original, updated)
      .unified_diff()
      .context_radius(3)
      .header(&format!("a/{name}"), &format!("b/{name}"))
      .to_string()
  }

  /// Prints and/or saves rendered diffs.
  ///
  /// The saved file contains all diffs in the order given, uncoloured.
  ///
  /// # Errors
  ///
  /// Returns an error if the diff file cannot be written.
  pub async fn emit(&self, diffs: &[String]) -> Result<()> {
    if self.show_diff {
      for diff in diffs {
        for line in diff.lines() {
          eprintln!("{}", colorize_line(line));
        }
      }
    }

    if let Some(path) = &self.save_diff_path {
      tokio::fs::write(path, diffs.concat())
        .await
        .with_context(|| format!("Failed to write diff file: {}", path.display()))?;
    }

    Ok(())
  }
}

fn colorize_line(line: &str) -> String {
  if line.starts_with("+++") || line.starts_with("---") {
    line.if_supports_color(Stream::Stderr, |s| s.bold()).to_string()
  } else if line.starts_with('+') {
    line.if_supports_color(Stream::Stderr, |s| s.green()).to_string()
  } else if line.starts_with('-') {
    line.if_supports_color(Stream::Stderr, |s| s.red()).to_string()
  } else if line.starts_with("@@") {
    line.if_supports_color(Stream::Stderr, |s| s.cyan()).to_string()
  } else {
    line.to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_render_shows_inserted_header() {
    let diff = DiffManager::render(Path::new("src/lib.rs"), "pub fn f() {}\n", "// h\npub fn f() {}\n");

    assert!(diff.contains("--- a/src/lib.rs"));
    assert!(diff.contains("+++ b/src/lib.rs"));
    assert!(diff.contains("+// h\n"));
    assert!(diff.contains(" pub fn f() {}\n"));
  }

  #[test]
  fn test_render_identical_is_empty() {
    assert!(DiffManager::render(Path::new("a.rs"), "x\n", "x\n").is_empty());
  }

  #[test]
  fn test_is_enabled() {
    assert!(!DiffManager::default().is_enabled());
    assert!(DiffManager::new(true, None).is_enabled());
    assert!(DiffManager::new(false, Some(PathBuf::from("out.diff"))).is_enabled());
  }

  #[tokio::test]
  async fn test_emit_saves_diffs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("changes.diff");
    let manager = DiffManager::new(false, Some(out.clone()));

    let diffs = vec![
      DiffManager::render(Path::new("a.rs"), "a\n", "// h\na\n"),
      DiffManager::render(Path::new("b.rs"), "b\n", "// h\nb\n"),
    ];
    manager.emit(&diffs).await.expect("emit");

    let saved = tokio::fs::read_to_string(&out).await.expect("read");
    assert!(saved.contains("a/a.rs"));
    assert!(saved.contains("a/b.rs"));
  }
}
