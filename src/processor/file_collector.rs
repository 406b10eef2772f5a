//! # File Collector Module
//!
//! This module turns the paths and glob patterns given on the command line
//! into the list of files to process. Directories are walked recursively,
//! honoring `.gitignore` and `.licenseignore` files, and `--ignore` globs are
//! applied to every candidate.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use ignore::overrides::{Override, OverrideBuilder};
use tracing::{debug, trace, warn};

/// Name of the per-directory ignore file, using gitignore syntax.
pub const LICENSE_IGNORE_FILENAME: &str = ".licenseignore";

/// File collector for pattern matching and directory traversal.
///
/// The `FileCollector` handles:
/// - Resolving explicit file paths
/// - Traversing directories to collect files
/// - Expanding glob patterns that don't name an existing path
/// - Excluding files that match an `--ignore` glob
pub struct FileCollector {
  /// Root of the workspace
  workspace_root: PathBuf,

  /// Compiled `--ignore` globs, rooted at the workspace
  ignore: Override,
}

impl FileCollector {
  /// Creates a new FileCollector with the specified workspace root.
  ///
  /// # Parameters
  ///
  /// * `workspace_root` - The root directory of the workspace
  /// * `ignore_patterns` - Gitignore-style globs of files to exclude
  ///
  /// # Errors
  ///
  /// Returns an error if an ignore pattern is not a valid glob.
  pub fn new(workspace_root: PathBuf, ignore_patterns: &[String]) -> Result<Self> {
    let mut builder = OverrideBuilder::new(&workspace_root);
    for pattern in ignore_patterns {
      builder
        .add(&format!("!{pattern}"))
        .with_context(|| format!("Invalid ignore pattern: {pattern}"))?;
    }
    let ignore = builder.build().context("Failed to compile ignore patterns")?;

    Ok(Self { workspace_root, ignore })
  }

  /// Root of the workspace.
  pub fn workspace_root(&self) -> &Path {
    &self.workspace_root
  }

  /// Collects the files named by `patterns`.
  ///
  /// Each pattern is either an existing file, an existing directory (walked
  /// recursively) or a glob. The result is sorted and free of duplicates.
  ///
  /// # Errors
  ///
  /// Returns an error if a pattern is neither an existing path nor a valid glob.
  pub fn collect(&self, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for pattern in patterns {
      let path = Path::new(pattern);
      if path.is_file() {
        if self.is_ignored(path, false) {
          trace!("Skipping: {} (matches ignore pattern)", path.display());
        } else {
          files.insert(path.to_path_buf());
        }
      } else if path.is_dir() {
        files.extend(self.traverse_directory(path));
      } else {
        files.extend(self.expand_glob(pattern)?);
      }
    }

    debug!("Collected {} files from {} patterns", files.len(), patterns.len());
    Ok(files.into_iter().collect())
  }

  /// Traverses a directory recursively and collects all files.
  ///
  /// Unreadable entries are logged and skipped.
  pub fn traverse_directory(&self, dir: &Path) -> Vec<PathBuf> {
    debug!("Scanning directory: {}", dir.display());
    let start_time = std::time::Instant::now();

    let walker = WalkBuilder::new(dir)
      .hidden(false)
      .require_git(false)
      .add_custom_ignore_filename(LICENSE_IGNORE_FILENAME)
      .overrides(self.ignore.clone())
      .filter_entry(|entry| entry.file_name() != ".git")
      .build();

    let mut all_files = Vec::new();
    for entry in walker {
      match entry {
        Ok(entry) if entry.file_type().is_some_and(|t| t.is_file()) => all_files.push(entry.into_path()),
        Ok(_) => {}
        Err(e) => warn!("Error while scanning {}: {}", dir.display(), e),
      }
    }

    debug!(
      "Found {} files in {}ms",
      all_files.len(),
      start_time.elapsed().as_millis()
    );

    all_files
  }

  fn expand_glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))?;

    let mut files = Vec::new();
    for entry in entries {
      match entry {
        Ok(path) if path.is_file() && !self.is_ignored(&path, false) => files.push(path),
        Ok(_) => {}
        Err(e) => warn!("Error while expanding {}: {}", pattern, e),
      }
    }

    if files.is_empty() {
      warn!("Pattern matched no files: {}", pattern);
    }

    Ok(files)
  }

  fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    self.ignore.matched(&absolute, is_dir).is_ignore()
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::tempdir;

  use super::*;

  fn touch(root: &Path, relative: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).expect("create dirs");
    }
    fs::write(&path, "content\n").expect("write file");
    path
  }

  #[test]
  fn test_collects_directory_recursively() {
    let dir = tempdir().expect("tempdir");
    let a = touch(dir.path(), "a.rs");
    let b = touch(dir.path(), "nested/b.py");

    let collector = FileCollector::new(dir.path().to_path_buf(), &[]).expect("collector");
    let files = collector.collect(&[dir.path().to_string_lossy().to_string()]).expect("collect");

    assert_eq!(files, vec![a, b]);
  }

  #[test]
  fn test_licenseignore_is_honored() {
    let dir = tempdir().expect("tempdir");
    let kept = touch(dir.path(), "src/lib.rs");
    touch(dir.path(), "generated/out.rs");
    fs::write(dir.path().join(LICENSE_IGNORE_FILENAME), "generated/\n").expect("write ignore");

    let collector = FileCollector::new(dir.path().to_path_buf(), &[]).expect("collector");
    let files = collector.collect(&[dir.path().to_string_lossy().to_string()]).expect("collect");

    assert!(files.contains(&kept));
    assert!(!files.iter().any(|f| f.starts_with(dir.path().join("generated"))));
  }

  #[test]
  fn test_ignore_patterns_apply_to_walk_and_explicit_files() {
    let dir = tempdir().expect("tempdir");
    let kept = touch(dir.path(), "src/lib.rs");
    let json = touch(dir.path(), "src/data.json");

    let collector = FileCollector::new(dir.path().to_path_buf(), &["*.json".to_string()]).expect("collector");

    let walked = collector.collect(&[dir.path().to_string_lossy().to_string()]).expect("collect");
    assert_eq!(walked, vec![kept]);

    let explicit = collector.collect(&[json.to_string_lossy().to_string()]).expect("collect");
    assert!(explicit.is_empty());
  }

  #[test]
  fn test_glob_patterns_and_dedup() {
    let dir = tempdir().expect("tempdir");
    let a = touch(dir.path(), "a.rs");
    touch(dir.path(), "b.py");

    let collector = FileCollector::new(dir.path().to_path_buf(), &[]).expect("collector");
    let glob = format!("{}/*.rs", dir.path().display());
    let files = collector
      .collect(&[glob, a.to_string_lossy().to_string()])
      .expect("collect");

    assert_eq!(files, vec![a]);
  }

  #[test]
  fn test_invalid_ignore_pattern() {
    let dir = tempdir().expect("tempdir");
    assert!(FileCollector::new(dir.path().to_path_buf(), &["a[".to_string()]).is_err());
  }
}
