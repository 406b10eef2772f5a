#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use licenseheader::document::{Document, DocumentInput};
use licenseheader::language::{BuiltinResolver, Language, LanguageResolver};
use tokio_util::sync::CancellationToken;

/// Resolves the built-in language for a file name such as `main.rs`.
pub fn language_for(file_name: &str) -> Arc<Language> {
  BuiltinResolver
    .resolve(Path::new(file_name))
    .unwrap_or_else(|| panic!("no built-in language for {file_name}"))
}

/// Turns string literals into template lines.
pub fn lines(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| (*s).to_string()).collect()
}

/// The default keyword filter, as the CLI applies it.
pub fn default_keywords() -> Vec<String> {
  lines(&["license", "copyright", "(c)", "©"])
}

/// Runs the content-mode engine once and returns the new text.
pub async fn rewrite_content(
  content: &str,
  file_name: &str,
  header: &[&str],
  keywords: Option<Vec<String>>,
) -> Result<String> {
  let mut document = Document::new(
    DocumentInput::content(content, file_name),
    language_for(file_name),
    Some(lines(header)),
    None,
    keywords,
  );

  document
    .replace_header_if_necessary_content(&CancellationToken::new())
    .await
    .with_context(|| format!("Failed to rewrite {file_name}"))
}

/// Writes `content` to `dir/relative`, creating parent directories.
pub fn write_file(dir: &Path, relative: &str, content: impl AsRef<[u8]>) -> Result<PathBuf> {
  let path = dir.join(relative);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(path)
}
