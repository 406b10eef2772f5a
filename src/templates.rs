//! # Templates Module
//!
//! This module loads header definitions and turns them into the template
//! lines a [`Document`](crate::document::Document) enforces.
//!
//! Two formats are supported:
//!
//! - **Definition files** (`.licenseheader`): a line `extensions: .cs .vb`
//!   starts a section, and the lines that follow (up to the next
//!   `extensions:` line) are the header for files ending in one of those
//!   extensions. Section lines are used verbatim, so they must already be
//!   comment formatted. A section without lines means "remove headers".
//! - **Plain license text**: any file without an `extensions:` line. The text
//!   is wrapped in the comment syntax of each file's language and followed by
//!   one empty line.
//!
//! ## Example
//!
//! ```rust
//! use std::path::Path;
//!
//! use licenseheader::language::{BuiltinResolver, LanguageResolver};
//! use licenseheader::templates::TemplateManager;
//!
//! let mut manager = TemplateManager::new();
//! manager.load_from_str("extensions: .rs\n// Copyright (c) %CurrentYear% Acme\n");
//!
//! let path = Path::new("src/main.rs");
//! let language = BuiltinResolver.resolve(path).expect("rust is built in");
//! let lines = manager.header_lines(path, &language);
//! assert_eq!(lines, Some(vec!["// Copyright (c) %CurrentYear% Acme".to_string()]));
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::language::Language;
use crate::verbose_log;

const SECTION_PREFIX: &str = "extensions:";

/// One `extensions:` section of a definition file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionSection {
  /// Lowercase file name suffixes; `*` is stored as the empty suffix.
  pub extensions: Vec<String>,
  /// Header lines, verbatim.
  pub lines: Vec<String>,
}

impl DefinitionSection {
  /// Length of the longest extension that `file_name` ends with.
  fn match_len(&self, file_name: &str) -> Option<usize> {
    self
      .extensions
      .iter()
      .filter(|ext| file_name.ends_with(ext.as_str()))
      .map(String::len)
      .max()
  }
}

/// A loaded header definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HeaderDefinition {
  /// Nothing loaded yet.
  #[default]
  Unloaded,
  /// A `.licenseheader` file with per-extension sections.
  Sections(Vec<DefinitionSection>),
  /// Plain license text, wrapped per language.
  PlainText(Vec<String>),
}

/// Manager for loading header definitions and selecting the template lines
/// for a file.
#[derive(Debug, Clone, Default)]
pub struct TemplateManager {
  definition: HeaderDefinition,
}

impl TemplateManager {
  /// Creates a manager with nothing loaded.
  ///
  /// You must call [`load_template`](Self::load_template) or
  /// [`load_from_str`](Self::load_from_str) before using it.
  pub fn new() -> Self {
    Self::default()
  }

  /// Loads a definition file or plain license text from disk.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or is not valid UTF-8.
  pub async fn load_template(&mut self, path: &Path) -> Result<()> {
    verbose_log!("Loading header definition from: {}", path.display());

    let content = tokio::fs::read_to_string(path)
      .await
      .with_context(|| format!("Failed to read header definition file: {}", path.display()))?;

    self.load_from_str(&content);
    Ok(())
  }

  /// Parses a definition from a string.
  pub fn load_from_str(&mut self, content: &str) {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let lines = split_lines(content);

    let is_sectioned = lines.iter().any(|line| is_section_line(line));
    self.definition = if is_sectioned {
      HeaderDefinition::Sections(parse_sections(&lines))
    } else {
      let mut text: Vec<String> = lines
        .into_iter()
        .map(|line| line.replace("{{year}}", "%CurrentYear%"))
        .collect();
      while text.last().is_some_and(|line| line.trim().is_empty()) {
        text.pop();
      }
      HeaderDefinition::PlainText(text)
    };

    debug!("Loaded header definition: {:?}", self.definition);
  }

  pub const fn definition(&self) -> &HeaderDefinition {
    &self.definition
  }

  /// Template lines for `path`.
  ///
  /// # Returns
  ///
  /// - `Some(lines)` with the header for this file; an empty list means the
  ///   header must be removed
  /// - `None` when the definition has no entry for this file
  pub fn header_lines(&self, path: &Path, language: &Language) -> Option<Vec<String>> {
    match &self.definition {
      HeaderDefinition::Unloaded => None,
      HeaderDefinition::Sections(sections) => {
        let file_name = path
          .file_name()
          .map(|name| name.to_string_lossy().to_lowercase())
          .unwrap_or_default();

        sections
          .iter()
          .filter_map(|section| section.match_len(&file_name).map(|len| (len, section)))
          .max_by_key(|(len, _)| *len)
          .map(|(_, section)| section.lines.clone())
      }
      HeaderDefinition::PlainText(text) => Some(wrap_in_comments(text, language)),
    }
  }
}

fn is_section_line(line: &str) -> bool {
  line
    .trim_start()
    .get(..SECTION_PREFIX.len())
    .is_some_and(|prefix| prefix.eq_ignore_ascii_case(SECTION_PREFIX))
}

fn parse_sections(lines: &[String]) -> Vec<DefinitionSection> {
  let mut sections: Vec<DefinitionSection> = Vec::new();

  for line in lines {
    if is_section_line(line) {
      let extensions = line.trim_start()[SECTION_PREFIX.len()..]
        .split_whitespace()
        .map(|ext| if ext == "*" { String::new() } else { ext.to_lowercase() })
        .collect();
      sections.push(DefinitionSection {
        extensions,
        lines: Vec::new(),
      });
    } else if let Some(section) = sections.last_mut() {
      section.lines.push(line.clone());
    } else {
      debug!("Ignoring line before the first section: {line:?}");
    }
  }

  sections
}

/// Wraps plain license text in a language's comment syntax.
///
/// Line comments are preferred; each line gets the token and a space (empty
/// lines get the bare token). Languages with only block comments get the
/// open token on its own line, the text, then the close token. One empty line
/// follows the comment. Empty text wraps to no lines at all.
pub fn wrap_in_comments(text: &[String], language: &Language) -> Vec<String> {
  if text.is_empty() {
    return Vec::new();
  }

  let mut wrapped: Vec<String> = Vec::with_capacity(text.len() + 3);

  if let Some(token) = language.line_comment() {
    wrapped.extend(text.iter().map(|line| {
      if line.trim().is_empty() {
        token.to_string()
      } else {
        format!("{token} {line}")
      }
    }));
  } else if let Some((open, close)) = language.block_comment() {
    let c_style = open == "/*" && close == "*/";
    wrapped.push(open.to_string());
    wrapped.extend(text.iter().map(|line| match (c_style, line.trim().is_empty()) {
      (true, true) => " *".to_string(),
      (true, false) => format!(" * {line}"),
      (false, _) => line.clone(),
    }));
    wrapped.push(if c_style { format!(" {close}") } else { close.to_string() });
  }

  wrapped.push(String::new());
  wrapped
}

/// Splits on `\r\n`, `\n` and `\r`. A final line break terminates the last
/// line instead of starting an empty one.
fn split_lines(content: &str) -> Vec<String> {
  let mut lines = Vec::new();
  let mut rest = content;

  while !rest.is_empty() {
    match rest.find(['\n', '\r']) {
      Some(idx) => {
        lines.push(rest[..idx].to_string());
        let width = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[idx + width..];
      }
      None => {
        lines.push(rest.to_string());
        rest = "";
      }
    }
  }

  lines
}
