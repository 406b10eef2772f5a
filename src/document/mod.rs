//! # Document Module
//!
//! The single-document header engine.
//!
//! A [`Document`] is built for one document and one operation. It reads the
//! document (from a file or an in-memory buffer), finds the existing header
//! with the language's [`CommentParser`](crate::comment_parser::CommentParser),
//! compares it with the rendered template and rewrites the text so that only
//! the header region changes. Leading skip text (shebangs, XML declarations,
//! encoding pragmas) stays above the header.
//!
//! ## Example
//!
//! ```rust
//! use licenseheader::document::{Document, DocumentInput};
//! use licenseheader::language::{BuiltinResolver, LanguageResolver};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), licenseheader::error::HeaderError> {
//! let language = BuiltinResolver
//!   .resolve(std::path::Path::new("main.rs"))
//!   .expect("rust is built in");
//! let mut document = Document::new(
//!   DocumentInput::content("fn main() {}\n", "main.rs"),
//!   language,
//!   Some(vec!["// Copyright (c) Acme".to_string()]),
//!   None,
//!   None,
//! );
//!
//! let text = document
//!   .replace_header_if_necessary_content(&CancellationToken::new())
//!   .await?;
//! assert_eq!(text, "// Copyright (c) Acme\nfn main() {}\n");
//! # Ok(())
//! # }
//! ```

pub mod file_io;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::comment_parser::{CommentParser, without_trailing_blank_line};
use crate::error::HeaderError;
use crate::header::{DocumentHeader, HeaderProperties};
use crate::language::Language;
use crate::line_ending::LineEnding;
use crate::preparer::prepare;
use file_io::FileIO;

/// Which variant a [`DocumentInput`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
  FilePath,
  Content,
}

impl fmt::Display for InputMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::FilePath => f.write_str("FilePath"),
      Self::Content => f.write_str("Content"),
    }
  }
}

/// Where a document's text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentInput {
  /// A file that is read and, if needed, overwritten in place.
  Path(PathBuf),
  /// An in-memory buffer; `identifier` is used for messages and placeholders.
  Content { content: String, identifier: String },
}

impl DocumentInput {
  pub fn path(path: impl Into<PathBuf>) -> Self {
    Self::Path(path.into())
  }

  pub fn content(content: impl Into<String>, identifier: impl Into<String>) -> Self {
    Self::Content {
      content: content.into(),
      identifier: identifier.into(),
    }
  }

  pub const fn mode(&self) -> InputMode {
    match self {
      Self::Path(_) => InputMode::FilePath,
      Self::Content { .. } => InputMode::Content,
    }
  }

  /// Path or display name of the document.
  pub fn identifier(&self) -> String {
    match self {
      Self::Path(path) => path.display().to_string(),
      Self::Content { identifier, .. } => identifier.clone(),
    }
  }
}

/// What a rewrite did (or would do) to the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderOutcome {
  /// The header already matched; nothing changed.
  Unchanged,
  /// The document had no header and one was added.
  Inserted,
  /// An existing header was replaced by the desired one.
  Replaced,
  /// The desired header is empty and an existing header was removed.
  Removed,
}

impl HeaderOutcome {
  pub const fn is_change(self) -> bool {
    !matches!(self, Self::Unchanged)
  }
}

/// Result of [`Document::preview`]: the outcome and the text before and after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderChange {
  pub outcome: HeaderOutcome,
  pub original: String,
  pub updated: String,
}

/// A lazily computed value that can be dropped and recomputed.
#[derive(Debug)]
struct Cached<T> {
  value: Option<T>,
}

impl<T> Default for Cached<T> {
  fn default() -> Self {
    Self { value: None }
  }
}

impl<T> Cached<T> {
  const fn get(&self) -> Option<&T> {
    self.value.as_ref()
  }

  fn set(&mut self, value: T) {
    self.value = Some(value);
  }

  fn invalidate(&mut self) {
    self.value = None;
  }
}

/// Header engine for one document.
#[derive(Debug)]
pub struct Document {
  input: DocumentInput,
  language: Arc<Language>,
  header_lines: Option<Vec<String>>,
  properties: Option<HeaderProperties>,
  keywords: Option<Vec<String>>,
  has_bom: bool,
  text: Cached<String>,
  line_ending: Cached<LineEnding>,
  header: Cached<DocumentHeader>,
}

impl Document {
  /// Creates an engine for one document.
  ///
  /// # Parameters
  ///
  /// * `input` - The document, by path or by content
  /// * `language` - Comment syntax of the document's language
  /// * `header_lines` - Desired header lines; `None` or empty removes headers
  /// * `properties` - Placeholder substitutions for the header lines
  /// * `keywords` - An existing comment only counts as a header if it contains
  ///   one of these; `None` or empty accepts any leading comment
  pub fn new(
    input: DocumentInput,
    language: Arc<Language>,
    header_lines: Option<Vec<String>>,
    properties: Option<HeaderProperties>,
    keywords: Option<Vec<String>>,
  ) -> Self {
    Self {
      input,
      language,
      header_lines,
      properties,
      keywords,
      has_bom: false,
      text: Cached::default(),
      line_ending: Cached::default(),
      header: Cached::default(),
    }
  }

  pub const fn input(&self) -> &DocumentInput {
    &self.input
  }

  pub fn language(&self) -> &Language {
    &self.language
  }

  /// Whether the document satisfies the header requirement structurally.
  ///
  /// Returns `true` when no header is required, or when the document (after
  /// its skip text) starts with the rendered header or with a comment block
  /// accepted by the keyword filter. The content of such a block is not
  /// compared with the template.
  pub async fn validate_header(&mut self) -> Result<bool, HeaderError> {
    let header = self.header().await?;
    if header.is_empty() {
      return Ok(true);
    }

    let text = self.text().await?;
    let remainder = &text[self.language.skip_text(&text).map_or(0, str::len)..];
    let existing = self.existing_header(&self.language.comment_parser(), remainder, &header);

    Ok(!existing.is_empty())
  }

  /// Whether the rendered header is entirely a comment in this language.
  ///
  /// A header that fails this check would leave uncommented text in the
  /// document and could never be recognized again.
  pub async fn header_is_well_formed(&mut self) -> Result<bool, HeaderError> {
    let header = self.header().await?;
    if header.is_empty() {
      return Ok(true);
    }
    Ok(self.language.comment_parser().parse(header.text()) == header.text())
  }

  /// The rendered header for this document.
  pub async fn rendered_header(&mut self) -> Result<DocumentHeader, HeaderError> {
    self.header().await
  }

  /// Computes what a rewrite would do without committing anything.
  pub async fn preview(&mut self) -> Result<HeaderChange, HeaderError> {
    let original = self.text().await?;
    let header = self.header().await?;
    let (outcome, updated) = self.rewrite(&original, &header, &CancellationToken::new())?;
    Ok(HeaderChange {
      outcome,
      original,
      updated,
    })
  }

  /// Rewrites the file so its header matches the template.
  ///
  /// The file is only written when its text changes.
  ///
  /// # Errors
  ///
  /// - [`HeaderError::WrongInputMode`] if the input is in-memory content
  /// - [`HeaderError::Cancelled`] if `cancel` fires before a mutating step;
  ///   the file is left untouched
  /// - [`HeaderError::Read`] / [`HeaderError::Write`] on I/O failure
  pub async fn replace_header_if_necessary_path(
    &mut self,
    cancel: &CancellationToken,
  ) -> Result<HeaderOutcome, HeaderError> {
    self.require_mode(InputMode::FilePath)?;
    self.apply(cancel).await
  }

  /// Rewrites the in-memory buffer so its header matches the template and
  /// returns the resulting text.
  ///
  /// # Errors
  ///
  /// - [`HeaderError::WrongInputMode`] if the input is a file path
  /// - [`HeaderError::Cancelled`] if `cancel` fires before a mutating step
  pub async fn replace_header_if_necessary_content(&mut self, cancel: &CancellationToken) -> Result<String, HeaderError> {
    self.require_mode(InputMode::Content)?;
    self.apply(cancel).await?;
    self.text().await
  }

  /// Rewrites the document in whichever mode it was created with.
  pub async fn apply(&mut self, cancel: &CancellationToken) -> Result<HeaderOutcome, HeaderError> {
    let text = self.text().await?;
    let header = self.header().await?;
    let (outcome, updated) = self.rewrite(&text, &header, cancel)?;

    if updated != text {
      self.commit(updated).await?;
    }

    debug!("{}: {:?}", self.input.identifier(), outcome);
    Ok(outcome)
  }

  /// The replace/insert/remove algorithm on a text buffer.
  fn rewrite(
    &self,
    text: &str,
    header: &DocumentHeader,
    cancel: &CancellationToken,
  ) -> Result<(HeaderOutcome, String), HeaderError> {
    let parser = self.language.comment_parser();

    let skip = self.language.skip_text(text).unwrap_or("");
    let remainder = &text[skip.len()..];
    let existing = self.existing_header(&parser, remainder, header);
    let body = &remainder[existing.len()..];

    trace!(
      "{}: skip text {} bytes, existing header {} bytes",
      header.source_identifier(),
      skip.len(),
      existing.len()
    );

    let (outcome, new_remainder) = if header.is_empty() {
      if existing.is_empty() {
        (HeaderOutcome::Unchanged, remainder.to_string())
      } else {
        self.check_cancelled(cancel)?;
        (HeaderOutcome::Removed, body.to_string())
      }
    } else if is_rendered_header(existing, header) {
      (HeaderOutcome::Unchanged, remainder.to_string())
    } else {
      self.check_cancelled(cancel)?;
      let mut replaced = prepare(header.text(), body, &parser);
      replaced.push_str(body);
      let outcome = if existing.is_empty() {
        HeaderOutcome::Inserted
      } else {
        HeaderOutcome::Replaced
      };
      (outcome, replaced)
    };

    if !outcome.is_change() {
      return Ok((outcome, text.to_string()));
    }

    if skip.is_empty() {
      return Ok((outcome, new_remainder));
    }

    self.check_cancelled(cancel)?;
    Ok((outcome, format!("{skip}{new_remainder}")))
  }

  /// The leading comment block of `remainder` that counts as its header.
  ///
  /// A block equal to the rendered header is always accepted, even if it
  /// contains none of the keywords; any other block must pass the keyword
  /// filter.
  fn existing_header<'t>(&self, parser: &CommentParser<'_>, remainder: &'t str, header: &DocumentHeader) -> &'t str {
    let block = parser.parse(remainder);
    if !header.is_empty() && is_rendered_header(block, header) {
      return block;
    }
    parser.parse_with_keywords(remainder, self.keywords.as_deref())
  }

  async fn commit(&mut self, updated: String) -> Result<(), HeaderError> {
    match &self.input {
      DocumentInput::Path(path) => {
        FileIO::write_text(path, &updated, self.has_bom).await?;
        self.text.invalidate();
      }
      DocumentInput::Content { .. } => self.text.set(updated),
    }
    Ok(())
  }

  async fn text(&mut self) -> Result<String, HeaderError> {
    if let Some(text) = self.text.get() {
      return Ok(text.clone());
    }

    let text = match &self.input {
      DocumentInput::Path(path) => {
        let source = FileIO::read_text(path).await?;
        self.has_bom = source.has_bom;
        source.text
      }
      DocumentInput::Content { content, .. } => content.clone(),
    };

    self.text.set(text.clone());
    Ok(text)
  }

  async fn line_ending(&mut self) -> Result<LineEnding, HeaderError> {
    if let Some(ending) = self.line_ending.get() {
      return Ok(*ending);
    }
    let ending = LineEnding::detect(&self.text().await?);
    self.line_ending.set(ending);
    Ok(ending)
  }

  async fn header(&mut self) -> Result<DocumentHeader, HeaderError> {
    if let Some(header) = self.header.get() {
      return Ok(header.clone());
    }
    let ending = self.line_ending().await?;
    let header = DocumentHeader::render(
      self.input.identifier(),
      self.header_lines.as_deref(),
      self.properties.as_ref(),
      ending,
    );
    self.header.set(header.clone());
    Ok(header)
  }

  fn require_mode(&self, expected: InputMode) -> Result<(), HeaderError> {
    let actual = self.input.mode();
    if actual == expected {
      Ok(())
    } else {
      Err(HeaderError::WrongInputMode { expected, actual })
    }
  }

  fn check_cancelled(&self, cancel: &CancellationToken) -> Result<(), HeaderError> {
    if cancel.is_cancelled() {
      debug!("Cancelled while processing {}", self.input.identifier());
      return Err(HeaderError::Cancelled(self.input.identifier()));
    }
    Ok(())
  }
}

/// Whether a parsed block is the rendered header, with or without the empty
/// line the parser takes after it.
fn is_rendered_header(block: &str, header: &DocumentHeader) -> bool {
  block == header.text() || without_trailing_blank_line(block) == header.text()
}
