//! # Header Preparer Module
//!
//! Reconciles a rendered header with the document it is about to be inserted
//! into. The header text is never re-wrapped in comment tokens; only line
//! breaks are added so that the inserted header stays separable from the
//! document that follows.

use crate::comment_parser::CommentParser;
use crate::line_ending::{LineEnding, ends_with_line_break};

/// Returns the text to insert in front of `current` for `header`.
///
/// # Parameters
///
/// * `header` - Rendered header text (already comment formatted)
/// * `current` - Document text the header will precede (skip text excluded)
/// * `parser` - Comment parser for the document's language
///
/// # Returns
///
/// The header, possibly followed by one or two extra line endings. An empty
/// header yields an empty string.
pub fn prepare(header: &str, current: &str, parser: &CommentParser<'_>) -> String {
  if header.is_empty() {
    return String::new();
  }

  let ending = LineEnding::detect_opt(header).unwrap_or_else(|| LineEnding::detect(current));
  let mut prepared = header.to_string();

  if current.is_empty() {
    return prepared;
  }

  if !ends_with_line_break(&prepared) {
    prepared.push_str(ending.as_str());
  }

  // Whatever the parser would take from the document on top of the header
  // (a comment, or its first empty line) must stay with the document.
  let combined = format!("{prepared}{current}");
  if parser.parse(&combined).len() > prepared.len() {
    prepared.push_str(ending.as_str());
  }

  prepared
}
