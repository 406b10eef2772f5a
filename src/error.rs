//! # Error Module
//!
//! Errors produced by the single-document header engine.
//!
//! Orchestration layers (processor, CLI) wrap these in `anyhow` with file
//! context; the engine itself only ever returns [`HeaderError`].

use std::path::PathBuf;

use crate::document::InputMode;

/// Errors returned by [`Document`](crate::document::Document) and the
/// language descriptor constructors.
#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
  /// A mode-specific operation was called on a handle in the other mode.
  #[error("document input must be in {expected} mode, but it is in {actual} mode")]
  WrongInputMode { expected: InputMode, actual: InputMode },

  /// The document could not be read.
  #[error("Failed to read file '{path}': {source}")]
  Read { path: PathBuf, source: std::io::Error },

  /// The document could not be written back.
  #[error("Failed to write file '{path}': {source}")]
  Write { path: PathBuf, source: std::io::Error },

  /// The caller cancelled the operation before the next mutating step.
  #[error("header operation on '{0}' was cancelled")]
  Cancelled(String),

  /// A language's skip expression is not a valid regular expression.
  #[error("invalid skip expression '{expression}': {source}")]
  InvalidSkipExpression { expression: String, source: regex::Error },

  /// A language descriptor defines neither a line comment nor a block comment.
  #[error("language for {0} defines neither a line comment nor a block comment")]
  MissingCommentSyntax(String),
}

impl HeaderError {
  /// Whether this error is a cooperative cancellation rather than a failure.
  pub const fn is_cancelled(&self) -> bool {
    matches!(self, Self::Cancelled(_))
  }
}
