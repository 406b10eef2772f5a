//! # Comment Parser Module
//!
//! Extracts the verbatim leading comment block of a document using only the
//! comment tokens of a [`Language`](crate::language::Language).
//!
//! The parser never interprets the source language. It walks the text from
//! the start, consuming whitespace and comment constructs (line comments,
//! block comments, region blocks) and stops at the first content that is not
//! a comment opener. The result is always a byte-identical prefix of the
//! input, so callers can strip it by length.

use crate::line_ending::{ends_with_line_break, line_break_len};

/// Kind of comment construct, ordered by precedence when token lengths tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Construct {
  Line,
  Block,
  Region,
}

/// Parser over a fixed set of comment tokens.
#[derive(Debug, Clone, Copy)]
pub struct CommentParser<'a> {
  line: Option<&'a str>,
  block: Option<(&'a str, &'a str)>,
  region: Option<(&'a str, &'a str)>,
}

impl<'a> CommentParser<'a> {
  pub const fn new(line: Option<&'a str>, block: Option<(&'a str, &'a str)>, region: Option<(&'a str, &'a str)>) -> Self {
    Self { line, block, region }
  }

  /// Returns the leading comment block of `text`.
  ///
  /// # Rules
  ///
  /// - Whitespace before the first comment belongs to the block.
  /// - Consecutive comment constructs separated only by indentation are
  ///   merged.
  /// - The first empty line after a comment ends the block and is included
  ///   in it.
  /// - An unterminated block comment or region yields an empty string.
  ///
  /// # Returns
  ///
  /// A prefix of `text`; empty if the text does not start with a comment.
  pub fn parse<'t>(&self, text: &'t str) -> &'t str {
    let mut pos = 0;
    let mut seen_comment = false;

    loop {
      let ws_start = pos;
      let ws_len = text[pos..].len() - text[pos..].trim_start().len();
      let ws = &text[pos..pos + ws_len];

      if seen_comment {
        if let Some(break_at) = ws.find(['\n', '\r']) {
          // One empty line after the comment, including its line break.
          let end = ws_start + break_at + line_break_len(&ws[break_at..]);
          return &text[..end];
        }
      }

      pos += ws_len;
      let rest = &text[pos..];
      if rest.is_empty() {
        return if seen_comment { &text[..ws_start] } else { "" };
      }

      let Some((construct, open)) = self.match_opener(rest) else {
        return if seen_comment { &text[..ws_start] } else { "" };
      };

      match construct {
        Construct::Line => {
          pos += line_end(rest);
        }
        Construct::Block => {
          let Some((_, close)) = self.block else {
            return "";
          };
          let Some(close_at) = rest[open.len()..].find(close) else {
            return "";
          };
          pos += open.len() + close_at + close.len();

          // Rest of the line after the close token must be blank to continue.
          let after = &text[pos..];
          let line_rest = line_content(after);
          if !line_rest.trim().is_empty() {
            return &text[..pos];
          }
          pos += line_end(after);
        }
        Construct::Region => {
          let Some(len) = self.region_len(rest) else {
            return "";
          };
          pos += len;
        }
      }

      seen_comment = true;
    }
  }

  /// Like [`parse`](Self::parse), but rejects blocks that contain none of the
  /// given keywords. An absent or empty keyword set accepts every block.
  pub fn parse_with_keywords<'t>(&self, text: &'t str, keywords: Option<&[String]>) -> &'t str {
    let block = self.parse(text);
    if block.is_empty() || contains_keyword(block, keywords) {
      block
    } else {
      ""
    }
  }

  /// Picks the comment construct opening at the start of `rest`. The longest
  /// token wins; on equal length regions beat blocks beat line comments.
  fn match_opener(&self, rest: &str) -> Option<(Construct, &'a str)> {
    let candidates = [
      self.line.map(|token| (Construct::Line, token)),
      self.block.map(|(open, _)| (Construct::Block, open)),
      self.region.map(|(open, _)| (Construct::Region, open)),
    ];

    candidates
      .into_iter()
      .flatten()
      .filter(|(_, token)| !token.is_empty() && rest.starts_with(token))
      .max_by_key(|(construct, token)| (token.len(), *construct))
  }

  /// Length of the region starting at `rest`, through the line break of the
  /// matching close line. `None` if the region is never closed.
  fn region_len(&self, rest: &str) -> Option<usize> {
    let (open, close) = self.region?;
    let mut depth = 0usize;
    let mut pos = 0;

    while pos < rest.len() {
      let line_len = line_end(&rest[pos..]);
      let line = rest[pos..pos + line_len].trim_start();

      if line.starts_with(close) {
        depth = depth.saturating_sub(1);
        if depth == 0 {
          return Some(pos + line_len);
        }
      } else if line.starts_with(open) {
        depth += 1;
      }

      pos += line_len;
    }

    None
  }
}

/// Whether `block` contains at least one keyword, case-insensitively. An
/// absent or empty keyword set accepts every block.
pub fn contains_keyword(block: &str, keywords: Option<&[String]>) -> bool {
  let Some(keywords) = keywords.filter(|k| !k.is_empty()) else {
    return true;
  };

  let lowered = block.to_lowercase();
  keywords.iter().any(|keyword| lowered.contains(&keyword.to_lowercase()))
}

/// Strips one trailing empty line from a parsed header, if present.
///
/// The parser includes the first empty line after a comment block; rendered
/// headers may or may not carry it. Comparing both forms keeps already
/// headered files stable.
pub fn without_trailing_blank_line(header: &str) -> &str {
  if !ends_with_line_break(header) {
    return header;
  }

  let body = header
    .strip_suffix("\r\n")
    .or_else(|| header.strip_suffix('\n'))
    .or_else(|| header.strip_suffix('\r'))
    .unwrap_or(header);

  match body.rfind(['\n', '\r']) {
    Some(idx) if body[idx + 1..].trim().is_empty() => &header[..=idx],
    _ => header,
  }
}

/// Length of the first line of `text`, including its line break.
fn line_end(text: &str) -> usize {
  match text.find(['\n', '\r']) {
    Some(idx) => idx + line_break_len(&text[idx..]),
    None => text.len(),
  }
}

/// The first line of `text` without its line break.
fn line_content(text: &str) -> &str {
  match text.find(['\n', '\r']) {
    Some(idx) => &text[..idx],
    None => text,
  }
}
