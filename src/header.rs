//! # Header Module
//!
//! Renders header templates into the final text that is enforced at the top
//! of a document.
//!
//! A template is an ordered list of raw lines plus a set of placeholder
//! substitutions ([`HeaderProperties`]). Rendering substitutes each line,
//! joins the lines with the document's own line ending and appends one
//! trailing line ending.

use std::path::Path;

use chrono::{DateTime, Local};
use tracing::trace;

use crate::line_ending::LineEnding;

/// The rendered header for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHeader {
  source_identifier: String,
  text: String,
  is_empty: bool,
}

impl DocumentHeader {
  /// Renders `lines` for the document identified by `source_identifier`.
  ///
  /// # Parameters
  ///
  /// * `source_identifier` - Path or display name of the document
  /// * `lines` - Template lines; `None` or no lines means "no header"
  /// * `properties` - Placeholder substitutions applied to every line
  /// * `ending` - Line ending used to join the lines
  ///
  /// # Returns
  ///
  /// The rendered header. An absent or empty template yields an empty header
  /// whose [`is_empty`](Self::is_empty) is `true`.
  pub fn render(
    source_identifier: impl Into<String>,
    lines: Option<&[String]>,
    properties: Option<&HeaderProperties>,
    ending: LineEnding,
  ) -> Self {
    let source_identifier = source_identifier.into();

    let Some(lines) = lines.filter(|lines| !lines.is_empty()) else {
      return Self {
        source_identifier,
        text: String::new(),
        is_empty: true,
      };
    };

    let rendered: Vec<String> = lines
      .iter()
      .map(|line| match properties {
        Some(props) => props.substitute(line),
        None => line.clone(),
      })
      .collect();

    let mut text = rendered.join(ending.as_str());
    text.push_str(ending.as_str());

    trace!("Rendered {} header line(s) for {}", lines.len(), source_identifier);

    Self {
      source_identifier,
      text,
      is_empty: false,
    }
  }

  pub fn source_identifier(&self) -> &str {
    &self.source_identifier
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  /// Whether no header should be enforced (every operation becomes removal).
  pub const fn is_empty(&self) -> bool {
    self.is_empty
  }
}

/// Ordered placeholder substitutions, token to value.
///
/// Tokens are literal strings such as `%CurrentYear%`. A token that has no
/// value is left verbatim in the rendered header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderProperties {
  entries: Vec<(String, String)>,
}

impl HeaderProperties {
  pub const fn new() -> Self {
    Self { entries: Vec::new() }
  }

  /// Sets `token` to `value`, replacing an earlier value for the same token.
  pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
    let token = token.into();
    let value = value.into();
    match self.entries.iter_mut().find(|(existing, _)| *existing == token) {
      Some(entry) => entry.1 = value,
      None => self.entries.push((token, value)),
    }
  }

  /// Sets a named property; `Company` becomes the token `%Company%`.
  pub fn insert_named(&mut self, name: &str, value: impl Into<String>) {
    self.insert(token_for(name), value);
  }

  pub fn get(&self, token: &str) -> Option<&str> {
    self
      .entries
      .iter()
      .find(|(existing, _)| existing == token)
      .map(|(_, value)| value.as_str())
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.entries.iter().map(|(token, value)| (token.as_str(), value.as_str()))
  }

  pub const fn len(&self) -> usize {
    self.entries.len()
  }

  pub const fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Replaces every known token in `line`.
  ///
  /// Substitution is a single left-to-right pass: inserted values are not
  /// scanned again. Where tokens overlap, the longest one wins.
  pub fn substitute(&self, line: &str) -> String {
    let mut substituted = String::with_capacity(line.len());
    let mut rest = line;

    while !rest.is_empty() {
      let matched = self
        .entries
        .iter()
        .filter(|(token, _)| !token.is_empty() && rest.starts_with(token.as_str()))
        .max_by_key(|(token, _)| token.len());

      let consumed = match matched {
        Some((token, value)) => {
          substituted.push_str(value);
          token.len()
        }
        None => {
          let next = rest.char_indices().nth(1).map_or(rest.len(), |(idx, _)| idx);
          substituted.push_str(&rest[..next]);
          next
        }
      };
      rest = &rest[consumed..];
    }

    substituted
  }

  /// Built-in properties that depend only on the time and the user.
  ///
  /// # Tokens
  ///
  /// - `%CurrentYear%` (`2025`), `%CurrentMonth%` (`03`), `%CurrentDay%` (`07`)
  /// - `%CurrentTime%` (`14:05:09`)
  /// - `%UserName%`, when `USER` or `USERNAME` is set
  pub fn builtin(now: DateTime<Local>) -> Self {
    let mut properties = Self::new();
    properties.insert("%CurrentYear%", now.format("%Y").to_string());
    properties.insert("%CurrentMonth%", now.format("%m").to_string());
    properties.insert("%CurrentDay%", now.format("%d").to_string());
    properties.insert("%CurrentTime%", now.format("%H:%M:%S").to_string());

    if let Some(user) = std::env::var("USER")
      .ok()
      .or_else(|| std::env::var("USERNAME").ok())
      .filter(|user| !user.is_empty())
    {
      properties.insert("%UserName%", user);
    }

    properties
  }

  /// Built-in properties for a file on disk: the time and user tokens of
  /// [`builtin`](Self::builtin) plus `%FullFileName%`, `%FileName%` and the
  /// `%Creation...%` tokens.
  ///
  /// The creation time falls back to the modification time on platforms that
  /// do not record it; if neither is available the creation tokens are left
  /// out.
  pub async fn for_path(path: &Path, now: DateTime<Local>) -> Self {
    let mut properties = Self::builtin(now);

    let full = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    properties.insert("%FullFileName%", full.display().to_string());
    if let Some(name) = path.file_name() {
      properties.insert("%FileName%", name.to_string_lossy().into_owned());
    }

    let created = tokio::fs::metadata(path)
      .await
      .ok()
      .and_then(|meta| meta.created().or_else(|_| meta.modified()).ok());

    if let Some(created) = created {
      let created: DateTime<Local> = created.into();
      properties.insert("%CreationYear%", created.format("%Y").to_string());
      properties.insert("%CreationMonth%", created.format("%m").to_string());
      properties.insert("%CreationDay%", created.format("%d").to_string());
      properties.insert("%CreationTime%", created.format("%H:%M:%S").to_string());
    }

    properties
  }

  /// Built-in properties for an in-memory document named `identifier`.
  pub fn for_content(identifier: &str, now: DateTime<Local>) -> Self {
    let mut properties = Self::builtin(now);
    if let Some(name) = Path::new(identifier).file_name() {
      properties.insert("%FileName%", name.to_string_lossy().into_owned());
    }
    properties
  }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for HeaderProperties {
  fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
    for (token, value) in iter {
      self.insert(token, value);
    }
  }
}

/// The placeholder token for a property name. Names that already carry the
/// `%` delimiters are kept as they are.
pub fn token_for(name: &str) -> String {
  if name.len() > 1 && name.starts_with('%') && name.ends_with('%') {
    name.to_string()
  } else {
    format!("%{name}%")
  }
}
