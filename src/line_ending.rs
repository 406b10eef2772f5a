//! # Line Ending Module
//!
//! Detects the dominant end-of-line sequence of a document so that inserted
//! headers follow the file's own convention.

use std::fmt;

/// An end-of-line sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineEnding {
  /// Unix: `\n`. Also the fallback for text without any line break.
  #[default]
  Lf,
  /// Windows: `\r\n`
  Crlf,
  /// Classic Mac: `\r`
  Cr,
}

impl LineEnding {
  /// The literal sequence.
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Lf => "\n",
      Self::Crlf => "\r\n",
      Self::Cr => "\r",
    }
  }

  /// Returns the line ending that occurs most often in `text`.
  ///
  /// A `\r\n` pair counts once, as CRLF. When two styles occur equally often
  /// the one encountered first in the text wins. Text without any line break
  /// yields [`LineEnding::Lf`].
  pub fn detect(text: &str) -> Self {
    Self::detect_opt(text).unwrap_or_default()
  }

  /// Like [`detect`](Self::detect), but returns `None` for text without any
  /// line break.
  pub fn detect_opt(text: &str) -> Option<Self> {
    // (count, first offset) per style, indexed Lf, Crlf, Cr
    let mut stats: [(usize, usize); 3] = [(0, usize::MAX); 3];

    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
      let found = match bytes[i] {
        b'\r' if bytes.get(i + 1) == Some(&b'\n') => Some((1, 2)),
        b'\r' => Some((2, 1)),
        b'\n' => Some((0, 1)),
        _ => None,
      };

      match found {
        Some((slot, width)) => {
          let entry = &mut stats[slot];
          if entry.0 == 0 {
            entry.1 = i;
          }
          entry.0 += 1;
          i += width;
        }
        None => i += 1,
      }
    }

    let styles = [Self::Lf, Self::Crlf, Self::Cr];
    styles
      .into_iter()
      .zip(stats)
      .filter(|(_, (count, _))| *count > 0)
      .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
        // Higher count wins, then the earlier first occurrence.
        count_a.cmp(count_b).then(first_b.cmp(first_a))
      })
      .map(|(style, _)| style)
  }
}

impl fmt::Display for LineEnding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::Lf => "LF",
      Self::Crlf => "CRLF",
      Self::Cr => "CR",
    };
    f.write_str(name)
  }
}

/// Whether `text` ends with any line break.
pub fn ends_with_line_break(text: &str) -> bool {
  text.ends_with('\n') || text.ends_with('\r')
}

/// Length in bytes of the line break at the start of `text`, if any.
pub fn line_break_len(text: &str) -> usize {
  if text.starts_with("\r\n") {
    2
  } else if text.starts_with('\n') || text.starts_with('\r') {
    1
  } else {
    0
  }
}
