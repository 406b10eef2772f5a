//! # File I/O Module
//!
//! Reading and writing documents for the header engine. Every call opens,
//! uses and closes its own handle, so no file stays open between the read and
//! the write of one operation.

use std::io;
use std::path::Path;

use tracing::trace;

use crate::error::HeaderError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Text of a document as read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
  /// Content without the byte-order mark.
  pub text: String,
  /// Whether the file started with a UTF-8 byte-order mark.
  pub has_bom: bool,
}

/// Async file operations for the document engine.
pub struct FileIO;

impl FileIO {
  /// Reads a whole file as UTF-8.
  ///
  /// # Parameters
  ///
  /// * `path` - Path to the file to read
  ///
  /// # Returns
  ///
  /// The content with a leading byte-order mark stripped, and whether one was
  /// present.
  ///
  /// # Errors
  ///
  /// [`HeaderError::Read`] if the file cannot be read or is not valid UTF-8.
  pub async fn read_text(path: &Path) -> Result<SourceText, HeaderError> {
    let read_error = |source| HeaderError::Read {
      path: path.to_path_buf(),
      source,
    };

    let mut bytes = tokio::fs::read(path).await.map_err(read_error)?;
    let has_bom = bytes.starts_with(UTF8_BOM);
    if has_bom {
      bytes.drain(..UTF8_BOM.len());
    }

    let text = String::from_utf8(bytes).map_err(|e| read_error(io::Error::new(io::ErrorKind::InvalidData, e)))?;
    trace!("Read {} bytes from {}", text.len(), path.display());

    Ok(SourceText { text, has_bom })
  }

  /// Overwrites a file with `text`, prefixing a byte-order mark when `bom` is
  /// set.
  ///
  /// # Errors
  ///
  /// [`HeaderError::Write`] if the file cannot be written.
  pub async fn write_text(path: &Path, text: &str, bom: bool) -> Result<(), HeaderError> {
    let mut bytes = Vec::with_capacity(text.len() + UTF8_BOM.len());
    if bom {
      bytes.extend_from_slice(UTF8_BOM);
    }
    bytes.extend_from_slice(text.as_bytes());

    tokio::fs::write(path, bytes).await.map_err(|source| HeaderError::Write {
      path: path.to_path_buf(),
      source,
    })?;
    trace!("Wrote {} bytes to {}", text.len(), path.display());

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_bom_is_stripped_and_restored() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bom.cs");
    tokio::fs::write(&path, b"\xEF\xBB\xBFclass C {}\n").await.expect("write");

    let source = FileIO::read_text(&path).await.expect("read");
    assert!(source.has_bom);
    assert_eq!(source.text, "class C {}\n");

    FileIO::write_text(&path, "// h\nclass C {}\n", source.has_bom)
      .await
      .expect("write");
    let bytes = tokio::fs::read(&path).await.expect("read back");
    assert_eq!(bytes, b"\xEF\xBB\xBF// h\nclass C {}\n");
  }

  #[tokio::test]
  async fn test_invalid_utf8_is_a_read_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("binary.rs");
    tokio::fs::write(&path, [0xff, 0xfe, 0x00]).await.expect("write");

    let err = FileIO::read_text(&path).await.expect_err("invalid utf-8");
    assert!(matches!(err, HeaderError::Read { .. }));
  }

  #[tokio::test]
  async fn test_missing_file_is_a_read_error() {
    let err = FileIO::read_text(Path::new("/definitely/not/here.rs"))
      .await
      .expect_err("missing");
    assert!(matches!(err, HeaderError::Read { .. }));
  }
}
