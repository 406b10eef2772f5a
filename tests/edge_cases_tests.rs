use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use licenseheader::document::{Document, DocumentInput, HeaderOutcome};
use licenseheader::header::HeaderProperties;
use licenseheader::language::{BuiltinResolver, Language, LanguageResolver};
use licenseheader::processor::FileCollector;
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;

mod common;

use common::{default_keywords, rewrite_content};

#[tokio::test]
async fn test_empty_file() -> Result<()> {
  let rewritten = rewrite_content("", "empty.rs", &["// Copyright (c) Acme", ""], None).await?;
  assert_eq!(rewritten, "// Copyright (c) Acme\n\n");

  let removed = rewrite_content("", "empty.rs", &[], None).await?;
  assert_eq!(removed, "");
  Ok(())
}

#[tokio::test]
async fn test_whitespace_only_file() -> Result<()> {
  let rewritten = rewrite_content("\n\n", "blank.rs", &["// Copyright (c) Acme"], None).await?;
  assert_eq!(rewritten, "// Copyright (c) Acme\n\n\n\n");

  let removed = rewrite_content(&rewritten, "blank.rs", &[], None).await?;
  assert_eq!(removed, "\n\n");
  Ok(())
}

#[tokio::test]
async fn test_header_without_trailing_blank_line_is_stable() -> Result<()> {
  // The template has no blank line but the file already separates the header
  // from the code with one.
  let original = "// Copyright (c) Acme\n\nfn main() {}\n";
  let rewritten = rewrite_content(original, "main.rs", &["// Copyright (c) Acme"], None).await?;
  assert_eq!(rewritten, original);
  Ok(())
}

#[tokio::test]
async fn test_multiple_blank_lines_after_header() -> Result<()> {
  let original = "// Copyright Old\n\n\n\nfn main() {}\n";
  let rewritten = rewrite_content(
    original,
    "main.rs",
    &["// Copyright (c) Acme", ""],
    Some(default_keywords()),
  )
  .await?;
  // Only the first empty line belongs to the old header.
  assert_eq!(rewritten, "// Copyright (c) Acme\n\n\n\nfn main() {}\n");
  Ok(())
}

#[tokio::test]
async fn test_block_comment_followed_by_code_on_same_line() -> Result<()> {
  let original = "/* Copyright Old */ int x;\n";
  let rewritten = rewrite_content(original, "main.c", &["// Copyright (c) Acme"], Some(default_keywords())).await?;
  assert_eq!(rewritten, "// Copyright (c) Acme\n int x;\n");
  Ok(())
}

#[tokio::test]
async fn test_nested_regions() -> Result<()> {
  let original = "#region License\n#region Inner\n// text\n#endregion\n#endregion\nusing System;\n";
  let rewritten = rewrite_content(original, "Program.cs", &["// Copyright (c) Acme", ""], None).await?;
  assert_eq!(rewritten, "// Copyright (c) Acme\n\nusing System;\n");
  Ok(())
}

#[tokio::test]
async fn test_unterminated_region_is_not_a_header() -> Result<()> {
  let original = "#region License\n// text\nusing System;\n";
  let rewritten = rewrite_content(original, "Program.cs", &["// Copyright (c) Acme", ""], None).await?;
  assert_eq!(rewritten, format!("// Copyright (c) Acme\n\n{original}"));
  Ok(())
}

#[tokio::test]
async fn test_rust_inner_attribute_is_not_a_shebang() -> Result<()> {
  let original = "#![allow(dead_code)]\nfn main() {}\n";
  let rewritten = rewrite_content(original, "main.rs", &["// Copyright (c) Acme", ""], None).await?;
  assert_eq!(rewritten, format!("// Copyright (c) Acme\n\n{original}"));
  Ok(())
}

#[tokio::test]
async fn test_dockerfile_parser_directive_stays_first() -> Result<()> {
  let original = "# syntax=docker/dockerfile:1\nFROM alpine\n";
  let rewritten = rewrite_content(original, "Dockerfile", &["# Copyright (c) Acme", ""], None).await?;
  assert_eq!(rewritten, "# syntax=docker/dockerfile:1\n# Copyright (c) Acme\n\nFROM alpine\n");
  Ok(())
}

#[tokio::test]
async fn test_unknown_placeholder_is_left_verbatim() -> Result<()> {
  let mut properties = HeaderProperties::new();
  properties.insert_named("Company", "Acme");

  let mut document = Document::new(
    DocumentInput::content("fn main() {}\n", "main.rs"),
    BuiltinResolver.resolve(Path::new("main.rs")).expect("rust"),
    Some(common::lines(&["// Copyright %Company% %Division%", ""])),
    Some(properties),
    None,
  );

  let text = document
    .replace_header_if_necessary_content(&CancellationToken::new())
    .await?;
  assert_eq!(text, "// Copyright Acme %Division%\n\nfn main() {}\n");
  Ok(())
}

#[tokio::test]
async fn test_custom_language_with_long_tokens() -> Result<()> {
  let language = Arc::new(
    Language::builder("Custom")
      .extensions(["cst"])
      .line_comment("--")
      .block_comment("--[[", "]]")
      .build()?,
  );

  let mut document = Document::new(
    DocumentInput::content("--[[\nCopyright Old\n]]\nprint(1)\n", "x.cst"),
    language,
    Some(common::lines(&["-- Copyright New"])),
    None,
    None,
  );

  let change = document.preview().await?;
  assert_eq!(change.outcome, HeaderOutcome::Replaced);
  assert_eq!(change.updated, "-- Copyright New\nprint(1)\n");
  Ok(())
}

#[test]
fn test_invalid_glob_pattern() -> Result<()> {
  let temp_dir = tempdir()?;
  let collector = FileCollector::new(temp_dir.path().to_path_buf(), &[])?;
  assert!(collector.collect(&["src/[".to_string()]).is_err());
  Ok(())
}

#[test]
fn test_nonexistent_path_collects_nothing() -> Result<()> {
  let temp_dir = tempdir()?;
  let collector = FileCollector::new(temp_dir.path().to_path_buf(), &[])?;
  let missing = temp_dir.path().join("does/not/exist");
  assert!(collector.collect(&[missing.to_string_lossy().to_string()])?.is_empty());
  Ok(())
}

#[test]
fn test_symlinks_are_not_followed() -> Result<()> {
  let temp_dir = tempdir()?;
  let target = common::write_file(temp_dir.path(), "real/lib.rs", "fn f() {}\n")?;

  #[cfg(unix)]
  {
    std::os::unix::fs::symlink(temp_dir.path().join("real"), temp_dir.path().join("link"))?;
    let collector = FileCollector::new(temp_dir.path().to_path_buf(), &[])?;
    let files = collector.collect(&[temp_dir.path().to_string_lossy().to_string()])?;
    assert_eq!(files, vec![target.clone()]);
  }

  assert_eq!(fs::read_to_string(&target)?, "fn f() {}\n");
  Ok(())
}
