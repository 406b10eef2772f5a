use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use tempfile::tempdir;

mod common;

const HEADER: &str = "// Copyright (c) Test\n\n";

fn licenseheader(dir: &Path) -> Result<Command> {
  let mut cmd = Command::cargo_bin("licenseheader")?;
  cmd.current_dir(dir).env_remove("LICENSEHEADER_CONFIG").env_remove("RUST_LOG");
  Ok(cmd)
}

fn has_header(path: &Path) -> Result<bool> {
  Ok(fs::read_to_string(path)?.starts_with(HEADER))
}

/// A tree with code at the top level and under vendor/.
fn setup(dir: &Path) -> Result<()> {
  common::write_file(dir, "LICENSE.txt", "Copyright (c) Test\n")?;
  common::write_file(dir, "src/main.rs", "fn main() {}\n")?;
  common::write_file(dir, "src/app.js", "run();\n")?;
  common::write_file(dir, "vendor/lib.rs", "fn lib() {}\n")?;
  common::write_file(dir, "vendor/nested/deep.rs", "fn deep() {}\n")?;
  Ok(())
}

#[test]
fn test_cli_ignore_patterns() -> Result<()> {
  let cases: &[(&[&str], &[&str], &[&str])] = &[
    (&["*.js"], &["src/main.rs", "vendor/lib.rs"], &["src/app.js"]),
    (&["vendor/"], &["src/main.rs", "src/app.js"], &["vendor/lib.rs", "vendor/nested/deep.rs"]),
    (&["vendor/**"], &["src/main.rs"], &["vendor/lib.rs", "vendor/nested/deep.rs"]),
    (
      &["*.js", "vendor/**"],
      &["src/main.rs"],
      &["src/app.js", "vendor/lib.rs", "vendor/nested/deep.rs"],
    ),
  ];

  for (patterns, changed, untouched) in cases {
    let temp_dir = tempdir()?;
    setup(temp_dir.path())?;

    let mut cmd = licenseheader(temp_dir.path())?;
    cmd.args(["--modify", "--license-file", "LICENSE.txt"]);
    for pattern in *patterns {
      cmd.args(["--ignore", *pattern]);
    }
    cmd.arg(".").assert().success();

    for file in *changed {
      assert!(has_header(&temp_dir.path().join(file))?, "{file} should change for {patterns:?}");
    }
    for file in *untouched {
      assert!(!has_header(&temp_dir.path().join(file))?, "{file} should be ignored for {patterns:?}");
    }
  }

  Ok(())
}

#[test]
fn test_licenseignore_file() -> Result<()> {
  let temp_dir = tempdir()?;
  setup(temp_dir.path())?;
  common::write_file(temp_dir.path(), ".licenseignore", "# third-party code\nvendor/\n*.js\n")?;

  licenseheader(temp_dir.path())?
    .args(["--modify", "--license-file", "LICENSE.txt", "."])
    .assert()
    .success();

  assert!(has_header(&temp_dir.path().join("src/main.rs"))?);
  assert!(!has_header(&temp_dir.path().join("src/app.js"))?);
  assert!(!has_header(&temp_dir.path().join("vendor/lib.rs"))?);
  assert!(!has_header(&temp_dir.path().join("vendor/nested/deep.rs"))?);
  Ok(())
}

#[test]
fn test_nested_licenseignore_applies_to_its_directory() -> Result<()> {
  let temp_dir = tempdir()?;
  setup(temp_dir.path())?;
  common::write_file(temp_dir.path(), "vendor/.licenseignore", "nested/\n")?;

  licenseheader(temp_dir.path())?
    .args(["--modify", "--license-file", "LICENSE.txt", "."])
    .assert()
    .success();

  assert!(has_header(&temp_dir.path().join("vendor/lib.rs"))?);
  assert!(!has_header(&temp_dir.path().join("vendor/nested/deep.rs"))?);
  Ok(())
}

#[test]
fn test_gitignore_is_respected_without_a_repository() -> Result<()> {
  let temp_dir = tempdir()?;
  setup(temp_dir.path())?;
  common::write_file(temp_dir.path(), ".gitignore", "vendor/\n")?;

  licenseheader(temp_dir.path())?
    .args(["--modify", "--license-file", "LICENSE.txt", "."])
    .assert()
    .success();

  assert!(has_header(&temp_dir.path().join("src/main.rs"))?);
  assert!(!has_header(&temp_dir.path().join("vendor/lib.rs"))?);
  Ok(())
}

#[test]
fn test_ignored_explicit_file_is_not_processed() -> Result<()> {
  let temp_dir = tempdir()?;
  setup(temp_dir.path())?;

  licenseheader(temp_dir.path())?
    .args(["--modify", "--ignore", "vendor/**", "--license-file", "LICENSE.txt", "vendor/lib.rs"])
    .assert()
    .success();

  assert!(!has_header(&temp_dir.path().join("vendor/lib.rs"))?);
  Ok(())
}
