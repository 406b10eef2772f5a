use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use licenseheader::diff::DiffManager;
use licenseheader::language::BuiltinResolver;
use licenseheader::processor::{Mode, ProcessResult, Processor, ProcessorConfig};
use licenseheader::report::FileAction;
use licenseheader::templates::TemplateManager;
use tempfile::tempdir;

mod common;

async fn create_test_processor(
  template_content: &str,
  mode: Mode,
  ignore_patterns: Vec<String>,
  diff_manager: DiffManager,
) -> Result<(Processor, tempfile::TempDir)> {
  let temp_dir = tempdir()?;
  let template_path = temp_dir.path().join("test_template.txt");
  fs::write(&template_path, template_content)?;

  let mut template_manager = TemplateManager::new();
  template_manager.load_template(&template_path).await?;

  let processor = Processor::new(ProcessorConfig {
    mode,
    keywords: Some(common::default_keywords()),
    year: Some("2025".to_string()),
    ignore_patterns,
    diff_manager,
    ..ProcessorConfig::new(template_manager, Box::new(BuiltinResolver), temp_dir.path().to_path_buf())
  })?;

  Ok((processor, temp_dir))
}

fn action_for(result: &ProcessResult, path: &Path) -> Option<FileAction> {
  result.reports.iter().find(|r| r.path == path).map(|r| r.action)
}

fn pattern(path: &Path) -> Vec<String> {
  vec![path.to_string_lossy().to_string()]
}

#[tokio::test]
async fn test_check_mode_never_writes() -> Result<()> {
  let (processor, temp_dir) = create_test_processor(
    "Copyright (c) {{year}} Test Company",
    Mode::Check,
    vec![],
    DiffManager::default(),
  )
  .await?;

  let missing = common::write_file(temp_dir.path(), "src/missing.rs", "fn main() {}\n")?;
  let outdated = common::write_file(
    temp_dir.path(),
    "src/outdated.rs",
    "// Copyright (c) 2020 Test Company\n\nfn main() {}\n",
  )?;
  let ok = common::write_file(
    temp_dir.path(),
    "src/ok.rs",
    "// Copyright (c) 2025 Test Company\n\nfn main() {}\n",
  )?;

  let result = processor.process(&pattern(&temp_dir.path().join("src"))).await?;

  assert_eq!(action_for(&result, &missing), Some(FileAction::Missing));
  assert_eq!(action_for(&result, &outdated), Some(FileAction::Outdated));
  assert_eq!(action_for(&result, &ok), Some(FileAction::Unchanged));

  assert_eq!(fs::read_to_string(&missing)?, "fn main() {}\n");
  assert_eq!(
    fs::read_to_string(&outdated)?,
    "// Copyright (c) 2020 Test Company\n\nfn main() {}\n"
  );

  Ok(())
}

#[tokio::test]
async fn test_modify_mode_reports_inserted_and_replaced() -> Result<()> {
  let (processor, temp_dir) = create_test_processor(
    "Copyright (c) {{year}} Test Company",
    Mode::Modify,
    vec![],
    DiffManager::default(),
  )
  .await?;

  let missing = common::write_file(temp_dir.path(), "src/missing.rs", "fn main() {}\n")?;
  let outdated = common::write_file(
    temp_dir.path(),
    "src/outdated.py",
    "# Copyright (c) 2020 Test Company\n\nprint('hi')\n",
  )?;

  let result = processor.process(&pattern(&temp_dir.path().join("src"))).await?;

  assert_eq!(action_for(&result, &missing), Some(FileAction::Inserted));
  assert_eq!(action_for(&result, &outdated), Some(FileAction::Replaced));
  assert_eq!(
    fs::read_to_string(&missing)?,
    "// Copyright (c) 2025 Test Company\n\nfn main() {}\n"
  );
  assert_eq!(
    fs::read_to_string(&outdated)?,
    "# Copyright (c) 2025 Test Company\n\nprint('hi')\n"
  );

  // Running again reports everything as unchanged
  let result = processor.process(&pattern(&temp_dir.path().join("src"))).await?;
  assert!(result.reports.iter().all(|r| r.action == FileAction::Unchanged));

  Ok(())
}

#[tokio::test]
async fn test_remove_mode_strips_headers() -> Result<()> {
  let (processor, temp_dir) =
    create_test_processor("Copyright (c) Test Company", Mode::Remove, vec![], DiffManager::default()).await?;

  let with_header = common::write_file(
    temp_dir.path(),
    "src/lib.rs",
    "// Copyright (c) 2020 Test Company\n\npub fn f() {}\n",
  )?;
  let without_header = common::write_file(temp_dir.path(), "src/main.rs", "fn main() {}\n")?;
  let plain_comment = common::write_file(temp_dir.path(), "src/note.rs", "// TODO: tidy up\nfn f() {}\n")?;

  let result = processor.process(&pattern(&temp_dir.path().join("src"))).await?;

  assert_eq!(action_for(&result, &with_header), Some(FileAction::Removed));
  assert_eq!(action_for(&result, &without_header), Some(FileAction::Unchanged));
  assert_eq!(action_for(&result, &plain_comment), Some(FileAction::Unchanged));
  assert_eq!(fs::read_to_string(&with_header)?, "pub fn f() {}\n");
  assert_eq!(fs::read_to_string(&plain_comment)?, "// TODO: tidy up\nfn f() {}\n");

  Ok(())
}

#[tokio::test]
async fn test_one_unreadable_file_does_not_stop_the_batch() -> Result<()> {
  let (processor, temp_dir) =
    create_test_processor("Copyright (c) Test Company", Mode::Modify, vec![], DiffManager::default()).await?;

  let good = common::write_file(temp_dir.path(), "src/good.rs", "fn main() {}\n")?;
  let binary = common::write_file(temp_dir.path(), "src/binary.rs", [0xffu8, 0xfe, 0x00, 0x80, 0x81])?;
  let gone = temp_dir.path().join("src/gone.rs");

  let result = processor
    .process_files(vec![good.clone(), binary.clone(), gone.clone()])
    .await;

  assert_eq!(action_for(&result, &good), Some(FileAction::Inserted));
  assert_eq!(action_for(&result, &binary), Some(FileAction::Failed));
  assert_eq!(action_for(&result, &gone), Some(FileAction::Failed));
  assert_eq!(fs::read(&binary)?, vec![0xffu8, 0xfe, 0x00, 0x80, 0x81]);

  let reason = result
    .reports
    .iter()
    .find(|r| r.path == binary)
    .and_then(|r| r.reason.clone())
    .unwrap_or_default();
  assert!(reason.starts_with("Failed to read file"), "unexpected reason: {reason}");

  Ok(())
}

#[tokio::test]
async fn test_ignore_patterns() -> Result<()> {
  let (processor, temp_dir) = create_test_processor(
    "Copyright (c) Test Company",
    Mode::Modify,
    vec!["vendor/**".to_string(), "*.py".to_string()],
    DiffManager::default(),
  )
  .await?;

  let kept = common::write_file(temp_dir.path(), "src/lib.rs", "pub fn f() {}\n")?;
  let vendored = common::write_file(temp_dir.path(), "vendor/dep.rs", "pub fn g() {}\n")?;
  let python = common::write_file(temp_dir.path(), "src/tool.py", "print('hi')\n")?;

  let result = processor.process(&pattern(temp_dir.path())).await?;

  assert_eq!(action_for(&result, &kept), Some(FileAction::Inserted));
  assert_eq!(action_for(&result, &vendored), None);
  assert_eq!(action_for(&result, &python), None);
  assert_eq!(fs::read_to_string(&vendored)?, "pub fn g() {}\n");

  Ok(())
}

#[tokio::test]
async fn test_results_are_sorted_by_path() -> Result<()> {
  let (processor, temp_dir) =
    create_test_processor("Copyright (c) Test Company", Mode::Check, vec![], DiffManager::default()).await?;

  for name in ["c.rs", "a.rs", "b/z.rs", "b/a.rs"] {
    common::write_file(temp_dir.path(), &format!("src/{name}"), "fn f() {}\n")?;
  }

  let result = processor.process(&pattern(&temp_dir.path().join("src"))).await?;
  let paths: Vec<PathBuf> = result.reports.iter().map(|r| r.path.clone()).collect();
  let mut sorted = paths.clone();
  sorted.sort();

  assert_eq!(paths.len(), 4);
  assert_eq!(paths, sorted);

  Ok(())
}

#[tokio::test]
async fn test_save_diff_in_check_mode() -> Result<()> {
  let diff_dir = tempdir()?;
  let diff_path = diff_dir.path().join("changes.diff");
  let (processor, temp_dir) = create_test_processor(
    "Copyright (c) Test Company",
    Mode::Check,
    vec![],
    DiffManager::new(false, Some(diff_path.clone())),
  )
  .await?;

  common::write_file(temp_dir.path(), "src/lib.rs", "pub fn f() {}\n")?;
  common::write_file(
    temp_dir.path(),
    "src/ok.rs",
    "// Copyright (c) Test Company\n\npub fn f() {}\n",
  )?;

  let result = processor.process(&pattern(&temp_dir.path().join("src"))).await?;
  assert_eq!(result.diffs.len(), 1);

  processor.diff_manager().emit(&result.diffs).await?;
  let saved = fs::read_to_string(&diff_path)?;
  assert!(saved.contains("lib.rs"));
  assert!(saved.contains("+// Copyright (c) Test Company"));
  assert!(!saved.contains("ok.rs"));

  Ok(())
}

#[tokio::test]
async fn test_definition_file_sections() -> Result<()> {
  let definition = "extensions: .rs\n// Copyright Rust Team\n\nextensions: .py\n# Copyright Python Team\n\nextensions: .generated.rs\n";
  let (processor, temp_dir) =
    create_test_processor(definition, Mode::Modify, vec![], DiffManager::default()).await?;

  let rust = common::write_file(temp_dir.path(), "src/lib.rs", "pub fn f() {}\n")?;
  let python = common::write_file(temp_dir.path(), "src/tool.py", "print('hi')\n")?;
  let generated = common::write_file(
    temp_dir.path(),
    "src/out.generated.rs",
    "// Copyright Rust Team\n\npub fn g() {}\n",
  )?;
  let css = common::write_file(temp_dir.path(), "src/site.css", "body {}\n")?;

  let result = processor.process(&pattern(&temp_dir.path().join("src"))).await?;

  assert_eq!(action_for(&result, &rust), Some(FileAction::Inserted));
  assert_eq!(action_for(&result, &python), Some(FileAction::Inserted));
  assert_eq!(action_for(&result, &generated), Some(FileAction::Removed));
  assert_eq!(action_for(&result, &css), Some(FileAction::Skipped));

  assert_eq!(fs::read_to_string(&rust)?, "// Copyright Rust Team\n\npub fn f() {}\n");
  assert_eq!(fs::read_to_string(&python)?, "# Copyright Python Team\n\nprint('hi')\n");
  assert_eq!(fs::read_to_string(&generated)?, "pub fn g() {}\n");

  Ok(())
}
