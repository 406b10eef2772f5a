//! # Check Command
//!
//! This module implements the check/modify/remove command for license
//! headers. This is the default command when no subcommand is specified.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{Config, DEFAULT_KEYWORDS, load_config};
use crate::diff::DiffManager;
use crate::header::HeaderProperties;
use crate::info_log;
use crate::language::create_resolver;
use crate::logging::{ColorMode, init_tracing, set_quiet, set_verbose};
use crate::output::{
  CategorizedReports, print_all_files_ok, print_blank_line, print_failed_files, print_hint, print_inserted_files,
  print_missing_files, print_outdated_files, print_removed_files, print_replaced_files, print_skipped_files,
  print_start_message, print_summary,
};
use crate::processor::{Mode, Processor, ProcessorConfig};
use crate::report::{FileReport, ProcessingSummary, ReportFormat, ReportGenerator};
use crate::templates::TemplateManager;

/// Arguments for the check command
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
  /// File or directory patterns to process. Directories are processed
  /// recursively.
  #[arg(required = false)]
  pub patterns: Vec<String>,

  /// Path to config file (default: .licenseheader.toml in the current
  /// directory)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Ignore config file even if present
  #[arg(long)]
  pub no_config: bool,

  /// Modify mode: insert or replace license headers in files
  #[arg(
    long,
    group = "mode",
    help = "Modify mode: insert or replace license headers in files

[default: check only]"
  )]
  pub modify: bool,

  /// Remove mode: strip existing license headers from files
  #[arg(long, group = "mode")]
  pub remove: bool,

  /// Show diff of changes in check mode
  #[arg(long)]
  pub show_diff: bool,

  /// Save diff of changes to a file in check mode
  #[arg(long, short = 'o', value_name = "FILE")]
  pub save_diff: Option<PathBuf>,

  /// Header definition (.licenseheader) or plain license text
  #[arg(long, short = 'f', required = false, value_name = "FILE")]
  pub license_file: Option<PathBuf>,

  /// File patterns to ignore (supports glob patterns)
  #[arg(long, short = 'i')]
  pub ignore: Vec<String>,

  /// Word an existing comment must contain to count as a header (repeatable)
  #[arg(long, short = 'k', value_name = "WORD", conflicts_with = "no_keywords")]
  pub keyword: Vec<String>,

  /// Accept any leading comment as the existing header
  #[arg(long)]
  pub no_keywords: bool,

  /// Extra placeholder value (repeatable, format: KEY=VALUE fills %KEY%)
  #[arg(long, short = 'p', value_name = "KEY=VALUE")]
  pub property: Vec<String>,

  /// Copyright year, overrides %CurrentYear%
  #[arg(long)]
  pub year: Option<String>,

  /// Number of files to process concurrently (default: number of CPUs)
  #[arg(long, short = 'j', value_name = "N")]
  pub jobs: Option<usize>,

  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Control when to use colored output (auto, never, always)
  #[arg(
    long,
    value_name = "WHEN",
    num_args = 0..=1,
    default_value_t = ColorMode::Auto,
    default_missing_value = "always",
    value_enum
  )]
  pub colors: ColorMode,

  /// Generate a JSON report of header status and save to the specified path
  #[arg(long, value_name = "OUTPUT")]
  pub report_json: Option<PathBuf>,

  /// Generate a CSV report of header status and save to the specified path
  #[arg(long, value_name = "OUTPUT")]
  pub report_csv: Option<PathBuf>,
}

impl CheckArgs {
  /// Validate the arguments and return an error if invalid
  fn validate(&self) -> Result<(), String> {
    if self.patterns.is_empty() {
      return Err("Missing required argument: <PATTERNS>...".to_string());
    }
    if self.jobs == Some(0) {
      return Err("--jobs must be at least 1".to_string());
    }
    Ok(())
  }

  const fn mode(&self) -> Mode {
    if self.remove {
      Mode::Remove
    } else if self.modify {
      Mode::Modify
    } else {
      Mode::Check
    }
  }
}

/// Run the check command with the given arguments
///
/// # Returns
///
/// [`ExitCode::FAILURE`] when check mode finds missing or outdated headers, or
/// when any file could not be processed.
pub async fn run_check(args: CheckArgs) -> Result<ExitCode> {
  if let Err(e) = args.validate() {
    eprintln!("ERROR: {e}");
    return Ok(ExitCode::FAILURE);
  }

  // Initialize tracing subscriber for structured logging
  init_tracing(args.quiet, args.verbose);

  // Set verbose mode for output formatting and info_log! macro
  if args.verbose > 0 {
    set_verbose();
  } else if args.quiet {
    set_quiet();
  }
  args.colors.apply();

  let mode = args.mode();
  let workspace_root = std::env::current_dir().context("Failed to get current directory")?;
  debug!("Using workspace root: {}", workspace_root.display());

  let config = load_config(args.config.as_deref(), &workspace_root, args.no_config)?;
  let resolver = create_resolver(config.as_ref()).context("Failed to build language definitions")?;

  let mut template_manager = TemplateManager::new();
  if mode != Mode::Remove {
    let license_file = resolve_license_file(args.license_file.as_deref(), config.as_ref())?;
    template_manager
      .load_template(&license_file)
      .await
      .with_context(|| format!("Failed to load license template from {}", license_file.display()))?;
  }

  let keywords = resolve_keywords(&args, config.as_ref());
  let properties = resolve_properties(&args.property, config.as_ref())?;

  let cancel = CancellationToken::new();
  spawn_interrupt_handler(cancel.clone());

  let processor = Processor::new(ProcessorConfig {
    mode,
    keywords,
    properties,
    year: args.year.clone(),
    jobs: args.jobs.unwrap_or_else(num_cpus::get),
    ignore_patterns: args.ignore.clone(),
    diff_manager: DiffManager::new(args.show_diff, args.save_diff.clone()),
    cancel,
    ..ProcessorConfig::new(template_manager, resolver, workspace_root.clone())
  })?;

  let files = processor.collect_files(&args.patterns)?;
  print_start_message(files.len(), mode.writes());

  if files.is_empty() {
    print_blank_line();
    print_all_files_ok();
    return Ok(ExitCode::SUCCESS);
  }

  let start_time = Instant::now();
  let result = processor.process_files(files).await;
  let elapsed = start_time.elapsed();

  if mode == Mode::Check {
    processor.diff_manager().emit(&result.diffs).await?;
  }

  let summary = ProcessingSummary::from_reports(&result.reports, elapsed);
  let categorized = CategorizedReports::from_reports(&result.reports);

  print_results(mode, &categorized, &workspace_root);

  for extension in &result.invalid_extensions {
    eprintln!("ERROR: the header definition for {extension} files is not a valid comment in that language");
  }

  print_blank_line();
  print_summary(&summary);

  let has_missing = !categorized.missing.is_empty();
  let has_outdated = !categorized.outdated.is_empty();
  if mode == Mode::Check && (has_missing || has_outdated) {
    print_blank_line();
    let hint = if has_missing && has_outdated {
      "Run with --modify to add missing headers and replace outdated ones."
    } else if has_missing {
      "Run with --modify to add missing headers."
    } else {
      "Run with --modify to replace outdated headers."
    };
    print_hint(hint);
  }

  write_reports(&args, &result.reports, &summary).await;

  let failed = summary.failed > 0 || summary.invalid_header > 0 || summary.cancelled > 0;
  if failed || (mode == Mode::Check && (has_missing || has_outdated)) {
    return Ok(ExitCode::FAILURE);
  }

  Ok(ExitCode::SUCCESS)
}

fn print_results(mode: Mode, categorized: &CategorizedReports<'_>, workspace_root: &Path) {
  print_blank_line();
  print_skipped_files(&categorized.skipped, Some(workspace_root));
  print_failed_files(&categorized.failed, Some(workspace_root));

  match mode {
    Mode::Check => {
      if categorized.all_ok() {
        print_all_files_ok();
        return;
      }
      print_missing_files(&categorized.missing, Some(workspace_root));
      if !categorized.missing.is_empty() && !categorized.outdated.is_empty() {
        print_blank_line();
      }
      print_outdated_files(&categorized.outdated, Some(workspace_root));
    }
    Mode::Modify | Mode::Remove => {
      print_inserted_files(&categorized.inserted, Some(workspace_root));
      print_replaced_files(&categorized.replaced, Some(workspace_root));
      print_removed_files(&categorized.removed, Some(workspace_root));

      let changed = categorized.inserted.len() + categorized.replaced.len() + categorized.removed.len();
      if changed == 0 && categorized.failed.is_empty() {
        print_all_files_ok();
      }
    }
  }
}

async fn write_reports(args: &CheckArgs, reports: &[FileReport], summary: &ProcessingSummary) {
  let requested = [
    (ReportFormat::Json, args.report_json.as_deref()),
    (ReportFormat::Csv, args.report_csv.as_deref()),
  ];

  for (format, path) in requested {
    let Some(path) = path else { continue };
    match ReportGenerator::new(format, path).generate(reports, summary).await {
      Ok(()) => info_log!("Generated {} report at {}", format, path.display()),
      Err(e) => eprintln!("Error generating {format} report: {e:#}"),
    }
  }
}

/// Cancels `cancel` on Ctrl-C. Files already being written are finished.
fn spawn_interrupt_handler(cancel: CancellationToken) {
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      warn!("Interrupted, stopping before the next file is changed");
      cancel.cancel();
    }
  });
}

/// The header definition to load: `--license-file`, then the config's
/// `license-file`.
fn resolve_license_file(cli: Option<&Path>, config: Option<&Config>) -> Result<PathBuf> {
  if let Some(path) = cli {
    return Ok(path.to_path_buf());
  }
  match config.and_then(|c| c.license_file.clone()) {
    Some(path) => Ok(path),
    None => bail!("Missing required argument: --license-file <FILE> (or license-file in the config file)"),
  }
}

/// `--no-keywords` disables the filter, `-k` replaces the configured keywords,
/// otherwise the config (or the built-in list) applies.
fn resolve_keywords(args: &CheckArgs, config: Option<&Config>) -> Option<Vec<String>> {
  if args.no_keywords {
    return None;
  }
  if !args.keyword.is_empty() {
    return Some(args.keyword.clone());
  }
  match config {
    Some(config) => config.effective_keywords(),
    None => Some(DEFAULT_KEYWORDS.iter().map(|k| (*k).to_string()).collect()),
  }
}

/// Config properties first, then `-p KEY=VALUE` pairs on top.
fn resolve_properties(cli: &[String], config: Option<&Config>) -> Result<HeaderProperties> {
  let mut properties = HeaderProperties::new();

  if let Some(config) = config {
    for (name, value) in &config.properties {
      properties.insert_named(name, value.as_str());
    }
  }

  for pair in cli {
    let Some((name, value)) = pair.split_once('=') else {
      bail!("Invalid property '{pair}': expected KEY=VALUE");
    };
    let name = name.trim();
    if name.is_empty() {
      bail!("Invalid property '{pair}': the key is empty");
    }
    properties.insert_named(name, value);
  }

  Ok(properties)
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use super::*;

  #[test]
  fn test_resolve_properties_cli_overrides_config() {
    let config = Config {
      properties: BTreeMap::from([
        ("Company".to_string(), "Config Corp".to_string()),
        ("Team".to_string(), "Core".to_string()),
      ]),
      ..Config::default()
    };

    let properties = resolve_properties(&["Company=Acme=Inc".to_string()], Some(&config)).expect("properties");

    assert_eq!(properties.get("%Company%"), Some("Acme=Inc"));
    assert_eq!(properties.get("%Team%"), Some("Core"));
  }

  #[test]
  fn test_resolve_properties_rejects_malformed_pairs() {
    assert!(resolve_properties(&["Company".to_string()], None).is_err());
    assert!(resolve_properties(&["=Acme".to_string()], None).is_err());
  }

  #[test]
  fn test_resolve_keywords() {
    let mut args = CheckArgs::default();
    assert_eq!(resolve_keywords(&args, None).map(|k| k.len()), Some(DEFAULT_KEYWORDS.len()));

    let config = Config {
      requires_keywords: false,
      ..Config::default()
    };
    assert_eq!(resolve_keywords(&args, Some(&config)), None);

    args.keyword = vec!["spdx".to_string()];
    assert_eq!(resolve_keywords(&args, Some(&config)), Some(vec!["spdx".to_string()]));

    args.no_keywords = true;
    assert_eq!(resolve_keywords(&args, None), None);
  }

  #[test]
  fn test_resolve_license_file() {
    let config = Config {
      license_file: Some(PathBuf::from("/repo/.licenseheader")),
      ..Config::default()
    };

    assert_eq!(
      resolve_license_file(Some(Path::new("LICENSE")), Some(&config)).expect("path"),
      PathBuf::from("LICENSE")
    );
    assert_eq!(
      resolve_license_file(None, Some(&config)).expect("path"),
      PathBuf::from("/repo/.licenseheader")
    );
    assert!(resolve_license_file(None, None).is_err());
  }

  #[test]
  fn test_mode_selection() {
    let mut args = CheckArgs::default();
    assert_eq!(args.mode(), Mode::Check);
    args.modify = true;
    assert_eq!(args.mode(), Mode::Modify);
    args.modify = false;
    args.remove = true;
    assert_eq!(args.mode(), Mode::Remove);
  }
}
