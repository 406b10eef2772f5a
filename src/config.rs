//! # Configuration Module
//!
//! This module provides configuration support for licenseheader: header
//! keywords, user-defined placeholder properties and extra or overriding
//! language definitions.
//!
//! Configuration can be specified in a `.licenseheader.toml` file or via the
//! `LICENSEHEADER_CONFIG` environment variable.
//!
//! ```toml
//! keywords = ["license", "copyright"]
//! requires-keywords = true
//! license-file = ".licenseheader"
//!
//! [properties]
//! Company = "Acme Corp"
//!
//! [[languages]]
//! extensions = ["xyz"]
//! line-comment = "##"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::HeaderError;
use crate::language::Language;
use crate::verbose_log;

/// The default config file name.
pub const DEFAULT_CONFIG_FILENAME: &str = ".licenseheader.toml";

/// Environment variable for specifying config file path.
pub const CONFIG_ENV_VAR: &str = "LICENSEHEADER_CONFIG";

/// Keywords used when the config does not name any.
pub const DEFAULT_KEYWORDS: &[&str] = &["license", "copyright", "(c)", "©"];

/// A language definition from the config file.
///
/// Entries override the built-in language table for the extensions and file
/// names they list.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LanguageConfig {
  /// Display name; defaults to the first extension.
  #[serde(default)]
  pub name: Option<String>,

  /// File extensions without the leading dot (e.g. "java", "xyz").
  #[serde(default)]
  pub extensions: Vec<String>,

  /// Exact file names (e.g. "Justfile").
  #[serde(default)]
  pub file_names: Vec<String>,

  #[serde(default)]
  pub line_comment: Option<String>,

  #[serde(default)]
  pub block_comment_start: Option<String>,

  #[serde(default)]
  pub block_comment_end: Option<String>,

  #[serde(default)]
  pub region_start: Option<String>,

  #[serde(default)]
  pub region_end: Option<String>,

  /// Regular expression for leading text that stays above the header.
  #[serde(default)]
  pub skip_expression: Option<String>,
}

impl LanguageConfig {
  /// A name for messages: the configured name, else the first extension or
  /// file name.
  pub fn display_name(&self) -> String {
    self
      .name
      .clone()
      .or_else(|| self.extensions.first().map(|ext| format!(".{ext}")))
      .or_else(|| self.file_names.first().cloned())
      .unwrap_or_else(|| "<unnamed>".to_string())
  }

  /// Builds the language descriptor.
  ///
  /// # Errors
  ///
  /// Returns an error if the entry defines no comment syntax or its skip
  /// expression does not compile.
  pub fn to_language(&self) -> Result<Language, HeaderError> {
    let mut builder = Language::builder(self.display_name())
      .extensions(&self.extensions)
      .file_names(&self.file_names);

    if let Some(token) = &self.line_comment {
      builder = builder.line_comment(token.as_str());
    }
    if let (Some(open), Some(close)) = (&self.block_comment_start, &self.block_comment_end) {
      builder = builder.block_comment(open.as_str(), close.as_str());
    }
    if let (Some(open), Some(close)) = (&self.region_start, &self.region_end) {
      builder = builder.region(open.as_str(), close.as_str());
    }
    if let Some(expression) = &self.skip_expression {
      builder = builder.skip_expression(expression.as_str());
    }

    builder.build()
  }
}

/// Main configuration struct for licenseheader.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
  /// Words an existing comment must contain to count as a header.
  #[serde(default)]
  pub keywords: Option<Vec<String>>,

  /// When false, any leading comment counts as the header.
  #[serde(default = "default_requires_keywords")]
  pub requires_keywords: bool,

  /// Header definition or plain license text, relative to the config file.
  #[serde(default)]
  pub license_file: Option<PathBuf>,

  /// User-defined placeholders; `Company = "Acme"` fills `%Company%`.
  #[serde(default)]
  pub properties: BTreeMap<String, String>,

  /// Extra or overriding language definitions.
  #[serde(default)]
  pub languages: Vec<LanguageConfig>,
}

const fn default_requires_keywords() -> bool {
  true
}

impl Default for Config {
  fn default() -> Self {
    Self {
      keywords: None,
      requires_keywords: true,
      license_file: None,
      properties: BTreeMap::new(),
      languages: Vec::new(),
    }
  }
}

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("Failed to read config file '{path}': {source}")]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The config file contains invalid TOML.
  #[error("Failed to parse config file '{path}': {source}")]
  ParseError { path: PathBuf, source: toml::de::Error },

  /// A language definition is invalid.
  #[error("Invalid language definition '{language}': {message}")]
  InvalidLanguage { language: String, message: String },
}

impl Config {
  /// Load configuration from a file.
  ///
  /// A relative `license-file` is resolved against the config file's
  /// directory.
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file
  ///
  /// # Returns
  ///
  /// The loaded configuration, or an error if the file cannot be read,
  /// parsed or validated.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    verbose_log!("Loading config from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;

    let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
      path: path.to_path_buf(),
      source: e,
    })?;

    config.validate()?;

    if let Some(license_file) = config.license_file.take() {
      let base = path.parent().unwrap_or_else(|| Path::new("."));
      config.license_file = Some(if license_file.is_relative() {
        base.join(license_file)
      } else {
        license_file
      });
    }

    verbose_log!("Loaded {} language override(s)", config.languages.len());

    Ok(config)
  }

  /// Validate the configuration.
  ///
  /// Checks that:
  /// - Every language lists at least one extension or file name
  /// - Extensions don't include the leading dot
  /// - Block comment and region tokens come in pairs
  /// - The language builds (comment syntax present, skip expression compiles)
  fn validate(&self) -> Result<(), ConfigError> {
    for lang in &self.languages {
      let invalid = |message: &str| ConfigError::InvalidLanguage {
        language: lang.display_name(),
        message: message.to_string(),
      };

      if lang.extensions.is_empty() && lang.file_names.is_empty() {
        return Err(invalid("at least one extension or file name is required"));
      }

      if lang.extensions.iter().any(|ext| ext.starts_with('.')) {
        return Err(invalid("extension should not include leading dot"));
      }

      if lang.block_comment_start.is_some() != lang.block_comment_end.is_some() {
        return Err(invalid("block-comment-start and block-comment-end must be set together"));
      }

      if lang.region_start.is_some() != lang.region_end.is_some() {
        return Err(invalid("region-start and region-end must be set together"));
      }

      lang.to_language().map_err(|e| invalid(&e.to_string()))?;
    }

    Ok(())
  }

  /// The keyword filter to apply, or `None` when any comment counts.
  pub fn effective_keywords(&self) -> Option<Vec<String>> {
    if !self.requires_keywords {
      return None;
    }
    Some(
      self
        .keywords
        .clone()
        .unwrap_or_else(|| DEFAULT_KEYWORDS.iter().map(|k| (*k).to_string()).collect()),
    )
  }
}

/// Discover the configuration file path.
///
/// The configuration file is discovered in the following order:
/// 1. Path specified via `--config` flag (passed as `explicit_path`)
/// 2. Path specified via `LICENSEHEADER_CONFIG` environment variable
/// 3. `.licenseheader.toml` in the workspace root
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path from CLI flag
/// * `workspace_root` - The workspace root directory
///
/// # Returns
///
/// The path to the configuration file, or `None` if no config file is found.
pub fn discover_config_path(explicit_path: Option<&Path>, workspace_root: &Path) -> Option<PathBuf> {
  if let Some(path) = explicit_path {
    if path.exists() {
      verbose_log!("Using explicit config path: {}", path.display());
      return Some(path.to_path_buf());
    }
    verbose_log!("Explicit config path does not exist: {}", path.display());
    return None;
  }

  if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
    let path = PathBuf::from(&env_path);
    if path.exists() {
      verbose_log!("Using config from {}: {}", CONFIG_ENV_VAR, path.display());
      return Some(path);
    }
    verbose_log!("{} path does not exist: {}", CONFIG_ENV_VAR, env_path);
  }

  let workspace_config = workspace_root.join(DEFAULT_CONFIG_FILENAME);
  if workspace_config.exists() {
    verbose_log!("Using workspace config: {}", workspace_config.display());
    return Some(workspace_config);
  }

  verbose_log!("No config file found");
  None
}

/// Load configuration from the discovered path.
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path from CLI flag
/// * `workspace_root` - The workspace root directory
/// * `no_config` - If true, skip config file discovery
///
/// # Returns
///
/// The loaded configuration, or `None` if discovery is disabled or no config
/// file is found.
pub fn load_config(explicit_path: Option<&Path>, workspace_root: &Path, no_config: bool) -> Result<Option<Config>> {
  if no_config {
    verbose_log!("Config file discovery disabled (--no-config)");
    return Ok(None);
  }

  match discover_config_path(explicit_path, workspace_root) {
    Some(path) => {
      let config = Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))?;
      Ok(Some(config))
    }
    None => Ok(None),
  }
}
