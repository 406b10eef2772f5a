//! # Language Module
//!
//! Comment syntax descriptors for the languages the header engine supports,
//! and resolvers that pick the descriptor for a file.
//!
//! A [`Language`] is pure data: line comment token, block comment pair,
//! optional region pair and an optional skip expression that matches leading
//! text (shebangs, encoding pragmas, XML declarations) which must stay above
//! the header. The skip expression is compiled once, when the descriptor is
//! built.
//!
//! ## Example
//!
//! ```rust
//! use std::path::Path;
//!
//! use licenseheader::language::{BuiltinResolver, LanguageResolver};
//!
//! let language = BuiltinResolver.resolve(Path::new("main.rs")).expect("rust is built in");
//! assert_eq!(language.line_comment(), Some("//"));
//! ```

use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::{Regex, RegexBuilder};
use tracing::trace;

use crate::comment_parser::CommentParser;
use crate::config::Config;
use crate::error::HeaderError;

/// Comment syntax of one source language.
#[derive(Debug, Clone)]
pub struct Language {
  name: String,
  extensions: Vec<String>,
  file_names: Vec<String>,
  line_comment: Option<String>,
  block_comment: Option<(String, String)>,
  region: Option<(String, String)>,
  skip_expression: Option<Regex>,
}

impl Language {
  /// Starts building a descriptor with the given display name.
  pub fn builder(name: impl Into<String>) -> LanguageBuilder {
    LanguageBuilder {
      name: name.into(),
      extensions: Vec::new(),
      file_names: Vec::new(),
      line_comment: None,
      block_comment: None,
      region: None,
      skip_expression: None,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Extensions (lowercase, without the leading dot) handled by this language.
  pub fn extensions(&self) -> &[String] {
    &self.extensions
  }

  pub fn line_comment(&self) -> Option<&str> {
    self.line_comment.as_deref()
  }

  pub fn block_comment(&self) -> Option<(&str, &str)> {
    self.block_comment.as_ref().map(|(open, close)| (open.as_str(), close.as_str()))
  }

  pub fn region(&self) -> Option<(&str, &str)> {
    self.region.as_ref().map(|(open, close)| (open.as_str(), close.as_str()))
  }

  pub const fn skip_expression(&self) -> Option<&Regex> {
    self.skip_expression.as_ref()
  }

  /// A comment parser for this language's tokens.
  pub fn comment_parser(&self) -> CommentParser<'_> {
    CommentParser::new(self.line_comment(), self.block_comment(), self.region())
  }

  /// Returns the leading skip text of `text`, if the skip expression matches
  /// at offset 0. Matches elsewhere in the text, or empty matches, do not
  /// count.
  pub fn skip_text<'a>(&self, text: &'a str) -> Option<&'a str> {
    let regex = self.skip_expression.as_ref()?;
    let found = regex.find(text)?;
    (found.start() == 0 && !found.is_empty()).then(|| found.as_str())
  }

  /// Whether this language handles the given file, by exact (lowercase) file
  /// name or by extension.
  pub fn matches(&self, path: &Path) -> bool {
    let file_name = lowercase_file_name(path);
    if self.file_names.iter().any(|name| *name == file_name) {
      return true;
    }

    let extension = lowercase_extension(path);
    !extension.is_empty() && self.extensions.iter().any(|ext| *ext == extension)
  }
}

/// Builder for [`Language`]; validates the descriptor invariants in
/// [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct LanguageBuilder {
  name: String,
  extensions: Vec<String>,
  file_names: Vec<String>,
  line_comment: Option<String>,
  block_comment: Option<(String, String)>,
  region: Option<(String, String)>,
  skip_expression: Option<String>,
}

impl LanguageBuilder {
  pub fn extensions<I, S>(mut self, extensions: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    self.extensions.extend(
      extensions
        .into_iter()
        .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase()),
    );
    self
  }

  pub fn file_names<I, S>(mut self, names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    self
      .file_names
      .extend(names.into_iter().map(|name| name.as_ref().to_lowercase()));
    self
  }

  pub fn line_comment(mut self, token: impl Into<String>) -> Self {
    self.line_comment = Some(token.into());
    self
  }

  pub fn block_comment(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
    self.block_comment = Some((open.into(), close.into()));
    self
  }

  pub fn region(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
    self.region = Some((open.into(), close.into()));
    self
  }

  pub fn skip_expression(mut self, expression: impl Into<String>) -> Self {
    self.skip_expression = Some(expression.into());
    self
  }

  /// Compiles the skip expression and checks that some comment syntax exists.
  ///
  /// # Errors
  ///
  /// - [`HeaderError::MissingCommentSyntax`] if neither a line comment nor a
  ///   block comment is defined (empty tokens count as undefined)
  /// - [`HeaderError::InvalidSkipExpression`] if the skip expression does not
  ///   compile
  pub fn build(self) -> Result<Language, HeaderError> {
    let line_comment = self.line_comment.filter(|token| !token.is_empty());
    let block_comment = self
      .block_comment
      .filter(|(open, close)| !open.is_empty() && !close.is_empty());
    let region = self
      .region
      .filter(|(open, close)| !open.is_empty() && !close.is_empty());

    if line_comment.is_none() && block_comment.is_none() {
      return Err(HeaderError::MissingCommentSyntax(self.name));
    }

    let skip_expression = match self.skip_expression.filter(|expr| !expr.is_empty()) {
      Some(expression) => Some(
        RegexBuilder::new(&expression)
          .case_insensitive(true)
          .build()
          .map_err(|source| HeaderError::InvalidSkipExpression { expression, source })?,
      ),
      None => None,
    };

    Ok(Language {
      name: self.name,
      extensions: self.extensions,
      file_names: self.file_names,
      line_comment,
      block_comment,
      region,
      skip_expression,
    })
  }
}

/// Trait for resolving the language of a file path.
///
/// Implementations can use the built-in table, user configuration, or both.
pub trait LanguageResolver: Send + Sync {
  /// The language for `path`, or `None` if the file type is unknown.
  fn resolve(&self, path: &Path) -> Option<Arc<Language>>;
}

/// Resolver backed by the built-in language table.
#[derive(Debug, Default)]
pub struct BuiltinResolver;

impl LanguageResolver for BuiltinResolver {
  fn resolve(&self, path: &Path) -> Option<Arc<Language>> {
    builtin_languages().iter().find(|lang| lang.matches(path)).cloned()
  }
}

/// Resolver that checks languages from the config file first, then falls back
/// to the built-in table.
#[derive(Debug)]
pub struct ConfigurableResolver {
  overrides: Vec<Arc<Language>>,
}

impl ConfigurableResolver {
  pub const fn new(overrides: Vec<Arc<Language>>) -> Self {
    Self { overrides }
  }
}

impl LanguageResolver for ConfigurableResolver {
  fn resolve(&self, path: &Path) -> Option<Arc<Language>> {
    if let Some(language) = self.overrides.iter().find(|lang| lang.matches(path)) {
      trace!("Using configured language '{}' for {}", language.name(), path.display());
      return Some(Arc::clone(language));
    }
    BuiltinResolver.resolve(path)
  }
}

/// Creates a resolver for the given configuration.
///
/// # Errors
///
/// Returns an error if a configured language is invalid (bad skip expression,
/// no comment syntax).
pub fn create_resolver(config: Option<&Config>) -> Result<Box<dyn LanguageResolver>, HeaderError> {
  match config {
    Some(cfg) if !cfg.languages.is_empty() => {
      let overrides = cfg
        .languages
        .iter()
        .map(|lang| lang.to_language().map(Arc::new))
        .collect::<Result<Vec<_>, _>>()?;
      Ok(Box::new(ConfigurableResolver::new(overrides)))
    }
    _ => Ok(Box::new(BuiltinResolver)),
  }
}

const SHEBANG: &str = r"#![ \t]*/[^\r\n]*(?:\r\n|\n|\r)?";
const PYTHON_SKIP: &str =
  r"(?:#![ \t]*/[^\r\n]*(?:\r\n|\n|\r)?)?(?:#[^\r\n]*coding[:=][^\r\n]*(?:\r\n|\n|\r)?)?";
const RUBY_SKIP: &str =
  r"(?:#![ \t]*/[^\r\n]*(?:\r\n|\n|\r)?)?(?:#[ \t]*(?:encoding|frozen_string_literal):[^\r\n]*(?:\r\n|\n|\r)?)*";
const XML_SKIP: &str =
  r"(?:<\?xml(?s:.)*?\?>(?:[ \t\r\n]*<!DOCTYPE(?s:.)*?>)?|<!DOCTYPE(?s:.)*?>)[ \t]*(?:\r\n|\n|\r)?";
const PHP_SKIP: &str = r"<\?php[^\r\n]*(?:\r\n|\n|\r)?";
const DOCKERFILE_SKIP: &str = r"(?:#[ \t]*(?:syntax|escape|check)[ \t]*=[^\r\n]*(?:\r\n|\n|\r)?)+";

/// The built-in language table.
///
/// # Supported File Types
///
/// - C/C++/Java/Go/Rust/Swift/Kotlin/...: `//` and `/* */`
/// - C#: `//`, `/* */` and `#region` blocks
/// - Python/Shell/YAML/Ruby/Perl/...: `#`
/// - PowerShell: `#`, `<# #>` and `#region` blocks
/// - SQL/Haskell/Lua: `--` (with their block comments)
/// - XML/HTML/XAML/...: `<!-- -->`
/// - and a handful more; see the source for the full list
pub fn builtin_languages() -> &'static [Arc<Language>] {
  static LANGUAGES: LazyLock<Vec<Arc<Language>>> = LazyLock::new(|| {
    let builders = vec![
      Language::builder("C#")
        .extensions(["cs"])
        .line_comment("//")
        .block_comment("/*", "*/")
        .region("#region", "#endregion"),
      Language::builder("C-family")
        .extensions([
          "c", "h", "cc", "cpp", "cxx", "hh", "hpp", "hxx", "java", "scala", "kt", "kts", "go", "rs", "swift",
          "dart", "groovy", "proto", "m", "mm", "gv", "v", "sv", "hcl",
        ])
        .line_comment("//")
        .block_comment("/*", "*/")
        .skip_expression(SHEBANG),
      Language::builder("JavaScript/TypeScript")
        .extensions(["js", "mjs", "cjs", "jsx", "ts", "mts", "cts", "tsx"])
        .line_comment("//")
        .block_comment("/*", "*/")
        .skip_expression(SHEBANG),
      Language::builder("CSS")
        .extensions(["css"])
        .block_comment("/*", "*/"),
      Language::builder("SCSS/Less")
        .extensions(["scss", "sass", "less"])
        .line_comment("//")
        .block_comment("/*", "*/"),
      Language::builder("Visual Basic")
        .extensions(["vb"])
        .line_comment("'")
        .region("#Region", "#End Region"),
      Language::builder("Python")
        .extensions(["py", "pyw", "pyi"])
        .line_comment("#")
        .skip_expression(PYTHON_SKIP),
      Language::builder("Ruby")
        .extensions(["rb", "rake", "gemspec"])
        .file_names(["gemfile", "rakefile"])
        .line_comment("#")
        .skip_expression(RUBY_SKIP),
      Language::builder("PowerShell")
        .extensions(["ps1", "psm1", "psd1"])
        .line_comment("#")
        .block_comment("<#", "#>")
        .region("#region", "#endregion"),
      Language::builder("Shell")
        .extensions([
          "sh", "bash", "zsh", "fish", "pl", "pm", "tcl", "r", "yaml", "yml", "toml", "tf", "bzl", "pp", "cmake",
          "nix",
        ])
        .file_names(["cmakelists.txt", "makefile", "build", "workspace"])
        .line_comment("#")
        .skip_expression(SHEBANG),
      Language::builder("Dockerfile")
        .extensions(["dockerfile"])
        .file_names(["dockerfile", "containerfile"])
        .line_comment("#")
        .skip_expression(DOCKERFILE_SKIP),
      Language::builder("SQL")
        .extensions(["sql"])
        .line_comment("--")
        .block_comment("/*", "*/"),
      Language::builder("Haskell")
        .extensions(["hs", "lhs"])
        .line_comment("--")
        .block_comment("{-", "-}"),
      Language::builder("Lua")
        .extensions(["lua"])
        .line_comment("--")
        .block_comment("--[[", "]]")
        .skip_expression(SHEBANG),
      Language::builder("Markup")
        .extensions([
          "xml", "xaml", "xsd", "xsl", "xslt", "config", "resx", "csproj", "vbproj", "props", "targets", "nuspec",
          "html", "htm", "xhtml", "vue", "svg", "wxi", "wxl", "wxs", "aspx", "ascx", "master",
        ])
        .block_comment("<!--", "-->")
        .skip_expression(XML_SKIP),
      Language::builder("PHP")
        .extensions(["php"])
        .line_comment("//")
        .block_comment("/*", "*/")
        .skip_expression(PHP_SKIP),
      Language::builder("Lisp")
        .extensions(["el", "lisp", "clj", "cljs", "scm"])
        .line_comment(";;"),
      Language::builder("Erlang")
        .extensions(["erl", "hrl"])
        .line_comment("%"),
      Language::builder("F#")
        .extensions(["fs", "fsi", "fsx"])
        .line_comment("//")
        .block_comment("(*", "*)"),
      Language::builder("OCaml")
        .extensions(["ml", "mli", "mll", "mly"])
        .block_comment("(*", "*)"),
      Language::builder("Jinja")
        .extensions(["j2", "jinja", "jinja2"])
        .block_comment("{#", "#}"),
    ];

    builders
      .into_iter()
      .map(|builder| Arc::new(builder.build().expect("built-in language must be valid")))
      .collect()
  });

  &LANGUAGES
}

fn lowercase_file_name(path: &Path) -> String {
  path
    .file_name()
    .and_then(|name| name.to_str())
    .unwrap_or("")
    .to_lowercase()
}

fn lowercase_extension(path: &Path) -> String {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .unwrap_or("")
    .to_lowercase()
}
