//! # licenseheader
//!
//! A tool that keeps a canonical license header at the top of source files in
//! many languages.
//!
//! `licenseheader` finds the header a file already has using only the comment
//! syntax of the file's language, then inserts, replaces or removes it so the
//! file starts with the desired header. Every byte outside the header region
//! is left untouched, including shebangs, encoding pragmas and XML
//! declarations that must stay on the first line.
//!
//! ## Features
//!
//! * Line comments, block comments and region blocks (`#region`) as headers
//! * Header definition files with per-extension sections, or plain license
//!   text wrapped in each language's comment syntax
//! * Placeholders such as `%CurrentYear%`, `%FileName%` and user-defined ones
//! * Keyword filter so ordinary leading comments are never taken for a header
//! * Line-ending and byte-order-mark preserving rewrites
//! * Check, modify and remove modes with diffs and JSON/CSV reports
//!
//! ## Usage as a Library
//!
//! The single-document engine works on files and on in-memory buffers:
//!
//! ```rust
//! use licenseheader::document::{Document, DocumentInput};
//! use licenseheader::header::HeaderProperties;
//! use licenseheader::language::{BuiltinResolver, LanguageResolver};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let language = BuiltinResolver
//!   .resolve(std::path::Path::new("lib.py"))
//!   .expect("python is built in");
//!
//! let mut properties = HeaderProperties::new();
//! properties.insert_named("Company", "Acme Corp");
//!
//! let mut document = Document::new(
//!   DocumentInput::content("#!/usr/bin/env python\nprint('hi')\n", "lib.py"),
//!   language,
//!   Some(vec!["# Copyright (c) %Company%".to_string(), String::new()]),
//!   Some(properties),
//!   None,
//! );
//!
//! let text = document
//!   .replace_header_if_necessary_content(&CancellationToken::new())
//!   .await?;
//! assert_eq!(text, "#!/usr/bin/env python\n# Copyright (c) Acme Corp\n\nprint('hi')\n");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! * [`document`] - The single-document header engine
//! * [`comment_parser`] - Finds the existing header using comment tokens
//! * [`language`] - Comment syntax per language and the built-in registry
//! * [`templates`] - Header definition files and plain license text
//! * [`processor`] - Concurrent batch driver used by the CLI
//! * [`logging`] - Logging utilities for verbose output
//!
//! [`document`]: crate::document
//! [`comment_parser`]: crate::comment_parser
//! [`language`]: crate::language
//! [`templates`]: crate::templates
//! [`processor`]: crate::processor
//! [`logging`]: crate::logging

pub mod logging;

pub mod cli;
pub mod comment_parser;
pub mod config;
pub mod diff;
pub mod document;
pub mod error;
pub mod header;
pub mod language;
pub mod line_ending;
pub mod output;
pub mod preparer;
pub mod processor;
pub mod report;
pub mod templates;
