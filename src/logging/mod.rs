//! # Logging Module
//!
//! Console output for the CLI and the `tracing` setup.
//!
//! [`verbose_log!`](crate::verbose_log) prints to stderr once `-v` is given,
//! and [`info_log!`](crate::info_log) prints highlighted status lines to
//! stdout unless `-q` is given. Library code below the CLI logs through
//! `tracing` instead; [`init_tracing`] installs the subscriber for it.
//!
//! ```rust
//! use licenseheader::logging::set_verbose;
//! use licenseheader::verbose_log;
//!
//! set_verbose();
//! verbose_log!("Loaded {} language override(s)", 2);
//! ```

mod modes;

use std::fmt;

pub use modes::{ColorMode, init_tracing, is_quiet, is_verbose, set_quiet, set_verbose};
use owo_colors::{OwoColorize, Stream};

/// Prints a line to stderr in verbose mode. Takes [`format!`] arguments.
#[macro_export]
macro_rules! verbose_log {
  ($($arg:tt)*) => {
    $crate::logging::write_verbose(format_args!($($arg)*))
  };
}

/// Prints a highlighted status line to stdout unless quiet mode is on.
#[macro_export]
macro_rules! info_log {
  ($($arg:tt)*) => {
    $crate::logging::write_info(format_args!($($arg)*))
  };
}

#[doc(hidden)]
pub fn write_verbose(message: fmt::Arguments<'_>) {
  if is_verbose() {
    eprintln!("{message}");
  }
}

#[doc(hidden)]
pub fn write_info(message: fmt::Arguments<'_>) {
  if is_quiet() {
    return;
  }
  let message = message.to_string();
  println!("{}", message.if_supports_color(Stream::Stdout, |m| m.yellow()));
}
