//! # licenseheader
//!
//! Keeps a canonical license header at the top of source files.

use std::process::ExitCode;

use anyhow::Result;
use licenseheader::cli::{Cli, run_check};

#[tokio::main]
async fn main() -> Result<ExitCode> {
  let cli = Cli::parse_args();
  run_check(cli.get_check_args()).await
}
