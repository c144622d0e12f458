//! CLI module for jsdoctest
//!
//! ## Usage
//!
//! - `jsdoctest [PATH]...` - Run the samples documented in JavaScript files (default: `.`)
//! - `jsdoctest --collect-only [PATH]...` - List samples without running them
//! - `jsdoctest --print-config` - Print the default configuration as TOML
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use crate::config::Overrides;
use crate::version::JSDOCTEST_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Run the JavaScript code samples in documentation comments as tests
#[derive(Parser, Debug)]
#[command(name = "jsdoctest")]
#[command(version = JSDOCTEST_VERSION)]
#[command(about = "Run the JavaScript code samples in documentation comments as tests", long_about = None)]
pub struct Cli {
    /// Files or directories to scan
    #[arg(value_name = "PATH", default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Config file (default: ./jsdoctest.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Assertion library: node, chai, chai-expect, chai-assert, expect, expect.js
    #[arg(long, value_name = "SELECTOR")]
    pub assert: Option<String>,

    /// Base directory for relative requires in samples
    #[arg(long = "base-path", value_name = "DIR")]
    pub base_path: Option<PathBuf>,

    /// Abort as soon as a batch reports failures
    #[arg(long)]
    pub exit_on_failure: bool,

    /// Exit with status 0 even when tests failed
    #[arg(long)]
    pub no_exit_with_failure: bool,

    /// List samples without running them
    #[arg(long)]
    pub collect_only: bool,

    /// Print the default configuration and exit
    #[arg(long, conflicts_with = "collect_only")]
    pub print_config: bool,

    /// Debug logging (same as RUST_LOG=debug)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Command-line layer of the configuration.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            assert: self.assert.clone(),
            path: self.base_path.clone(),
            exit_on_failure: self.exit_on_failure.then_some(true),
            exit_with_failure: self.no_exit_with_failure.then_some(false),
        }
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    if cli.print_config {
        return commands::print_config();
    }
    if cli.collect_only {
        return commands::collect(&cli);
    }
    commands::run_tests(&cli)
}

// ============================================================================
// Tests
// ============================================================================
