//! Run reporting.
//!
//! ## TestReporter Trait
//!
//! The session drives a [`TestReporter`] while it walks the queue, so output format is separate
//! from execution. [`ConsoleReporter`] prints the tree-shaped report; tests can plug in a recorder.
//!
//! ## Colors
//!
//! Call [`init_colors`] once at startup. `NO_COLOR` disables colors, `FORCE_COLOR` forces them even
//! when output is piped.

use std::fmt;
use std::io::{self, Write};

use colored::Colorize;
use jsdoctest_core::{CaseError, SampleError, TestCase};

/// Header printed before the first batch of a run
pub const BANNER: &str = "test: Running tests found in documentation";

// ============================================================================
// Score
// ============================================================================

/// Running tally of test outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub success: usize,
    pub failure: usize,
    pub skipped: usize,
}

impl Score {
    pub fn total(&self) -> usize {
        self.success + self.failure + self.skipped
    }

    pub fn has_failures(&self) -> bool {
        self.failure > 0
    }

    /// Count one test.
    pub fn record(&mut self, status: &TestStatus) {
        match status {
            TestStatus::Skipped => self.skipped += 1,
            TestStatus::Passed => self.success += 1,
            _ => self.failure += 1,
        }
    }
}

impl std::ops::AddAssign for Score {
    fn add_assign(&mut self, other: Score) {
        self.success += other.success;
        self.failure += other.failure;
        self.skipped += other.skipped;
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.has_failures() { "Failure" } else { "Success" };
        write!(
            f,
            "{verdict}: {} tests, {} success, {} failures, {} skipped.",
            self.total(),
            self.success,
            self.failure,
            self.skipped
        )
    }
}

// ============================================================================
// Test status
// ============================================================================

/// What happened to one test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestStatus {
    /// `#skip` was set; the sample was not executed
    Skipped,
    Passed,
    /// The sample threw an Error
    Failed(SampleError),
    /// The sample could not be evaluated (unknown selector, compile or setup failure)
    Errored(CaseError),
}

impl TestStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, TestStatus::Failed(_) | TestStatus::Errored(_))
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Skipped => f.write_str("SKIPPED"),
            TestStatus::Passed => f.write_str("OK"),
            TestStatus::Failed(err) => write!(f, "{err}"),
            TestStatus::Errored(err) => write!(f, "ERROR: {err}"),
        }
    }
}

// ============================================================================
// Test Reporter Trait
// ============================================================================

/// Trait for reporting test execution.
///
/// Callbacks arrive in queue order: a file, then each of its items, then each of the item's tests.
pub trait TestReporter {
    /// Called once before the first file of a batch
    fn on_start(&mut self) {}

    /// Called when a file's tests begin
    fn on_file(&mut self, file: &str);

    /// Called when an item's tests begin; `line` is the line of its first sample
    fn on_item(&mut self, item: &str, line: u32, file: &str);

    /// Called when a test completes; `index` is zero-based within the item
    fn on_test_complete(&mut self, test: &TestCase, index: usize, status: &TestStatus);

    /// Called once after the batch with its score
    fn on_run_complete(&mut self, score: &Score);
}

/// Default reporter: an indented tree on stdout
pub struct ConsoleReporter<W: Write = io::Stdout> {
    out: W,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> ConsoleReporter<W> {
    /// Report into any writer (a buffer in tests).
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    // Reporting must never abort a run, so write errors are dropped
    fn line(&mut self, text: fmt::Arguments<'_>) {
        let _ = writeln!(self.out, "{text}");
    }
}

impl<W: Write> TestReporter for ConsoleReporter<W> {
    fn on_start(&mut self) {
        self.line(format_args!("{BANNER}"));
    }

    fn on_file(&mut self, file: &str) {
        self.line(format_args!("{}", format!("  {file}").bold()));
    }

    fn on_item(&mut self, item: &str, line: u32, file: &str) {
        self.line(format_args!("{} {}", format!("    {item}").bold(), format!("{file}:{line}").dimmed()));
    }

    fn on_test_complete(&mut self, _test: &TestCase, index: usize, status: &TestStatus) {
        let text = format!("      #{} - {status}", index + 1);
        let text = match status {
            _ if status.is_failure() => text.red(),
            TestStatus::Skipped => text.yellow(),
            _ => text.green(),
        };
        self.line(format_args!("{text}"));
    }

    fn on_run_complete(&mut self, score: &Score) {
        let summary = format!(" {score} ");
        let summary = if score.has_failures() {
            summary.bold().white().on_red()
        } else {
            summary.bold().black().on_green()
        };
        self.line(format_args!("{summary}"));
    }
}

/// Initialize color support based on environment. Call once at startup.
pub fn init_colors() {
    if std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    } else if std::env::var_os("FORCE_COLOR").is_some() {
        colored::control::set_override(true);
    }
}
