//! A jsdoctest run.
//!
//! A [`Session`] owns the frozen configuration, the queue and the score. Its lifecycle mirrors how
//! documentation arrives: [`Session::start`] once, [`Session::handle`] for each batch of scanned
//! entries, [`Session::complete`] at the end to decide the exit status.
//!
//! ## Exit policy
//!
//! - `exit_on_failure`: a batch that reported failures aborts the run right after its summary.
//! - `exit_with_failure`: the run completes with a failing status when any test failed.

use std::convert::Infallible;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jsdoctest_core::{CaseError, Config, Outcome, QueueVisitor, TestCase, TestQueue};
use thiserror::Error;

use crate::doc::{self, DocEntry};
use crate::extract::extract_samples;
use crate::report::{Score, TestReporter, TestStatus};

/// Errors that end a session early
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Aborting after {failures} failed test(s) (exit_on_failure is set)")]
    Aborted { failures: usize },

    #[error(transparent)]
    Case(#[from] CaseError),
}

/// Final state of a completed session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub score: Score,
    /// `false` when the run should end with a failing exit status
    pub success: bool,
}

/// One run over documentation entries
pub struct Session<R: TestReporter> {
    config: Arc<Config>,
    queue: TestQueue,
    score: Score,
    reporter: R,
}

impl<R: TestReporter> Session<R> {
    /// Begin a run with an empty queue and a zero score.
    pub fn start(config: Arc<Config>, reporter: R) -> Self {
        tracing::debug!(assert = %config.assert, "session started");
        Self {
            config,
            queue: TestQueue::new(),
            score: Score::default(),
            reporter,
        }
    }

    /// Score accumulated over every handled batch
    pub fn score(&self) -> Score {
        self.score
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Extract the samples of `entries`, run them in queue order and report them.
    ///
    /// Returns the score of this batch.
    ///
    /// ## Errors
    ///
    /// - [`SessionError::Aborted`] when the batch had failures and `exit_on_failure` is set
    /// - [`SessionError::Case`] when a sample cannot become a test case
    #[tracing::instrument(skip_all, fields(entries = entries.len()))]
    pub fn handle(&mut self, entries: &[DocEntry]) -> Result<Score, SessionError> {
        self.enqueue(entries)?;
        let queue = std::mem::take(&mut self.queue);

        self.reporter.on_start();
        let mut runner = Runner {
            reporter: &mut self.reporter,
            score: Score::default(),
        };
        let Ok(()) = queue.visit(&mut runner);
        let batch = runner.score;

        self.reporter.on_run_complete(&batch);
        self.score += batch;
        tracing::debug!(?batch, total = ?self.score, "batch finished");

        if self.config.exit_on_failure && batch.has_failures() {
            return Err(SessionError::Aborted {
                failures: batch.failure,
            });
        }
        Ok(batch)
    }

    /// Extract and queue samples without running them.
    pub fn collect(&mut self, entries: &[DocEntry]) -> Result<TestQueue, SessionError> {
        self.enqueue(entries)?;
        Ok(std::mem::take(&mut self.queue))
    }

    /// Finish the run.
    pub fn complete(self) -> Completion {
        let success = !(self.config.exit_with_failure && self.score.has_failures());
        Completion {
            score: self.score,
            success,
        }
    }

    fn enqueue(&mut self, entries: &[DocEntry]) -> Result<(), SessionError> {
        for entry in entries {
            for sample in extract_samples(entry) {
                self.queue.push(sample.into_test(self.config.clone())?);
            }
        }
        Ok(())
    }
}

/// Visitor that runs each test and forwards results to the reporter
struct Runner<'a, R: TestReporter> {
    reporter: &'a mut R,
    score: Score,
}

impl<R: TestReporter> QueueVisitor for Runner<'_, R> {
    type Error = Infallible;

    fn on_file(&mut self, file: &str) -> Result<(), Infallible> {
        self.reporter.on_file(file);
        Ok(())
    }

    fn on_item(&mut self, item: &str, line: u32, file: &str) -> Result<(), Infallible> {
        self.reporter.on_item(item, line, file);
        Ok(())
    }

    fn on_test(&mut self, test: &TestCase, index: usize) -> Result<(), Infallible> {
        let status = run_test(test);
        self.score.record(&status);
        self.reporter.on_test_complete(test, index, &status);
        Ok(())
    }
}

/// Run one test unless it is marked `#skip`.
pub fn run_test(test: &TestCase) -> TestStatus {
    if test.options().skip() {
        return TestStatus::Skipped;
    }
    match test.run() {
        Ok(Outcome::Success) => TestStatus::Passed,
        Ok(Outcome::Failure(err)) => TestStatus::Failed(err),
        Err(err) => {
            tracing::warn!(
                file = test.file(),
                item = test.item(),
                line = test.line(),
                %err,
                "sample could not be evaluated"
            );
            TestStatus::Errored(err)
        }
    }
}

// ============================================================================
// Source loading
// ============================================================================

/// Scan every JavaScript file under `paths` for documentation entries.
///
/// Files are labeled relative to `root` when they live below it, so relative `require` calls in
/// samples resolve against `root` joined with the file's directory. Unreadable files are logged and
/// skipped.
pub fn read_entries(paths: &[PathBuf], root: &Path) -> Vec<DocEntry> {
    let mut entries = Vec::new();
    for path in paths {
        for file in doc::discover_files(path) {
            let source = match fs::read_to_string(&file) {
                Ok(source) => source,
                Err(e) => {
                    tracing::warn!(file = %file.display(), error = %e, "skipping unreadable file");
                    continue;
                }
            };
            entries.extend(doc::scan_source(&file_label(&file, root), &source));
        }
    }
    entries
}

fn file_label(file: &Path, root: &Path) -> String {
    let absolute = if file.is_absolute() {
        file.to_path_buf()
    } else {
        root.join(file)
    };
    let label = absolute.strip_prefix(root).map(Path::to_path_buf).unwrap_or_else(|_| file.to_path_buf());
    label.to_string_lossy().replace('\\', "/")
}

/// Write the queue as a plain listing: files, items with their line, then each sample's options.
pub fn write_listing(queue: &TestQueue, out: &mut impl Write) -> io::Result<()> {
    let mut lister = Lister { out };
    queue.visit(&mut lister)?;
    writeln!(lister.out, "{} sample(s) in {} file(s)", queue.len(), queue.files())
}

struct Lister<'a, W: Write> {
    out: &'a mut W,
}

impl<W: Write> QueueVisitor for Lister<'_, W> {
    type Error = io::Error;

    fn on_file(&mut self, file: &str) -> io::Result<()> {
        writeln!(self.out, "{file}")
    }

    fn on_item(&mut self, item: &str, line: u32, _file: &str) -> io::Result<()> {
        writeln!(self.out, "  {item} (line {line})")
    }

    fn on_test(&mut self, test: &TestCase, index: usize) -> io::Result<()> {
        if test.options().is_empty() {
            writeln!(self.out, "    #{} line {}", index + 1, test.line())
        } else {
            writeln!(self.out, "    #{} line {} {}", index + 1, test.line(), test.options())
        }
    }
}
