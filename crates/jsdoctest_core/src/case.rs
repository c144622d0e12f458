//! A single documentation code sample.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{CaseError, SampleError};
use crate::options::Options;
use crate::sandbox;
use crate::template::template;

/// Result of running a sample that could be evaluated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The sample completed without throwing an Error
    Success,
    /// The sample threw; the wrapper captured the error
    Failure(SampleError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// One code sample with its resolved configuration.
///
/// Fields are private and there are no mutators: a `TestCase` is immutable once built.
#[derive(Debug, Clone)]
pub struct TestCase {
    file: String,
    item: String,
    line: u32,
    code: String,
    config: Arc<Config>,
    options: Options,
}

impl TestCase {
    /// Start building a test case from its required fields.
    pub fn builder(
        file: impl Into<String>,
        item: impl Into<String>,
        line: u32,
        code: impl Into<String>,
    ) -> TestCaseBuilder {
        TestCaseBuilder {
            file: file.into(),
            item: item.into(),
            line,
            code: code.into(),
            config: None,
            options: Options::default(),
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Base directory for relative `require` calls: `options.path`, then `config.path`.
    pub fn base_path(&self) -> Option<PathBuf> {
        self.options
            .text("path")
            .map(PathBuf::from)
            .or_else(|| self.config.path.clone())
    }

    /// The wrapper source this case evaluates.
    pub fn template(&self) -> Result<String, CaseError> {
        template(&self.code, &self.config, &self.options)
    }

    /// Run the sample in a fresh sandbox.
    ///
    /// Skip handling is the caller's concern; this always executes.
    ///
    /// ## Errors
    ///
    /// - [`CaseError::UnknownAssertion`] if the assertion selector is not recognized
    /// - [`CaseError::Compile`] if the wrapper does not compile
    /// - [`CaseError::Setup`] if the assertion preamble throws
    #[tracing::instrument(skip_all, fields(file = %self.file, item = %self.item, line = self.line))]
    pub fn run(&self) -> Result<Outcome, CaseError> {
        let source = self.template()?;
        let outcome = sandbox::execute(&source, &self.file, self.base_path())?;
        tracing::debug!(success = outcome.is_success(), "sample finished");
        Ok(outcome)
    }
}

/// Builder for [`TestCase`]; `config` and `options` default to empty.
#[derive(Debug)]
pub struct TestCaseBuilder {
    file: String,
    item: String,
    line: u32,
    code: String,
    config: Option<Arc<Config>>,
    options: Options,
}

impl TestCaseBuilder {
    pub fn config(mut self, config: Arc<Config>) -> Self {
        self.config = Some(config);
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Validate required fields and freeze the test case.
    pub fn build(self) -> Result<TestCase, CaseError> {
        if self.file.is_empty() {
            return Err(CaseError::Missing("file"));
        }
        if self.item.is_empty() {
            return Err(CaseError::Missing("item"));
        }
        if self.line == 0 {
            return Err(CaseError::Missing("line"));
        }

        Ok(TestCase {
            file: self.file,
            item: self.item,
            line: self.line,
            code: self.code,
            config: self.config.unwrap_or_default(),
            options: self.options,
        })
    }
}
