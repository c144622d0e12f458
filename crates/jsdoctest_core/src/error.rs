//! Error types for test cases.
//!
//! Two tiers stay apart here: a [`SampleError`] is something the sample code threw and is an
//! ordinary test failure, a [`CaseError`] means the case could not be evaluated at all.

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

/// Errors that prevent a test case from being built or evaluated
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum CaseError {
    #[error("test case is missing its {0}")]
    #[diagnostic(code(jsdoctest::case::missing))]
    Missing(&'static str),

    #[error("Unknown assertion framework: {0}")]
    #[diagnostic(
        code(jsdoctest::config::unknown_assertion),
        help("use one of: node, chai, chai-expect, chai-assert, expect, expect.js")
    )]
    UnknownAssertion(String),

    #[error("failed to compile sample wrapper: {0}")]
    #[diagnostic(code(jsdoctest::sandbox::compile))]
    Compile(String),

    #[error("sample setup failed: {0}")]
    #[diagnostic(
        code(jsdoctest::sandbox::setup),
        help("the assertion library could not be loaded; is it installed in node_modules?")
    )]
    Setup(String),
}

/// An error thrown by sample code and captured by the wrapper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleError {
    /// The error's `name` property (`Error`, `AssertionError`, `TypeError`, ...)
    pub name: String,
    /// The error's `message` property
    pub message: String,
}

impl SampleError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}: {}", self.name, self.message)
        }
    }
}

impl std::error::Error for SampleError {}
