#![forbid(unsafe_code)]
//! jsdoctest: run the JavaScript samples in documentation comments as tests
//!
//! This crate provides the front half of the runner (scanning `/** */` comments, extracting fenced
//! `js` blocks, layering configuration) and the back half (the run session, console reporting, the
//! CLI). Test cases, the queue and the sandboxed JavaScript runtime live in `jsdoctest_core`.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module
//!   enforces `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents a programming error (a static regex that does not
//!   compile), use `.expect("INVARIANT: reason")` with a clear explanation.

pub mod cli;
pub mod config;
pub mod doc;
pub mod extract;
pub mod report;
pub mod session;
pub mod version;

pub use doc::{DocEntry, DocLine, discover_files, scan_source};
pub use extract::{Sample, extract_samples};
pub use report::{ConsoleReporter, Score, TestReporter, TestStatus};
pub use session::{Completion, Session, SessionError};
