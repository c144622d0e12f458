//! Core of the jsdoctest runner.
//!
//! Code samples found in documentation comments become [`TestCase`] values. A [`TestQueue`] groups
//! them by source file and documented item, preserving discovery order, and drives a visitor over
//! the groups. Each case runs in its own embedded JavaScript context (see [`sandbox`]) with a single
//! injected capability: a `require` function that resolves modules relative to the documented file.
//!
//! ## Panic Policy
//!
//! - **Production code**: errors are returned as [`CaseError`]; JavaScript exceptions never unwind
//!   into the host.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod case;
pub mod config;
pub mod error;
pub mod options;
pub mod queue;
pub mod sandbox;
pub mod template;

pub use case::{Outcome, TestCase, TestCaseBuilder};
pub use config::Config;
pub use error::{CaseError, SampleError};
pub use options::{OptionValue, Options};
pub use queue::{ItemGroup, QueueVisitor, TestQueue};
pub use template::{AssertLibrary, template};
