//! jsdoctest version information.
//!
//! ## Notes
//!
//! - The value is taken from Cargo metadata (`CARGO_PKG_VERSION`) at compile time.
//! - The CLI `--version` flag and the collect-only header both read this constant.

/// The jsdoctest version string (for example, `0.1.0-alpha.1`).
pub const JSDOCTEST_VERSION: &str = env!("CARGO_PKG_VERSION");
