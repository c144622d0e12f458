//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jsdoctest_core::Config;
use jsdoctest_core::sandbox::resolve;

use super::{Cli, CliError, CliResult, ExitCode};
use crate::config;
use crate::doc::DocEntry;
use crate::report::{self, ConsoleReporter};
use crate::session::{self, Session, SessionError};

// ============================================================================
// Run preparation (shared between running and collecting)
// ============================================================================

/// Configuration and scanned documentation for one invocation
struct Prepared {
    config: Arc<Config>,
    entries: Vec<DocEntry>,
}

/// Load the configuration, then scan every requested path.
fn prepare(cli: &Cli) -> CliResult<Prepared> {
    let cwd = env::current_dir().map_err(|e| CliError::failure(format!("Error: cannot read working directory: {e}")))?;

    let config = config::load(cli.config.as_deref(), &cwd, |key| env::var(key).ok(), cli.overrides())
        .map_err(|e| CliError::failure(format!("Error: {e}")))?;

    let paths = absolute_paths(&cli.paths, &cwd)?;
    let root = resolve::absolute_base(config.path.as_deref(), &cwd);
    let entries = session::read_entries(&paths, &root);
    tracing::debug!(paths = paths.len(), entries = entries.len(), root = %root.display(), "documentation scanned");

    Ok(Prepared { config, entries })
}

fn absolute_paths(paths: &[PathBuf], cwd: &Path) -> CliResult<Vec<PathBuf>> {
    paths
        .iter()
        .map(|path| {
            let absolute = resolve::normalize(&cwd.join(path));
            if absolute.exists() {
                Ok(absolute)
            } else {
                Err(CliError::failure(format!("Error: path not found: {}", path.display())))
            }
        })
        .collect()
}

// ============================================================================
// Commands
// ============================================================================

/// Run every documented sample and report on stdout.
pub fn run_tests(cli: &Cli) -> CliResult<ExitCode> {
    let Prepared { config, entries } = prepare(cli)?;

    report::init_colors();
    let mut session = Session::start(config, ConsoleReporter::new());

    match session.handle(&entries) {
        Ok(_) => {}
        Err(SessionError::Aborted { .. }) => return Err(CliError::new("", ExitCode::FAILURE)),
        Err(e) => return Err(CliError::failure(format!("Error: {e}"))),
    }

    let completion = session.complete();
    Ok(if completion.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// List samples grouped by file and item without executing them.
pub fn collect(cli: &Cli) -> CliResult<ExitCode> {
    let Prepared { config, entries } = prepare(cli)?;

    let mut session = Session::start(config, ConsoleReporter::new());
    let queue = session
        .collect(&entries)
        .map_err(|e| CliError::failure(format!("Error: {e}")))?;

    session::write_listing(&queue, &mut io::stdout().lock())
        .map_err(|e| CliError::failure(format!("Error writing listing: {e}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Print the default configuration as TOML.
pub fn print_config() -> CliResult<ExitCode> {
    print!("{}", config::default_config_string());
    Ok(ExitCode::SUCCESS)
}
