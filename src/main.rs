//! jsdoctest CLI entry point

fn main() {
    // Structured logging with env-based filter; `-v` raises the default to debug
    let verbose = std::env::args().skip(1).any(|a| a == "-v" || a == "--verbose");
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .try_init();

    jsdoctest::cli::run();
}
