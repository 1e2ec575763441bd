//! Shared `tracing` setup for every binary in the toolkit. Errors go to
//! stderr as level-and-timestamp-prefixed lines (spec §7); the decoded JSON
//! stream on stdout never carries log output.

use tracing_subscriber::EnvFilter;

/// Initialise the process-wide subscriber. `verbose` maps to `-d`/`-q` style
/// flags on the individual binaries.
pub fn init(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
