//! Tracing subscriber setup
//!
//! Logs go to stderr so stdout carries only the summary or JSON report.

use crate::cli::Verbosity;
use tracing_subscriber::EnvFilter;

/// Filter directive for a verbosity
///
/// An explicit flag wins over `RUST_LOG`; otherwise `RUST_LOG` applies,
/// defaulting to `info`.
#[must_use]
pub fn filter_for(verbosity: Verbosity) -> EnvFilter {
    match verbosity {
        Verbosity::Quiet => EnvFilter::new("warn"),
        Verbosity::Verbose => EnvFilter::new("debug"),
        Verbosity::Normal => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        }
    }
}

/// Install the global subscriber
///
/// A second call is ignored.
pub fn init(verbosity: Verbosity) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
