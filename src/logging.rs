//! Diagnostic logging.
//!
//! Logs always go to stderr so they never interleave with rendered output on stdout.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "warn";

/// Installs the global subscriber. `filter` takes precedence over `RUST_LOG`.
///
/// Returns `false` when a subscriber was already installed.
pub fn init(filter: Option<&str>) -> bool {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}
