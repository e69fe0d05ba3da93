//! Logging setup for the command line front-end.
//!
//! Log lines go to stderr so that stdout only carries the report.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const DEBUG_DEFAULT_FILTER: &str = "info,track_stats_lib=debug,track_stats_cli=debug";
const RELEASE_DEFAULT_FILTER: &str = "info";

/// Install the global subscriber, filtered by `RUST_LOG` or a build-dependent default
pub fn setup_logging() {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(default_filter()), false),
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        // Already installed (e.g. by a test harness)
        return;
    }

    if !from_env {
        tracing::debug!("RUST_LOG not set, using default filter: {}", default_filter());
    }
}

fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        DEBUG_DEFAULT_FILTER
    } else {
        RELEASE_DEFAULT_FILTER
    }
}
