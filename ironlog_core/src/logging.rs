//! Tracing setup for the ironlog binary.
//!
//! Log lines go to stderr so they never interleave with the workout prompt on
//! stdout. `RUST_LOG` always wins over the level chosen here.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber at INFO
pub fn init() {
    init_with_level("info")
}

/// Install the global subscriber for a `-v` count: 0 = info, 1 = debug, 2+ = trace
pub fn init_verbose(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    init_with_level(level)
}

/// Install the global subscriber with `default_level` (debug, info, warn, error)
///
/// Calling this more than once leaves the first subscriber in place.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Route engine logs through the test harness
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("ironlog_core=debug"))
        .try_init();
}
