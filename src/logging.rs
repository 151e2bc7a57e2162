//! Native log output for the CLI and tests
//!
//! The library only emits `tracing` events; whoever owns the process decides
//! where they go. `init_logging` routes them to stderr so JSON on stdout stays
//! machine-readable.

use tracing_subscriber::{fmt, EnvFilter};

use crate::core::slots::env;

const DEFAULT_FILTER: &str = "info";

fn json_requested() -> bool {
    std::env::var(env::LOG_JSON).map(|value| value.trim() == "1").unwrap_or(false)
}

/// Install the stderr subscriber. `RUST_LOG` filters, `STARKLINK_LOG_JSON=1` switches to JSON.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = fmt::Subscriber::builder().with_env_filter(filter).with_writer(std::io::stderr);

    let _ = if json_requested() {
        builder.json().try_init()
    } else {
        builder.compact().with_target(false).try_init()
    };
}
