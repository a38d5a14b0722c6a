//! Logging setup.
//!
//! Worker lifecycle and per-item events go through `tracing`; the per-item
//! `PRODUCER`/`CONSUMER` console lines are a separate, contract-level
//! surface emitted directly by the workers and are not log output.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber with thread names and uptime stamps.
///
/// Call once at the start of a binary or test run. The filter defaults to
/// `handoff=info`; override with `RUST_LOG`.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("handoff=info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_timer(fmt::time::uptime()),
        )
        .with(filter)
        .init();
}
