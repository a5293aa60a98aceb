//! Diagnostic tracing for lytest.
//!
//! Product output (`Success`, diff verdicts, refusal notices) goes to stdout.
//! Tracing is for diagnostics only and goes to stderr, so git's pager and
//! scripts parsing stdout never see it.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr subscriber.
///
/// `RUST_LOG` selects what is shown; without it only warnings and errors are
/// printed. Timestamps are omitted since every run is a short CLI call.
///
/// # Example
/// ```bash
/// RUST_LOG=lytest=debug lytest diff a.gds b.gds
/// ```
pub fn init() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .compact(),
        )
        .init();
}
