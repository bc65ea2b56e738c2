pub use tracing::{debug, error, info, warn, trace, instrument};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt::{self, format::FmtSpan}};

/// Installs the global subscriber with `info` as the fallback level.
pub fn init() {
    init_with_default("info");
}

/// Installs the global subscriber. `RUST_LOG` wins over `default_directive`.
///
/// At debug level and below span close events are printed, which gives the
/// per-frame and per-capture timings. Returns `false` when a subscriber was
/// already installed by the host.
pub fn init_with_default(default_directive: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let is_debug = env_filter
        .max_level_hint()
        .is_some_and(|level| level >= LevelFilter::DEBUG);

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_timer(fmt::time::uptime())
        .with_span_events(if is_debug {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
}
