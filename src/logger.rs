pub use tracing::{debug, error, info, warn, trace, instrument};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt::{self, format::FmtSpan}};

/// Default filter directive when `RUST_LOG` is unset.
pub const DEFAULT_LEVEL: &str = "info";

pub fn init() {
    init_with_default(DEFAULT_LEVEL);
}

/// Installs the global subscriber. `RUST_LOG` wins over `default_level`.
///
/// Span close events (with their busy/idle times) are only emitted when the
/// effective filter enables debug output, so per-stage timings of the
/// `#[instrument]`ed pipeline calls show up with `RUST_LOG=debug`.
pub fn init_with_default(default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let is_debug = wants_span_events(&env_filter.to_string());

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_timer(fmt::time::uptime())
        .with_span_events(if is_debug {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        });

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

/// Maps a `-v` count onto a filter level.
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => DEFAULT_LEVEL,
        1 => "debug",
        _ => "trace",
    }
}

fn wants_span_events(directives: &str) -> bool {
    directives.contains("debug") || directives.contains("trace")
}
