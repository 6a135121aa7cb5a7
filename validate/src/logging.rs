//! Logging setup for the validator
//!
//! Logs go to stderr so stdout stays a clean report. Set `DEBUG_LOGGING=1`
//! for debug output from the cadence crates; `RUST_LOG` overrides both.

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

fn filter_directive(debug_logging: bool) -> &'static str {
    if debug_logging {
        "warn,cadence_core=debug,cadence_validate=debug"
    } else {
        "warn"
    }
}

pub fn init() {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(debug_logging)));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter)
        .init();

    tracing::debug!(debug_logging, "validator logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_directive_targets_own_crates() {
        assert_eq!(filter_directive(false), "warn");
        assert!(filter_directive(true).contains("cadence_core=debug"));
    }
}
