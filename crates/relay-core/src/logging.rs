//! Tracing subscriber setup for binaries and tests that embed the dispatcher.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Builds the filter: `RUST_LOG` wins when set and parseable, otherwise the configured
/// level applies to this crate and everything else stays at `warn`.
fn build_filter(config: &LoggingConfig) -> EnvFilter {
    match std::env::var("RUST_LOG") {
        Ok(directives) => EnvFilter::try_new(directives)
            .unwrap_or_else(|_| EnvFilter::new(format!("warn,relay_core={}", config.level))),
        Err(_) => EnvFilter::new(format!("warn,relay_core={}", config.level)),
    }
}

/// Installs the global subscriber.
///
/// Returns `false` if a subscriber was already installed, which is expected when several
/// tests in one process call this.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let registry = tracing_subscriber::registry().with(build_filter(config));

    if config.format.as_str() == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer().json();
        registry.with(fmt_layer).try_init().is_ok()
    } else {
        // "pretty" and any other format default to pretty logging
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_target(false);
        registry.with(fmt_layer).try_init().is_ok()
    }
}
