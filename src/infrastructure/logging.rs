//! Tracing setup for embedding applications
//!
//! The engine is a library, so installing the subscriber is the caller's
//! choice; `init_logging` is a convenience for binaries and tests that do not
//! bring their own.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{LogFormat, LoggingConfig};

/// Install a global tracing subscriber from the logging config
///
/// The `RUST_LOG` environment filter takes precedence over the configured
/// level. Panics if a global subscriber is already set; use
/// [`try_init_logging`] when that is expected.
pub fn init_logging(config: &LoggingConfig) {
    try_init_logging(config).expect("global tracing subscriber already set");
}

/// Fallible variant of [`init_logging`]
pub fn try_init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => {
            registry
                .with(fmt::layer().json().with_span_events(FmtSpan::CLOSE))
                .try_init()?;
        }
        LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE),
                )
                .try_init()?;
        }
    }

    tracing::info!(level = %config.level, "logging initialized");
    Ok(())
}
