//! Tracing setup for the analysis and routing paths.
//!
//! The crate instruments table compilation and dispatch with [`tracing`]
//! spans and events; this module wires a sensible subscriber for binaries
//! and tests that want to see them. Filtering follows `RUST_LOG`, falling
//! back to `info`, and a [`tracing_error::ErrorLayer`] is installed so span
//! context is available in diagnostic reports.
//!
//! Library consumers with their own subscriber simply skip this module.
//!
//! # Examples
//!
//! ```rust,no_run
//! fluxtable::telemetry::init();
//! ```

use thiserror::Error;
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Failure installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber is already installed.
    #[error("global tracing subscriber already set")]
    AlreadyInitialized,
}

/// Installs the default subscriber, panicking if one is already set.
///
/// Intended for binaries and examples; tests and embedders should prefer
/// [`try_init`].
pub fn init() {
    if let Err(err) = try_init() {
        panic!("{err}");
    }
}

/// Installs the default subscriber: `RUST_LOG`-driven filter (default
/// `info`), compact fmt output on stderr, and an [`ErrorLayer`] for span
/// traces.
pub fn try_init() -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|_| TelemetryError::AlreadyInitialized)
}
