//! Logging setup.
//!
//! The runtime logs through `tracing`: a `frame` span per resume with `trace!`
//! events inside, `debug!` when a frame completes and `warn!` when a body
//! panics. Nothing is printed unless a subscriber is installed; these helpers
//! install a plain `[LEVEL] message` formatter.
//!
//! ```no_run
//! use resumable::logger::{self, LogLevel};
//!
//! logger::init_with_level(LogLevel::Trace);
//! tracing::info!("frames will be traced");
//! ```

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{Layer, Registry, layer::SubscriberExt};

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Initialize logging at INFO level.
///
/// # Panics
/// Panics if a global subscriber is already installed.
pub fn init() {
    init_with_level(LogLevel::Info);
}

/// Initialize logging at `level`.
///
/// # Panics
/// Panics if a global subscriber is already installed.
pub fn init_with_level(level: LogLevel) {
    if let Err(error) = try_init_with_level(level) {
        panic!("failed to install the log subscriber: {error}");
    }
}

/// Initialize logging at `level`, reporting a subscriber that is already
/// installed instead of panicking.
pub fn try_init_with_level(level: LogLevel) -> Result<(), TryInitError> {
    let filter = LevelFilter::from_level(level.into());

    let layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_level(true)
        .with_ansi(false)
        .compact()
        .with_filter(filter);

    Registry::default().with(layer).try_init()
}

/// Trace-level logging routed through the test harness's captured output.
/// Safe to call from every test.
pub fn init_for_tests() {
    let layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_ansi(false)
        .with_test_writer()
        .with_filter(LevelFilter::TRACE);

    let _ = Registry::default().with(layer).try_init();
}
