//! Tracing subscriber setup shared by the supernode binaries.
//!
//! The filter is taken from `RUST_LOG` (falling back to the given default
//! level) and the output format from `RUST_LOG_FORMAT` (`json` or compact).

use std::env::var;

use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format of the log layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Compact single-line output without timestamps.
    #[default]
    Compact,
}

impl LogFormat {
    /// Parse a `RUST_LOG_FORMAT` value. Unknown values select the compact format.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Compact,
        }
    }

    fn from_env() -> Self {
        var("RUST_LOG_FORMAT")
            .inspect_err(|error| {
                warn!("Failed to read RUST_LOG_FORMAT, falling back to default: {error}")
            })
            .map(|value| Self::parse(&value))
            .unwrap_or_default()
    }
}

/// Initialise tracing at `INFO` unless `RUST_LOG` says otherwise.
pub fn init() {
    init_with_default(LevelFilter::INFO);
}

/// Initialise tracing with `level` as the default directive.
///
/// Panics if a global subscriber is already installed.
pub fn init_with_default(level: LevelFilter) {
    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let log_layer = match LogFormat::from_env() {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().with_filter(env_filter).boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_filter(env_filter)
            .boxed(),
    };

    tracing_subscriber::registry().with(log_layer).init();
}
