//! # Observability
//!
//! Centralized logging setup for the Teams SSO workspace.
//!
//! Libraries in this workspace are **log producers** only: they use the
//! standard `tracing` macros and never install a subscriber themselves.
//! Binaries call [`init`] or [`init_with_config`] once at startup.
//!
//! ## Usage
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init("teams-sso");
//!     tracing::info!("ready");
//! }
//! ```
//!
//! Or with configuration:
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "teams-sso".into(),
//!     default_level: "debug".into(),
//!     format: observability::LogFormat::Json,
//! });
//! ```
//!
//! `RUST_LOG` always wins over the configured default level.

use tracing_subscriber::EnvFilter;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable single-line output.
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parse a format name; anything other than `json` is compact.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }
}

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service, attached to the startup log line.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// Output format.
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            format: LogFormat::Compact,
        }
    }
}

/// Initialize logging with default settings.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Initialize logging with custom configuration.
///
/// Calling this more than once is harmless: only the first subscriber is
/// installed, later calls are ignored.
pub fn init_with_config(config: LogConfig) {
    let filter = build_filter(&config.default_level);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = match config.format {
        LogFormat::Json => builder.json().try_init().is_ok(),
        LogFormat::Compact => builder.compact().try_init().is_ok(),
    };

    if installed {
        tracing::debug!(
            service = %config.service_name,
            format = ?config.format,
            "Logging initialized"
        );
    }
}

/// Build the env filter, preferring `RUST_LOG` over the configured level.
///
/// An unparseable default level falls back to `info`.
fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export Level for advanced filtering.
pub use tracing::Level;
