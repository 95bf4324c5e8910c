//! Logging initialization.
//!
//! Thin wrapper over the observability crate so binaries share one setup.

use observability::{LogConfig, LogFormat};

/// Environment variable selecting the log line format (`json` or compact).
const ENV_LOG_FORMAT: &str = "TEAMS_SSO_LOG_FORMAT";

/// Initialize logging for a Teams SSO binary.
///
/// `level` is the default filter; `RUST_LOG` overrides it.
///
/// # Example
///
/// ```ignore
/// sso_config::init_logging("info");
/// tracing::info!("started");
/// ```
pub fn init_logging(level: &str) {
    let format = std::env::var(ENV_LOG_FORMAT)
        .map(|raw| LogFormat::from_name(&raw))
        .unwrap_or_default();

    observability::init_with_config(LogConfig {
        service_name: "teams-sso".into(),
        default_level: level.into(),
        format,
    });
}
