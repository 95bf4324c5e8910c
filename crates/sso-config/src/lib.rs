//! Configuration, configuration errors and logging bootstrap for Teams SSO.

mod config;
mod error;
mod logging;

pub use config::{AuthConfig, DEFAULT_HOST_TOKEN_TIMEOUT_SECS, DEFAULT_LOG_LEVEL};
pub use error::{ConfigError, ConfigResult, MissingSetting};
pub use logging::init_logging;
