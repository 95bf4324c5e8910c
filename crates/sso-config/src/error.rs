//! Configuration error types.

use serde::Serialize;
use thiserror::Error;

/// Error raised while loading or saving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid value for a setting
    #[error("Invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// A setting required by the selected login branch is absent.
///
/// Detected when the setting is first needed, never at construction.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingSetting {
    #[error("application id is required")]
    ApplicationId,

    #[error("scopes are required")]
    Scopes,

    #[error("redirect uri is required for interactive sign-in")]
    RedirectUri,
}
