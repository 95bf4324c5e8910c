//! Authentication error types.

use sso_config::MissingSetting;
use std::time::Duration;
use thiserror::Error;

/// Error published in the auth snapshot when an attempt fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A setting required by the selected login branch is missing
    #[error("Configuration error: {0}")]
    Configuration(#[from] MissingSetting),

    /// The host declined or failed to issue a token
    #[error("Host token request failed: {0}")]
    HostChannel(String),

    /// The host never answered the token request
    #[error("Host token request timed out after {0:?}")]
    HostTimeout(Duration),

    /// Token payload could not be decoded
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Silent acquisition failed for a reason other than required interaction
    #[error("Identity provider error: {0}")]
    Provider(String),

    /// Interactive sign-in failed (cancelled, popup blocked, provider error)
    #[error("Interactive sign-in failed: {0}")]
    InteractiveFlow(String),

    /// The host context publisher went away before resolving
    #[error("Host context was never resolved")]
    HostContextUnavailable,

    /// A token was requested but none has been acquired
    #[error("No token")]
    NoToken,

    /// Invalid state transition in the SSO FSM
    #[error("Invalid auth state transition: {0}")]
    InvalidStateTransition(String),
}

impl AuthError {
    /// Returns true for fatal misconfiguration, which is never retried.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AuthError::Configuration(_))
    }
}

impl From<HostChannelError> for AuthError {
    fn from(err: HostChannelError) -> Self {
        AuthError::HostChannel(err.reason)
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;

/// Failure classes reported by the identity provider.
///
/// Only `InteractionRequired` escalates to an interactive flow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// No cached or silent credential exists; the user must interact
    #[error("Interaction required: {0}")]
    InteractionRequired(String),

    /// Network, configuration or provider-internal failure
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub fn is_interaction_required(&self) -> bool {
        matches!(self, ProviderError::InteractionRequired(_))
    }
}

/// The host's failure callback fired.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct HostChannelError {
    pub reason: String,
}

impl HostChannelError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_configuration() {
        assert!(AuthError::Configuration(MissingSetting::RedirectUri).is_configuration());
        assert!(!AuthError::HostChannel("denied".into()).is_configuration());
        assert!(!AuthError::Provider("offline".into()).is_configuration());
    }

    #[test]
    fn test_from_missing_setting() {
        let err: AuthError = MissingSetting::ApplicationId.into();
        assert_eq!(
            err.to_string(),
            "Configuration error: application id is required"
        );
    }

    #[test]
    fn test_from_host_channel_error() {
        let err: AuthError = HostChannelError::new("CancelledByUser").into();
        assert_eq!(err, AuthError::HostChannel("CancelledByUser".into()));
        assert_eq!(err.to_string(), "Host token request failed: CancelledByUser");
    }

    #[test]
    fn test_provider_error_classification() {
        assert!(
            ProviderError::InteractionRequired("login_required".into()).is_interaction_required()
        );
        assert!(!ProviderError::Other("network".into()).is_interaction_required());
    }

    #[test]
    fn test_host_timeout_display() {
        let err = AuthError::HostTimeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "Host token request timed out after 30s");
    }
}
