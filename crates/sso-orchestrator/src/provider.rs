//! Collaborator interfaces for the host SDK and the identity provider SDK.
//!
//! Both are opaque: the orchestrator never sees caches, network calls or
//! redirect handling, only the outcome classes below.

use crate::error::{HostChannelError, ProviderError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Reason reported to the host when app initialisation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitFailureReason {
    AuthFailed,
}

/// Token issuance channel offered by the collaboration host.
#[async_trait]
pub trait HostTokenChannel: Send + Sync {
    /// Ask the host for a token scoped to `resource_uri`.
    async fn request_token(&self, resource_uri: &str) -> Result<String, HostChannelError>;

    /// Tell the host the app finished initialising.
    fn notify_success(&self) {}

    /// Tell the host the app could not initialise.
    fn notify_failure(&self, _reason: InitFailureReason, _message: &str) {}
}

/// Silent token request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SilentTokenRequest {
    pub client_id: String,
    pub scopes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_hint: Option<String>,
}

/// Interactive (popup or redirect) token request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractiveTokenRequest {
    pub client_id: String,
    pub scopes: Vec<String>,
    pub redirect_uri: String,
}

/// Account entry returned alongside a provider token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAccount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Successful provider response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub accounts: Vec<ProviderAccount>,
}

impl ProviderTokenResponse {
    /// Name of the account, only when exactly one account came back.
    pub fn single_account_name(&self) -> Option<&str> {
        match self.accounts.as_slice() {
            [account] => account.name.as_deref().filter(|name| !name.is_empty()),
            _ => None,
        }
    }
}

/// Identity provider SDK surface.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Acquire a token from cache or a hidden exchange. Fails with
    /// [`ProviderError::InteractionRequired`] when the user must act.
    async fn acquire_token_silent(
        &self,
        request: &SilentTokenRequest,
    ) -> Result<ProviderTokenResponse, ProviderError>;

    /// Acquire a token through a popup or full-page flow the user completes.
    async fn acquire_token_interactive(
        &self,
        request: &InteractiveTokenRequest,
    ) -> Result<ProviderTokenResponse, ProviderError>;

    /// Begin a host-mediated redirect. Returns once navigation has been
    /// triggered; the outcome is observed by the host.
    async fn start_redirect(&self, request: &InteractiveTokenRequest) -> Result<(), ProviderError>;

    /// Sign the application out and navigate away.
    async fn sign_out(&self, client_id: &str) -> Result<(), ProviderError>;
}
