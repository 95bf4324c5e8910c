//! Scripted collaborators for `teams-sso simulate`.

use async_trait::async_trait;
use clap::ValueEnum;
use sso_orchestrator::{
    HostChannelError, HostTokenChannel, IdentityProvider, InitFailureReason,
    InteractiveTokenRequest, ProviderAccount, ProviderError, ProviderTokenResponse,
    SilentTokenRequest,
};
use tracing::info;

/// How a scripted provider call ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScriptedOutcome {
    Ok,
    InteractionRequired,
    Error,
}

/// Host that answers every token request the same way.
pub struct ScriptedHost {
    outcome: Result<String, String>,
}

impl ScriptedHost {
    pub fn new(token: Option<String>, failure: Option<String>) -> Self {
        let outcome = match (failure, token) {
            (Some(reason), _) => Err(reason),
            (None, Some(token)) => Ok(token),
            (None, None) => Err("no host token scripted".to_string()),
        };
        Self { outcome }
    }
}

#[async_trait]
impl HostTokenChannel for ScriptedHost {
    async fn request_token(&self, resource_uri: &str) -> Result<String, HostChannelError> {
        info!(resource = %resource_uri, "Host token requested");
        self.outcome.clone().map_err(HostChannelError::new)
    }

    fn notify_success(&self) {
        info!("Host notified: app initialized");
    }

    fn notify_failure(&self, reason: InitFailureReason, message: &str) {
        info!(reason = ?reason, message = %message, "Host notified: app failed to initialize");
    }
}

/// Identity provider with fixed silent and interactive outcomes.
pub struct ScriptedProvider {
    pub silent: ScriptedOutcome,
    pub interactive: ScriptedOutcome,
    pub access_token: String,
    pub accounts: Vec<String>,
}

impl ScriptedProvider {
    fn respond(&self, outcome: ScriptedOutcome) -> Result<ProviderTokenResponse, ProviderError> {
        match outcome {
            ScriptedOutcome::Ok => Ok(ProviderTokenResponse {
                access_token: self.access_token.clone(),
                accounts: self
                    .accounts
                    .iter()
                    .map(|name| ProviderAccount {
                        name: Some(name.clone()),
                        username: None,
                    })
                    .collect(),
            }),
            ScriptedOutcome::InteractionRequired => Err(ProviderError::InteractionRequired(
                "interaction_required".into(),
            )),
            ScriptedOutcome::Error => Err(ProviderError::Other("scripted provider error".into())),
        }
    }
}

#[async_trait]
impl IdentityProvider for ScriptedProvider {
    async fn acquire_token_silent(
        &self,
        request: &SilentTokenRequest,
    ) -> Result<ProviderTokenResponse, ProviderError> {
        info!(
            scopes = ?request.scopes,
            login_hint = ?request.login_hint,
            "Silent token requested"
        );
        self.respond(self.silent)
    }

    async fn acquire_token_interactive(
        &self,
        request: &InteractiveTokenRequest,
    ) -> Result<ProviderTokenResponse, ProviderError> {
        info!(redirect_uri = %request.redirect_uri, "Interactive sign-in requested");
        self.respond(self.interactive)
    }

    async fn start_redirect(&self, request: &InteractiveTokenRequest) -> Result<(), ProviderError> {
        info!(redirect_uri = %request.redirect_uri, "Redirect started");
        match self.interactive {
            ScriptedOutcome::Error => Err(ProviderError::Other("redirect blocked".into())),
            _ => Ok(()),
        }
    }

    async fn sign_out(&self, client_id: &str) -> Result<(), ProviderError> {
        info!(client_id = %client_id, "Signed out");
        Ok(())
    }
}
