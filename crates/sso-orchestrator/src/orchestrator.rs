//! SSO orchestrator.
//!
//! Chooses a token channel from the host context, escalates to interactive
//! sign-in when the identity provider requires it, and funnels every outcome
//! into the session store. Failures never escape `login()`; they are
//! published as `AuthStatus::Error` with a descriptive error.

use crate::bridge::{BridgeState, IdentityBridge, SnapshotTokenSupplier};
use crate::claims::decode_token_claims;
use crate::error::{AuthError, AuthResult};
use crate::provider::{
    HostTokenChannel, IdentityProvider, InitFailureReason, InteractiveTokenRequest,
    ProviderTokenResponse, SilentTokenRequest,
};
use crate::session::{AuthSnapshot, SessionStore, SnapshotListener, SubscriptionId};
use crate::AuthStatus;
use host_context_probe::HostContext;
use parking_lot::Mutex;
use sso_config::{AuthConfig, MissingSetting};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Result of a [`SsoOrchestrator::logout`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// Session cleared and provider sign-out triggered.
    SignedOut,
    /// No application id is configured, so there is no session to end.
    NothingToSignOut,
}

/// Owns the auth session and runs login attempts against the collaborators.
pub struct SsoOrchestrator {
    config: AuthConfig,
    host: Arc<dyn HostTokenChannel>,
    provider: Arc<dyn IdentityProvider>,
    host_context: watch::Receiver<HostContext>,
    session: SessionStore,
    bridge: Option<Arc<dyn IdentityBridge>>,
    bridge_state: Mutex<Option<BridgeState>>,
    auto_login_started: AtomicBool,
}

impl SsoOrchestrator {
    pub fn new(
        config: AuthConfig,
        host: Arc<dyn HostTokenChannel>,
        provider: Arc<dyn IdentityProvider>,
        host_context: watch::Receiver<HostContext>,
    ) -> Self {
        Self {
            config,
            host,
            provider,
            host_context,
            session: SessionStore::new(),
            bridge: None,
            bridge_state: Mutex::new(None),
            auto_login_started: AtomicBool::new(false),
        }
    }

    /// Hand a token supplier to an identity bridge integration.
    ///
    /// Ignored unless `use_identity_bridge` is configured.
    pub fn with_identity_bridge(mut self, bridge: Arc<dyn IdentityBridge>) -> Self {
        if !self.config.use_identity_bridge {
            warn!("Identity bridge supplied but use_identity_bridge is off; ignoring it");
            return self;
        }

        bridge.attach(Arc::new(self.token_supplier()));
        self.bridge = Some(bridge);
        self.sync_bridge();
        self
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Start the configured auto-login. Runs at most once per orchestrator.
    pub fn start(self: &Arc<Self>) -> Option<JoinHandle<AuthStatus>> {
        if !self.config.auto_login {
            debug!("Auto-login disabled");
            return None;
        }
        if self.auto_login_started.swap(true, Ordering::SeqCst) {
            debug!("Auto-login already started");
            return None;
        }
        Some(self.spawn_login())
    }

    /// Run [`login`](Self::login) on a background task.
    pub fn spawn_login(self: &Arc<Self>) -> JoinHandle<AuthStatus> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.login().await })
    }

    /// Run one login attempt and return the resulting status.
    ///
    /// Waits for the host context to resolve before choosing a channel.
    /// Overlapping calls are allowed; results of a superseded attempt are
    /// discarded.
    pub async fn login(&self) -> AuthStatus {
        let result = match self.resolved_host_context().await {
            Some(HostContext::Embedded) => self.login_in_host().await,
            Some(_) => self.login_standalone().await,
            None => {
                warn!("Host context publisher went away before resolving");
                self.session
                    .reject(AuthError::HostContextUnavailable)
                    .map(|_| ())
            }
        };

        if let Err(err) = result {
            error!(error = %err, "Login flow rejected by the auth state machine");
        }

        self.sync_bridge();
        self.status()
    }

    /// Clear the session and sign out of the identity provider.
    pub async fn logout(&self) -> LogoutOutcome {
        let client_id = match self.config.require_application_id() {
            Ok(id) => id.to_string(),
            Err(_) => {
                warn!("Logout requested without an application id; nothing to sign out");
                return LogoutOutcome::NothingToSignOut;
            }
        };

        if let Err(err) = self.session.reset() {
            error!(error = %err, "Failed to reset auth session");
        }
        self.sync_bridge();

        info!("Signing out");
        if let Err(err) = self.provider.sign_out(&client_id).await {
            warn!(error = %err, "Identity provider sign-out failed");
        }
        LogoutOutcome::SignedOut
    }

    pub fn snapshot(&self) -> Arc<AuthSnapshot> {
        self.session.snapshot()
    }

    pub fn status(&self) -> AuthStatus {
        self.session.snapshot().status
    }

    /// Receiver that observes every published snapshot.
    pub fn watch(&self) -> watch::Receiver<Arc<AuthSnapshot>> {
        self.session.watch()
    }

    pub fn subscribe(&self, listener: SnapshotListener) -> SubscriptionId {
        self.session.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.session.unsubscribe(id)
    }

    pub fn token_supplier(&self) -> SnapshotTokenSupplier {
        SnapshotTokenSupplier::new(self.session.watch())
    }

    async fn resolved_host_context(&self) -> Option<HostContext> {
        let mut rx = self.host_context.clone();
        if !rx.borrow().is_resolved() {
            debug!("Waiting for host context before logging in");
        }
        let resolved = match rx.wait_for(HostContext::is_resolved).await {
            Ok(context) => Some(*context),
            Err(_) => None,
        };
        resolved
    }

    /// Embedded: the host issues the token, optionally exchanged for a
    /// delegated one.
    async fn login_in_host(&self) -> AuthResult<()> {
        let generation = self.session.begin_attempt()?;
        info!(generation, resource = %self.config.resource_uri, "Requesting token from host");

        let timeout = self.config.host_token_timeout();
        let requested = self.host.request_token(&self.config.resource_uri);
        let host_token = match tokio::time::timeout(timeout, requested).await {
            Ok(Ok(token)) => token,
            Ok(Err(err)) => {
                self.notify_host_failure(generation, &err.reason);
                return self.fail(generation, err.into());
            }
            Err(_) => {
                let err = AuthError::HostTimeout(timeout);
                self.notify_host_failure(generation, &err.to_string());
                return self.fail(generation, err);
            }
        };

        let claims = match decode_token_claims(&host_token) {
            Ok(claims) => claims,
            Err(err) => {
                self.notify_host_failure(generation, &err.to_string());
                return self.fail(generation, err);
            }
        };
        if self.session.is_current(generation) {
            self.host.notify_success();
        } else {
            debug!(generation, "Superseded attempt; host not notified");
        }
        if let Some(name) = claims.name.clone() {
            if !self.session.resolve_principal(generation, name)? {
                return Ok(());
            }
        }

        let Some(scopes) = self.config.delegated_scopes() else {
            if self.session.token_acquired(generation, host_token, None)? {
                info!(generation, "Logged in with host token");
            }
            return Ok(());
        };

        let client_id = match self.config.require_application_id() {
            Ok(id) => id,
            Err(missing) => return self.misconfigured(generation, missing),
        };

        let request = SilentTokenRequest {
            client_id: client_id.to_string(),
            scopes: scopes.to_vec(),
            login_hint: claims.login_hint().map(String::from),
        };
        debug!(generation, "Exchanging host token for a delegated token");

        match self.provider.acquire_token_silent(&request).await {
            Ok(response) => self.accept(generation, response),
            Err(err) if err.is_interaction_required() => {
                info!(generation, reason = %err, "Delegated exchange needs interaction");
                let interactive = match self.interactive_request(&request) {
                    Ok(interactive) => interactive,
                    Err(missing) => return self.misconfigured(generation, missing),
                };
                if !self.session.interaction_required(generation)? {
                    return Ok(());
                }
                // Fire and forget: the host observes the redirect outcome
                if let Err(err) = self.provider.start_redirect(&interactive).await {
                    return self.fail(generation, AuthError::InteractiveFlow(err.to_string()));
                }
                info!(generation, "Redirect started");
                Ok(())
            }
            Err(err) => self.fail(generation, AuthError::Provider(err.to_string())),
        }
    }

    /// Standalone: silent provider acquisition, then popup or redirect.
    async fn login_standalone(&self) -> AuthResult<()> {
        let request = match self.standalone_request() {
            Ok(request) => request,
            Err(missing) => {
                warn!(missing = %missing, "Cannot log in outside the host");
                self.session.reject(missing.into())?;
                return Ok(());
            }
        };

        let generation = self.session.begin_attempt()?;
        info!(generation, "Acquiring token silently from identity provider");

        match self.provider.acquire_token_silent(&request).await {
            Ok(response) => self.accept(generation, response),
            Err(err) if err.is_interaction_required() => {
                info!(generation, reason = %err, "Silent acquisition needs interaction");
                if !self.session.interaction_required(generation)? {
                    return Ok(());
                }
                let interactive = match self.interactive_request(&request) {
                    Ok(interactive) => interactive,
                    Err(missing) => return self.misconfigured(generation, missing),
                };
                match self.provider.acquire_token_interactive(&interactive).await {
                    Ok(response) => self.accept(generation, response),
                    Err(err) => {
                        self.fail(generation, AuthError::InteractiveFlow(err.to_string()))
                    }
                }
            }
            Err(err) => self.fail(generation, AuthError::Provider(err.to_string())),
        }
    }

    fn standalone_request(&self) -> Result<SilentTokenRequest, MissingSetting> {
        let scopes = self.config.require_scopes()?;
        let client_id = self.config.require_application_id()?;
        Ok(SilentTokenRequest {
            client_id: client_id.to_string(),
            scopes: scopes.to_vec(),
            login_hint: None,
        })
    }

    fn interactive_request(
        &self,
        silent: &SilentTokenRequest,
    ) -> Result<InteractiveTokenRequest, MissingSetting> {
        let redirect_uri = self.config.require_redirect_uri()?;
        Ok(InteractiveTokenRequest {
            client_id: silent.client_id.clone(),
            scopes: silent.scopes.clone(),
            redirect_uri: redirect_uri.to_string(),
        })
    }

    fn accept(&self, generation: u64, response: ProviderTokenResponse) -> AuthResult<()> {
        let principal = response.single_account_name().map(String::from);
        if principal.is_none() && response.accounts.len() > 1 {
            debug!(
                generation,
                accounts = response.accounts.len(),
                "Multiple accounts returned; principal left unresolved"
            );
        }
        if self
            .session
            .token_acquired(generation, response.access_token, principal)?
        {
            info!(generation, "Logged in with identity provider token");
        }
        Ok(())
    }

    /// Tell the host the app failed to initialize, unless a newer attempt
    /// or a logout has taken over.
    fn notify_host_failure(&self, generation: u64, message: &str) {
        if !self.session.is_current(generation) {
            debug!(generation, "Superseded attempt; host not notified");
            return;
        }
        self.host.notify_failure(InitFailureReason::AuthFailed, message);
    }

    fn misconfigured(&self, generation: u64, missing: MissingSetting) -> AuthResult<()> {
        if self.session.fail(generation, missing.into())? {
            warn!(generation, missing = %missing, "Login misconfigured");
        }
        Ok(())
    }

    fn fail(&self, generation: u64, err: AuthError) -> AuthResult<()> {
        let message = err.to_string();
        if self.session.fail(generation, err)? {
            warn!(generation, error = %message, "Login attempt failed");
        }
        Ok(())
    }

    /// Push the coarse sign-in state to the bridge when it changes.
    fn sync_bridge(&self) {
        let Some(bridge) = &self.bridge else {
            return;
        };

        let snapshot = self.session.snapshot();
        let state = BridgeState::for_snapshot(&snapshot);
        let changed = {
            let mut last = self.bridge_state.lock();
            let changed = *last != Some(state);
            *last = Some(state);
            changed
        };
        if changed {
            debug!(state = ?state, "Updating identity bridge state");
            bridge.set_state(state);
        }

        if snapshot.has_token() && !snapshot.identity_bridge_ready {
            self.session.mark_bridge_ready();
        }
    }
}
