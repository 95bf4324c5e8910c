#![allow(dead_code)]

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use host_context_probe::{HostContext, HostContextPublisher};
use parking_lot::Mutex;
use sso_config::AuthConfig;
use sso_orchestrator::{
    BridgeState, HostChannelError, HostTokenCallbacks, HostTokenChannel, IdentityBridge,
    IdentityProvider, InitFailureReason, InteractiveTokenRequest, ProviderAccount, ProviderError,
    ProviderTokenResponse, SilentTokenRequest, SsoOrchestrator, TokenSupplier,
};
use std::collections::VecDeque;
use std::sync::Arc;

/// Build an unsigned compact token carrying the given JSON claims.
pub fn jwt(claims: &str) -> String {
    format!(
        "{}.{}.unsigned",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#),
        URL_SAFE_NO_PAD.encode(claims)
    )
}

pub fn response(token: &str, accounts: &[&str]) -> ProviderTokenResponse {
    ProviderTokenResponse {
        access_token: token.to_string(),
        accounts: accounts
            .iter()
            .map(|name| ProviderAccount {
                name: Some(name.to_string()),
                username: None,
            })
            .collect(),
    }
}

pub fn interaction_required() -> ProviderError {
    ProviderError::InteractionRequired("AADSTS50058: no cached session".into())
}

/// Config for a delegated-permission app.
pub fn delegated_config() -> AuthConfig {
    AuthConfig {
        application_id: Some("app1".into()),
        resource_uri: "api://app.example/app1".into(),
        scopes: Some(vec!["User.Read".into()]),
        redirect_uri: Some("https://app.example/auth-end".into()),
        auto_login: false,
        ..AuthConfig::default()
    }
}

/// Config that accepts the host token as-is.
pub fn host_only_config() -> AuthConfig {
    AuthConfig {
        auto_login: false,
        ..AuthConfig::for_resource("api://app.example/app1")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostNotification {
    Success,
    Failure(InitFailureReason, String),
}

pub enum HostScript {
    Token(String),
    Fail(String),
    /// Never settles.
    Hang,
    /// Parks the request until the test settles it through the callbacks.
    Gated,
}

/// Host channel that answers from a script and records every call.
pub struct FakeHost {
    script: Mutex<VecDeque<HostScript>>,
    pub requests: Mutex<Vec<String>>,
    pub notifications: Mutex<Vec<HostNotification>>,
    pub gates: Mutex<Vec<HostTokenCallbacks>>,
}

impl FakeHost {
    pub fn new(script: Vec<HostScript>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            notifications: Mutex::new(Vec::new()),
            gates: Mutex::new(Vec::new()),
        })
    }

    pub fn issuing(token: String) -> Arc<Self> {
        Self::new(vec![HostScript::Token(token)])
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn gate(&self, index: usize) -> HostTokenCallbacks {
        self.gates.lock()[index].clone()
    }
}

#[async_trait]
impl HostTokenChannel for FakeHost {
    async fn request_token(&self, resource_uri: &str) -> Result<String, HostChannelError> {
        self.requests.lock().push(resource_uri.to_string());
        let step = self.script.lock().pop_front();
        match step {
            Some(HostScript::Token(token)) => Ok(token),
            Some(HostScript::Fail(reason)) => Err(HostChannelError::new(reason)),
            Some(HostScript::Hang) => std::future::pending().await,
            Some(HostScript::Gated) => {
                let (callbacks, pending) = HostTokenCallbacks::channel();
                self.gates.lock().push(callbacks);
                pending.wait().await
            }
            None => Err(HostChannelError::new("unscripted host request")),
        }
    }

    fn notify_success(&self) {
        self.notifications.lock().push(HostNotification::Success);
    }

    fn notify_failure(&self, reason: InitFailureReason, message: &str) {
        self.notifications
            .lock()
            .push(HostNotification::Failure(reason, message.to_string()));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Silent(SilentTokenRequest),
    Interactive(InteractiveTokenRequest),
    Redirect(InteractiveTokenRequest),
    SignOut(String),
}

type Scripted = Mutex<VecDeque<Result<ProviderTokenResponse, ProviderError>>>;

/// Identity provider answering from per-call scripts.
#[derive(Default)]
pub struct FakeProvider {
    silent: Scripted,
    interactive: Scripted,
    redirect_error: Mutex<Option<ProviderError>>,
    pub calls: Mutex<Vec<ProviderCall>>,
}

impl FakeProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_silent(
        silent: Vec<Result<ProviderTokenResponse, ProviderError>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            silent: Mutex::new(silent.into()),
            ..Self::default()
        })
    }

    pub fn with_escalation(
        interactive: Result<ProviderTokenResponse, ProviderError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            silent: Mutex::new(vec![Err(interaction_required())].into()),
            interactive: Mutex::new(vec![interactive].into()),
            ..Self::default()
        })
    }

    pub fn fail_redirect(&self, err: ProviderError) {
        *self.redirect_error.lock() = Some(err);
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().clone()
    }

    pub fn silent_calls(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, ProviderCall::Silent(_)))
            .count()
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn acquire_token_silent(
        &self,
        request: &SilentTokenRequest,
    ) -> Result<ProviderTokenResponse, ProviderError> {
        self.calls.lock().push(ProviderCall::Silent(request.clone()));
        self.silent
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Other("unscripted silent request".into())))
    }

    async fn acquire_token_interactive(
        &self,
        request: &InteractiveTokenRequest,
    ) -> Result<ProviderTokenResponse, ProviderError> {
        self.calls
            .lock()
            .push(ProviderCall::Interactive(request.clone()));
        self.interactive
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Other("unscripted interactive request".into())))
    }

    async fn start_redirect(&self, request: &InteractiveTokenRequest) -> Result<(), ProviderError> {
        self.calls.lock().push(ProviderCall::Redirect(request.clone()));
        match self.redirect_error.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn sign_out(&self, client_id: &str) -> Result<(), ProviderError> {
        self.calls
            .lock()
            .push(ProviderCall::SignOut(client_id.to_string()));
        Ok(())
    }
}

/// Identity bridge that records what it was handed.
#[derive(Default)]
pub struct RecordingBridge {
    pub supplier: Mutex<Option<Arc<dyn TokenSupplier>>>,
    pub states: Mutex<Vec<BridgeState>>,
}

impl RecordingBridge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn states(&self) -> Vec<BridgeState> {
        self.states.lock().clone()
    }
}

impl IdentityBridge for RecordingBridge {
    fn attach(&self, supplier: Arc<dyn TokenSupplier>) {
        *self.supplier.lock() = Some(supplier);
    }

    fn set_state(&self, state: BridgeState) {
        self.states.lock().push(state);
    }
}

pub struct Harness {
    pub orchestrator: Arc<SsoOrchestrator>,
    pub host: Arc<FakeHost>,
    pub provider: Arc<FakeProvider>,
    pub context: HostContextPublisher,
}

pub fn harness(
    config: AuthConfig,
    context: HostContext,
    host: Arc<FakeHost>,
    provider: Arc<FakeProvider>,
) -> Harness {
    let publisher = HostContextPublisher::resolved(context);
    let orchestrator = SsoOrchestrator::new(
        config,
        host.clone(),
        provider.clone(),
        publisher.subscribe(),
    );
    Harness {
        orchestrator: Arc::new(orchestrator),
        host,
        provider,
        context: publisher,
    }
}

/// Yield to spawned tasks until `ready` holds.
pub async fn settle_until(mut ready: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if ready() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}
