//! Single sign-on orchestration for apps embedded in the collaboration host.
//!
//! This crate provides:
//! - An explicit FSM for the login attempt lifecycle
//! - Silent token acquisition through the host or the identity provider
//! - Escalation to interactive sign-in when the provider requires it
//! - A published, subscribable auth snapshot
//! - A token supplier for identity bridge integrations
//!
//! Token claims are decoded WITHOUT signature verification. The decoded
//! name and login hint are display and routing hints only; verifying a
//! token is the job of the server that receives it.

mod auth_fsm;
mod bridge;
mod claims;
mod error;
mod host_callbacks;
mod orchestrator;
mod provider;
mod session;

pub use auth_fsm::sso_machine;
pub use auth_fsm::{
    AuthStateChangedPayload, AuthStatus, SsoMachine, SsoMachineInput, SsoMachineState,
};
pub use bridge::{BridgeState, IdentityBridge, SnapshotTokenSupplier, TokenSupplier};
pub use claims::{decode_token_claims, TokenClaims};
pub use error::{AuthError, AuthResult, HostChannelError, ProviderError};
pub use host_callbacks::{HostTokenCallbacks, PendingHostToken};
pub use orchestrator::{LogoutOutcome, SsoOrchestrator};
pub use provider::{
    HostTokenChannel, IdentityProvider, InitFailureReason, InteractiveTokenRequest,
    ProviderAccount, ProviderTokenResponse, SilentTokenRequest,
};
pub use session::{AuthSnapshot, SnapshotListener, SubscriptionId};
