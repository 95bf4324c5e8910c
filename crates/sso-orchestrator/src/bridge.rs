//! Identity bridge integration.
//!
//! External toolkits that make their own authenticated calls pull tokens
//! from a [`TokenSupplier`] handed to them once, instead of reading any
//! process-wide provider registration.

use crate::error::{AuthError, AuthResult};
use crate::session::AuthSnapshot;
use std::sync::Arc;
use tokio::sync::watch;

/// Pull-based access to the current token.
pub trait TokenSupplier: Send + Sync {
    /// Current token, or [`AuthError::NoToken`] when none has been acquired.
    fn current_token(&self) -> AuthResult<String>;
}

/// Coarse sign-in state pushed to the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Loading,
    SignedIn,
}

impl BridgeState {
    pub(crate) fn for_snapshot(snapshot: &AuthSnapshot) -> Self {
        if snapshot.has_token() {
            BridgeState::SignedIn
        } else {
            BridgeState::Loading
        }
    }
}

/// An external integration that authenticates with orchestrator tokens.
pub trait IdentityBridge: Send + Sync {
    /// Receive the token supplier. Called once.
    fn attach(&self, supplier: Arc<dyn TokenSupplier>);

    /// Called whenever the bridge state changes.
    fn set_state(&self, state: BridgeState);
}

/// Token supplier reading the orchestrator's published snapshot.
#[derive(Clone)]
pub struct SnapshotTokenSupplier {
    rx: watch::Receiver<Arc<AuthSnapshot>>,
}

impl SnapshotTokenSupplier {
    pub(crate) fn new(rx: watch::Receiver<Arc<AuthSnapshot>>) -> Self {
        Self { rx }
    }
}

impl TokenSupplier for SnapshotTokenSupplier {
    fn current_token(&self) -> AuthResult<String> {
        self.rx.borrow().token.clone().ok_or(AuthError::NoToken)
    }
}
