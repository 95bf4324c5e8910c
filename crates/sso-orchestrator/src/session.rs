//! Published auth session.
//!
//! The store is the only writer of [`AuthSnapshot`]. Every mutation goes
//! through the SSO FSM, is tagged with the generation of the attempt that
//! produced it, and is published only if the snapshot actually changed.

use crate::auth_fsm::{AuthStateChangedPayload, AuthStatus, SsoMachine, SsoMachineInput};
use crate::error::{AuthError, AuthResult};
use parking_lot::{Mutex, ReentrantMutex};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Read-only view of the authentication session.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub status: AuthStatus,
    /// Present only while `status` is `LoggedIn`.
    pub token: Option<String>,
    pub principal_name: Option<String>,
    /// Present only while `status` is `Error`.
    pub error: Option<AuthError>,
    /// Sticky once set.
    pub identity_bridge_ready: bool,
}

impl Default for AuthSnapshot {
    fn default() -> Self {
        Self {
            status: AuthStatus::Unknown,
            token: None,
            principal_name: None,
            error: None,
            identity_bridge_ready: false,
        }
    }
}

impl fmt::Debug for AuthSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSnapshot")
            .field("status", &self.status)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("principal_name", &self.principal_name)
            .field("error", &self.error)
            .field("identity_bridge_ready", &self.identity_bridge_ready)
            .finish()
    }
}

impl AuthSnapshot {
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn to_payload(&self) -> AuthStateChangedPayload {
        AuthStateChangedPayload {
            status: self.status,
            principal_name: self.principal_name.clone(),
            error: self.error.as_ref().map(|e| e.to_string()),
            has_token: self.has_token(),
            identity_bridge_ready: self.identity_bridge_ready,
        }
    }
}

/// Handle returned by [`subscribe`](crate::SsoOrchestrator::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked with every published snapshot.
pub type SnapshotListener = Arc<dyn Fn(&AuthSnapshot) + Send + Sync>;

struct Inner {
    machine: SsoMachine,
    snapshot: Arc<AuthSnapshot>,
    generation: u64,
}

pub(crate) struct SessionStore {
    /// Held from state write through listener fan-out so listeners see
    /// snapshots in publish order. Reentrant so a listener may mutate.
    publish: ReentrantMutex<()>,
    inner: Mutex<Inner>,
    tx: watch::Sender<Arc<AuthSnapshot>>,
    listeners: Mutex<Vec<(SubscriptionId, SnapshotListener)>>,
    next_subscription: AtomicU64,
}

impl SessionStore {
    pub(crate) fn new() -> Self {
        let snapshot = Arc::new(AuthSnapshot::default());
        let (tx, _) = watch::channel(snapshot.clone());
        Self {
            publish: ReentrantMutex::new(()),
            inner: Mutex::new(Inner {
                machine: SsoMachine::new(),
                snapshot,
                generation: 0,
            }),
            tx,
            listeners: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Start a new attempt, superseding any attempt still in flight.
    pub(crate) fn begin_attempt(&self) -> AuthResult<u64> {
        let mut generation = 0;
        self.update(None, Some(SsoMachineInput::LoginAttempt), |inner, snapshot| {
            inner.generation += 1;
            generation = inner.generation;
            snapshot.token = None;
            snapshot.error = None;
        })?;
        Ok(generation)
    }

    /// Fail a login call before any request is issued.
    pub(crate) fn reject(&self, error: AuthError) -> AuthResult<u64> {
        let mut generation = 0;
        self.update(
            None,
            Some(SsoMachineInput::AttemptRejected),
            |inner, snapshot| {
                inner.generation += 1;
                generation = inner.generation;
                snapshot.token = None;
                snapshot.error = Some(error);
            },
        )?;
        Ok(generation)
    }

    pub(crate) fn resolve_principal(&self, generation: u64, name: String) -> AuthResult<bool> {
        self.update(Some(generation), None, |_, snapshot| {
            snapshot.principal_name = Some(name);
        })
    }

    /// Record a token. `principal` overwrites the current name when present.
    pub(crate) fn token_acquired(
        &self,
        generation: u64,
        token: String,
        principal: Option<String>,
    ) -> AuthResult<bool> {
        self.update(
            Some(generation),
            Some(SsoMachineInput::TokenAcquired),
            |_, snapshot| {
                snapshot.token = Some(token);
                snapshot.error = None;
                if principal.is_some() {
                    snapshot.principal_name = principal;
                }
            },
        )
    }

    pub(crate) fn interaction_required(&self, generation: u64) -> AuthResult<bool> {
        self.update(
            Some(generation),
            Some(SsoMachineInput::InteractionRequired),
            |_, _| {},
        )
    }

    pub(crate) fn fail(&self, generation: u64, error: AuthError) -> AuthResult<bool> {
        self.update(
            Some(generation),
            Some(SsoMachineInput::AttemptFailed),
            |_, snapshot| {
                snapshot.token = None;
                snapshot.error = Some(error);
            },
        )
    }

    /// Clear the session and discard every in-flight attempt.
    pub(crate) fn reset(&self) -> AuthResult<()> {
        self.update(None, Some(SsoMachineInput::Reset), |inner, snapshot| {
            inner.generation += 1;
            snapshot.token = None;
            snapshot.principal_name = None;
            snapshot.error = None;
        })?;
        Ok(())
    }

    pub(crate) fn mark_bridge_ready(&self) -> bool {
        self.update(None, None, |_, snapshot| {
            snapshot.identity_bridge_ready = true;
        })
        .unwrap_or(false)
    }

    /// Whether `generation` is still the attempt the session is waiting on.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.inner.lock().generation == generation
    }

    pub(crate) fn snapshot(&self) -> Arc<AuthSnapshot> {
        self.inner.lock().snapshot.clone()
    }

    pub(crate) fn watch(&self) -> watch::Receiver<Arc<AuthSnapshot>> {
        self.tx.subscribe()
    }

    pub(crate) fn subscribe(&self, listener: SnapshotListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Apply one mutation. Returns `Ok(false)` if `generation` is stale.
    fn update(
        &self,
        generation: Option<u64>,
        input: Option<SsoMachineInput>,
        mutate: impl FnOnce(&mut Inner, &mut AuthSnapshot),
    ) -> AuthResult<bool> {
        let _publishing = self.publish.lock();
        let published = {
            let mut inner = self.inner.lock();

            if let Some(generation) = generation {
                if generation != inner.generation {
                    debug!(
                        generation,
                        current_generation = inner.generation,
                        input = ?input,
                        "Discarding result of superseded login attempt"
                    );
                    return Ok(false);
                }
            }

            let old_status = inner.snapshot.status;
            if let Some(input) = &input {
                if inner.machine.consume(input).is_err() {
                    return Err(AuthError::InvalidStateTransition(format!(
                        "Cannot apply {:?} in state {:?}",
                        input,
                        inner.machine.state()
                    )));
                }
            }

            let mut next = AuthSnapshot::clone(&inner.snapshot);
            next.status = AuthStatus::from(inner.machine.state());
            mutate(&mut *inner, &mut next);

            if next == *inner.snapshot {
                return Ok(true);
            }

            if old_status != next.status {
                debug!(
                    old_state = ?old_status,
                    new_state = ?next.status,
                    generation = inner.generation,
                    "Auth state transition"
                );
            }

            let next = Arc::new(next);
            inner.snapshot = next.clone();
            self.tx.send_replace(next.clone());
            next
        };

        let listeners: Vec<SnapshotListener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&published);
        }

        Ok(true)
    }
}
