//! Login attempt state machine using rust-fsm.
//!
//! ## State Diagram
//!
//! ```text
//! ┌─────────────────┐   AttemptRejected (misconfigured)
//! │     Unknown     │ ─────────────────────────────────┐
//! └────────┬────────┘                                  │
//!          │ LoginAttempt                              │
//!          ▼                                           ▼
//! ┌─────────────────┐  AttemptFailed        ┌─────────────────┐
//! │    LoggingIn    │ ────────────────────► │     Failed      │
//! └────────┬────────┘                       └─────────────────┘
//!          │                                           ▲
//!          │ InteractionRequired                       │ AttemptFailed
//!          ▼                                           │
//! ┌─────────────────┐ ─────────────────────────────────┘
//! │ WaitingForUser  │
//! └────────┬────────┘
//!          │ TokenAcquired (also straight from LoggingIn)
//!          ▼
//! ┌─────────────────┐
//! │    LoggedIn     │
//! └─────────────────┘
//! ```
//!
//! `LoggedIn` and `Failed` end an attempt; `LoginAttempt` starts a new one
//! from any state. `Reset` (logout) is the only way back to `Unknown`.

use rust_fsm::*;
use serde::{Deserialize, Serialize};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub sso_machine(Unknown)

    Unknown => {
        LoginAttempt => LoggingIn,
        AttemptRejected => Failed,
        Reset => Unknown
    },
    LoggingIn => {
        // Overlapping attempts are allowed; stale results are discarded by generation
        LoginAttempt => LoggingIn,
        TokenAcquired => LoggedIn,
        InteractionRequired => WaitingForUser,
        AttemptFailed => Failed,
        AttemptRejected => Failed,
        Reset => Unknown
    },
    WaitingForUser => {
        LoginAttempt => LoggingIn,
        TokenAcquired => LoggedIn,
        AttemptFailed => Failed,
        AttemptRejected => Failed,
        Reset => Unknown
    },
    LoggedIn => {
        LoginAttempt => LoggingIn,
        AttemptRejected => Failed,
        Reset => Unknown
    },
    Failed => {
        LoginAttempt => LoggingIn,
        AttemptRejected => Failed,
        Reset => Unknown
    }
}

pub use sso_machine::Input as SsoMachineInput;
pub use sso_machine::State as SsoMachineState;
pub use sso_machine::StateMachine as SsoMachine;

/// Published authentication status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    /// No attempt made since start or since the last logout.
    Unknown,
    /// An attempt is in flight.
    LoggingIn,
    /// Silent acquisition failed; an interactive step is pending.
    WaitingForUser,
    /// A token was acquired.
    LoggedIn,
    /// The attempt failed; see the published error.
    Error,
}

impl AuthStatus {
    /// Returns true if the status ends an attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AuthStatus::LoggedIn | AuthStatus::Error)
    }

    /// Returns true while an attempt is in progress.
    pub fn is_pending(&self) -> bool {
        matches!(self, AuthStatus::LoggingIn | AuthStatus::WaitingForUser)
    }
}

impl From<&SsoMachineState> for AuthStatus {
    fn from(state: &SsoMachineState) -> Self {
        match state {
            SsoMachineState::Unknown => AuthStatus::Unknown,
            SsoMachineState::LoggingIn => AuthStatus::LoggingIn,
            SsoMachineState::WaitingForUser => AuthStatus::WaitingForUser,
            SsoMachineState::LoggedIn => AuthStatus::LoggedIn,
            SsoMachineState::Failed => AuthStatus::Error,
        }
    }
}

/// Serializable view of a published snapshot. Never carries the token itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStateChangedPayload {
    pub status: AuthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub has_token: bool,
    pub identity_bridge_ready: bool,
}
