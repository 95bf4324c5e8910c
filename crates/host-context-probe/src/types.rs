//! Types shared by the probe and its consumers.

use serde::{Deserialize, Serialize};

/// Whether the app is embedded in the host.
///
/// `Unknown` means the environment has not finished loading; consumers must
/// wait for `Embedded` or `Standalone` before branching on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostContext {
    #[default]
    Unknown,
    Embedded,
    Standalone,
}

impl HostContext {
    /// Returns true once the context is known either way.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, HostContext::Unknown)
    }

    /// `Some(true)` when embedded, `Some(false)` when standalone, `None` while unknown.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostContext::Unknown => None,
            HostContext::Embedded => Some(true),
            HostContext::Standalone => Some(false),
        }
    }
}

impl From<bool> for HostContext {
    fn from(embedded: bool) -> Self {
        if embedded {
            HostContext::Embedded
        } else {
            HostContext::Standalone
        }
    }
}

/// Snapshot of the environment signals the heuristic reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSignals {
    /// The host SDK module loaded. When false nothing else matters.
    pub sdk_loaded: bool,
    /// The top-level browsing context is this window (no framing).
    pub top_is_self: bool,
    /// The host injected its native bridge marker object.
    pub native_bridge_present: bool,
    /// Browser user-agent string.
    pub user_agent: String,
    /// The window's assigned name.
    pub window_name: String,
}

impl HostSignals {
    /// Signals for a plain top-level page with the SDK loaded and nothing else.
    pub fn sdk_loaded() -> Self {
        Self {
            sdk_loaded: true,
            top_is_self: true,
            ..Default::default()
        }
    }
}
