//! Host embedding detection.
//!
//! The heuristic checks, in order, first match wins:
//! 1. unframed window carrying the host's native bridge marker (desktop shells)
//! 2. user agent containing the host product token
//! 3. window name equal to one of the host container markers
//!
//! If the host SDK did not load, the answer is always `false`.

use crate::types::{HostContext, HostSignals};
use tracing::debug;

/// Product token the host adds to its user agent.
pub const HOST_PRODUCT_TOKEN: &str = "Teams";

/// Window name used by tab embeddings.
pub const EMBEDDED_PAGE_CONTAINER: &str = "embedded-page-container";

/// Window name used by extension tab frames.
pub const EXTENSION_TAB_FRAME: &str = "extension-tab-frame";

/// Run the detection heuristic on a signal snapshot.
pub fn probe_host_embedding(signals: &HostSignals) -> bool {
    if !signals.sdk_loaded {
        return false;
    }

    if signals.top_is_self && signals.native_bridge_present {
        return true;
    }

    if signals.user_agent.contains(HOST_PRODUCT_TOKEN) {
        return true;
    }

    matches!(
        signals.window_name.as_str(),
        EMBEDDED_PAGE_CONTAINER | EXTENSION_TAB_FRAME
    )
}

/// Source of environment signals.
///
/// Returns `None` while the hosting environment is still loading.
pub trait SignalSource: Send + Sync {
    fn read_signals(&self) -> Option<HostSignals>;
}

impl SignalSource for HostSignals {
    fn read_signals(&self) -> Option<HostSignals> {
        Some(self.clone())
    }
}

/// Probe bound to a signal source.
pub struct HostContextProbe<S> {
    source: S,
}

impl<S: SignalSource> HostContextProbe<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Current host context. Side-effect free; stable once the source has loaded.
    pub fn probe(&self) -> HostContext {
        match self.source.read_signals() {
            Some(signals) => {
                let embedded = probe_host_embedding(&signals);
                debug!(embedded, "Host embedding probed");
                HostContext::from(embedded)
            }
            None => HostContext::Unknown,
        }
    }
}
