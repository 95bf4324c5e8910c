//! Publishes the resolved host context to interested parties.

use crate::types::HostContext;
use tokio::sync::watch;
use tracing::info;

/// Owner of the host context channel.
///
/// Starts at [`HostContext::Unknown`]. Once resolved, later publishes that
/// change the value are still delivered; consumers decide whether they care.
pub struct HostContextPublisher {
    tx: watch::Sender<HostContext>,
}

impl HostContextPublisher {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(HostContext::Unknown);
        Self { tx }
    }

    /// Publisher that is already resolved.
    pub fn resolved(context: HostContext) -> Self {
        let publisher = Self::new();
        publisher.publish(context);
        publisher
    }

    /// Publish a context. Returns true when the value changed.
    pub fn publish(&self, context: HostContext) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == context {
                false
            } else {
                *current = context;
                true
            }
        });
        if changed {
            info!(context = ?context, "Host context published");
        }
        changed
    }

    /// Latest published value.
    pub fn current(&self) -> HostContext {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<HostContext> {
        self.tx.subscribe()
    }
}

impl Default for HostContextPublisher {
    fn default() -> Self {
        Self::new()
    }
}
