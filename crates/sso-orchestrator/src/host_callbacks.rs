//! Adapter from the host SDK's callback pair to an awaited result.
//!
//! The host hands out `onSuccess(token)` / `onFailure(reason)` callbacks.
//! [`HostTokenCallbacks`] can be cloned into both; the first one to fire
//! settles the [`PendingHostToken`], later calls are ignored.

use crate::error::HostChannelError;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

type Settle = oneshot::Sender<Result<String, HostChannelError>>;

/// Callback half handed to the host SDK.
#[derive(Clone)]
pub struct HostTokenCallbacks {
    settle: Arc<Mutex<Option<Settle>>>,
}

/// Awaitable half kept by the [`HostTokenChannel`](crate::HostTokenChannel) implementation.
pub struct PendingHostToken {
    rx: oneshot::Receiver<Result<String, HostChannelError>>,
}

impl HostTokenCallbacks {
    /// Create a connected callback/pending pair.
    pub fn channel() -> (HostTokenCallbacks, PendingHostToken) {
        let (tx, rx) = oneshot::channel();
        (
            HostTokenCallbacks {
                settle: Arc::new(Mutex::new(Some(tx))),
            },
            PendingHostToken { rx },
        )
    }

    /// Success callback. Returns false if the request was already settled.
    pub fn succeed(&self, token: impl Into<String>) -> bool {
        self.settle_with(Ok(token.into()))
    }

    /// Failure callback. Returns false if the request was already settled.
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.settle_with(Err(HostChannelError::new(reason)))
    }

    pub fn is_settled(&self) -> bool {
        self.settle.lock().is_none()
    }

    fn settle_with(&self, result: Result<String, HostChannelError>) -> bool {
        let Some(tx) = self.settle.lock().take() else {
            debug!("Host token callback fired after the request settled");
            return false;
        };
        // A dropped receiver means the orchestrator stopped waiting (timeout)
        tx.send(result).is_ok()
    }
}

impl PendingHostToken {
    /// Wait for whichever host callback fires first.
    pub async fn wait(self) -> Result<String, HostChannelError> {
        self.rx
            .await
            .unwrap_or_else(|_| Err(HostChannelError::new("host dropped the token request")))
    }
}
