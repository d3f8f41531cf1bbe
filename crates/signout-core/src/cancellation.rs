//! Batch cancellation handle.
//!
//! Cancelling never discards results already obtained: the pool stops starting
//! new remote calls and the protocol stops entering new phases, then every
//! unresolved element is reported as cancelled.

use std::sync::Arc;

use tokio::sync::watch;

/// Cloneable, level-triggered cancellation flag shared between the caller and
/// a running batch.
#[derive(Debug, Clone)]
pub struct BatchCancellation {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for BatchCancellation {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchCancellation {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        if !self.tx.send_replace(true) {
            tracing::debug!("Batch cancellation requested");
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once cancellation has been requested.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}
