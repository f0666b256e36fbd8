//! Cooperative cancellation.
//!
//! Cancellation is a polled flag, not asynchronous unwinding: the pipeline
//! checks the token at defined checkpoints between stages, and the runner
//! additionally races the flag against a child's exit so a blocking wait can
//! be aborted.

use tokio::sync::watch;

/// Raises the cancellation flag. Held by whoever owns the job's lifetime.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// Observes the cancellation flag. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

/// Create a connected handle/token pair.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

impl CancelHandle {
    /// Raise the flag. Idempotent, never blocks.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Another token observing this handle.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }
}

impl CancelToken {
    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested. If the handle is dropped
    /// without cancelling, this pends forever.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_observes_cancel() {
        let (handle, token) = cancel_pair();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
        token.cancelled().await;
    }

    #[tokio::test]
    async fn dropped_handle_never_cancels() {
        let (handle, token) = cancel_pair();
        drop(handle);
        assert!(!token.is_cancelled());
        let pending = tokio::time::timeout(std::time::Duration::from_millis(50), token.cancelled());
        assert!(pending.await.is_err());
    }
}
