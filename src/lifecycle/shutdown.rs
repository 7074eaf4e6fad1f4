//! Cancellation signal for a running batch.

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

/// Broadcast-based cancellation coordinator.
///
/// The batch driver and the submission engine hold a receiver; triggering
/// makes any pending backoff wait return early.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve once the signal fires.
///
/// A dropped coordinator can never fire, so this then stays pending.
pub async fn cancelled(rx: &mut broadcast::Receiver<()>) {
    loop {
        match rx.recv().await {
            Ok(()) | Err(RecvError::Lagged(_)) => return,
            Err(RecvError::Closed) => std::future::pending::<()>().await,
        }
    }
}

/// Non-blocking check used between attempts.
pub fn is_cancelled(rx: &mut broadcast::Receiver<()>) -> bool {
    match rx.try_recv() {
        Ok(()) | Err(TryRecvError::Lagged(_)) => true,
        Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_reaches_subscriber() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        assert!(!is_cancelled(&mut rx));

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), cancelled(&mut rx))
            .await
            .expect("signal should arrive");
    }

    #[tokio::test]
    async fn test_try_check_sees_trigger() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        shutdown.trigger();
        assert!(is_cancelled(&mut rx));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_coordinator_never_fires() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        drop(shutdown);

        assert!(!is_cancelled(&mut rx));
        let waited = tokio::time::timeout(Duration::from_secs(60), cancelled(&mut rx)).await;
        assert!(waited.is_err());
    }
}
