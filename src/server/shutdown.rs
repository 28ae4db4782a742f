//! Explicit shutdown channel between the signal listener and the accept loop.

use std::sync::Arc;

use tokio::sync::watch;

/// Fires the shutdown. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: Arc<watch::Sender<bool>>,
}

/// Observes the shutdown.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

pub fn channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx: Arc::new(tx) }, ShutdownSignal { rx })
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

impl ShutdownSignal {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Completes once the trigger fires.
    ///
    /// If every trigger is dropped without firing this never completes.
    pub async fn recv(&mut self) {
        let orphaned = self.rx.wait_for(|&triggered| triggered).await.is_err();
        if orphaned {
            std::future::pending::<()>().await;
        }
    }
}

/// Waits for Ctrl-C, or SIGTERM on unix.
pub async fn wait_for_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res?,
            _ = term.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trigger_wakes_every_signal() {
        let (trigger, mut first) = channel();
        let mut second = first.clone();

        assert!(!first.is_triggered());
        trigger.trigger();

        first.recv().await;
        second.recv().await;
        assert!(second.is_triggered());
    }
}
