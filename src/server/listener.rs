use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, warn};

use crate::config::Config;
use crate::handler::{Handler, StaticFileHandler};
use crate::http::connection::Connection;
use crate::server::shutdown::{self, ShutdownSignal};

/// Owns the listening socket and hands every accepted stream to a new
/// [`Connection`].
pub struct Server {
    listener: TcpListener,
    handler: Arc<dyn Handler>,
    shutdown_grace: Duration,
}

impl Server {
    pub async fn bind(addr: SocketAddr, handler: Arc<dyn Handler>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;

        Ok(Self {
            listener,
            handler,
            shutdown_grace: Duration::from_secs(5),
        })
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections until `shutdown` fires, then gives the ones still
    /// in flight the grace period to finish before aborting them.
    pub async fn serve(self, mut shutdown: ShutdownSignal) -> anyhow::Result<()> {
        info!("Listening on {}", self.local_addr()?);

        let listener = &self.listener;
        let mut connections: Vec<JoinHandle<()>> = Vec::new();

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Shutdown signal received, no longer accepting");
                    break;
                }

                (socket, peer) = accept_with_backoff(move || listener.accept()) => {
                    info!("Accepted connection from {}", peer);

                    connections.retain(|handle| !handle.is_finished());

                    let conn = Connection::new(socket, Arc::clone(&self.handler));
                    let span = info_span!("connection", peer = %peer);
                    connections.push(span.in_scope(|| conn.start()));
                }
            }
        }

        drop(self.listener);
        drain(connections, self.shutdown_grace).await;
        Ok(())
    }
}

/// Pause after a failed accept. Errors such as EMFILE persist until some
/// connection closes, so retrying at once would spin.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Retries `accept` until it yields a connection, sleeping after each error.
async fn accept_with_backoff<F, Fut, T>(mut accept: F) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<T>>,
{
    loop {
        match accept().await {
            Ok(accepted) => return accepted,
            Err(e) => {
                warn!(error = %e, "Accept failed");
                tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
            }
        }
    }
}

/// Waits up to `grace` for the connections, then aborts the rest.
///
/// Returns how many connection tasks panicked.
async fn drain(mut connections: Vec<JoinHandle<()>>, grace: Duration) -> usize {
    connections.retain(|handle| !handle.is_finished());
    if connections.is_empty() {
        return 0;
    }

    info!(in_flight = connections.len(), "Waiting for connections to finish");

    let mut panicked = 0;
    let wait_all = async {
        for handle in connections.iter_mut() {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    warn!(error = %e, "Connection task panicked");
                    panicked += 1;
                }
            }
        }
    };

    if tokio::time::timeout(grace, wait_all).await.is_err() {
        let remaining = connections.iter().filter(|h| !h.is_finished()).count();
        warn!(remaining, "Grace period elapsed, aborting connections");
        for handle in &connections {
            handle.abort();
        }
    }

    panicked
}

/// Binds the configured address, serves static files from the document
/// root, and returns after a shutdown signal.
pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let root = &cfg.static_files.root;
    if !root.is_dir() {
        warn!("Document root {} is not a directory", root.display());
    }

    let handler: Arc<dyn Handler> = Arc::new(StaticFileHandler::new(root.clone()));
    let server = Server::bind(cfg.socket_addr()?, handler)
        .await?
        .with_shutdown_grace(Duration::from_secs(cfg.server.shutdown_grace_secs));

    let (trigger, signal) = shutdown::channel();
    tokio::spawn(async move {
        match shutdown::wait_for_signal().await {
            Ok(()) => trigger.trigger(),
            Err(e) => error!(error = %e, "Cannot listen for shutdown signals"),
        }
    });

    server.serve(signal).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn accept_errors_back_off() {
        let mut attempts = 0;
        let started = Instant::now();

        let accepted = accept_with_backoff(|| {
            attempts += 1;
            let result = if attempts <= 2 {
                Err(io::Error::other("too many open files"))
            } else {
                Ok(attempts)
            };
            async move { result }
        })
        .await;

        assert_eq!(accepted, 3);
        assert!(started.elapsed() >= ACCEPT_ERROR_BACKOFF * 2);
    }

    #[tokio::test]
    async fn persistent_accept_error_does_not_spin() {
        let mut attempts = 0;

        let never = accept_with_backoff(|| {
            attempts += 1;
            async { Err::<(), _>(io::Error::other("too many open files")) }
        });
        let _ = tokio::time::timeout(Duration::from_millis(250), never).await;

        assert!(attempts <= 4, "{attempts} attempts in 250ms");
    }

    #[tokio::test]
    async fn drain_reports_panicked_connections() {
        let gate = Arc::new(tokio::sync::Notify::new());

        let waiting = Arc::clone(&gate);
        let failing = tokio::spawn(async move {
            waiting.notified().await;
            panic!("handler blew up");
        });
        let fine = tokio::spawn(async {});

        gate.notify_one();
        let panicked = drain(vec![failing, fine], Duration::from_secs(5)).await;

        assert_eq!(panicked, 1);
    }
}
