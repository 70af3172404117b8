//! TCP frontend: accept loop and shutdown.

use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::{Arc, OnceLock};

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, error, info};

use super::error::{FrontendError, FrontendResult};
use crate::backends::{Backend, BackendRegistry};
use crate::config::TcpFrontendConfig;

/// A named TCP acceptor bound to one backend.
///
/// The lifecycle is idle, listening, closed; closed is terminal. A close
/// request is delivered through a watch channel the accept loop selects
/// on, so shutting down never races an in-flight accept.
pub struct TcpFrontend {
    name: String,

    /// Address resolved at construction.
    listen_addr: SocketAddr,

    /// The backend every accepted connection is handed to.
    backend: Arc<dyn Backend>,

    /// Close requests; flipped once, never back.
    shutdown: watch::Sender<bool>,

    /// Address actually bound, available once `listen` has bound.
    bound_addr: OnceLock<SocketAddr>,
}

impl TcpFrontend {
    /// Create a frontend, resolving its listen address and its backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the listen address does not resolve or the
    /// target backend is not registered.
    pub fn new(config: &TcpFrontendConfig, backends: &BackendRegistry) -> FrontendResult<Self> {
        let listen_addr = config
            .listen_addr
            .to_socket_addrs()
            .map_err(|e| FrontendError::InvalidListenAddr {
                name: config.name.clone(),
                addr: config.listen_addr.clone(),
                message: e.to_string(),
            })?
            .next()
            .ok_or_else(|| FrontendError::InvalidListenAddr {
                name: config.name.clone(),
                addr: config.listen_addr.clone(),
                message: "resolved to no addresses".to_string(),
            })?;

        let backend = backends
            .get(&config.target)
            .ok_or_else(|| FrontendError::UnknownBackend {
                name: config.name.clone(),
                target: config.target.clone(),
            })?;

        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            name: config.name.clone(),
            listen_addr,
            backend,
            shutdown,
            bound_addr: OnceLock::new(),
        })
    }

    /// The frontend name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The address the listener is actually bound to, once listening.
    ///
    /// Useful when the configured port is 0.
    #[must_use]
    pub fn bound_addr(&self) -> Option<SocketAddr> {
        self.bound_addr.get().copied()
    }

    /// Bind the listener and accept connections until closed.
    ///
    /// Blocks the calling task. Every accepted connection is handed to the
    /// bound backend in its own task. Transient accept errors are logged
    /// and survived; only a close request ends the loop, after which
    /// `Ok(())` is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn listen(&self) -> FrontendResult<()> {
        let mut shutdown_rx = self.shutdown.subscribe();
        if *shutdown_rx.borrow() {
            // Closed before listening; closed is terminal.
            return Ok(());
        }

        let listener =
            TcpListener::bind(self.listen_addr)
                .await
                .map_err(|source| FrontendError::Bind {
                    name: self.name.clone(),
                    addr: self.listen_addr,
                    source,
                })?;

        if let Ok(addr) = listener.local_addr() {
            let _ = self.bound_addr.set(addr);
        }

        info!(
            name = %self.name,
            addr = %self.listen_addr,
            backend = %self.backend.name(),
            "frontend started listening"
        );

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((connection, peer)) => {
                        debug!(name = %self.name, peer = %peer, "accepted connection");

                        let backend = Arc::clone(&self.backend);
                        tokio::spawn(async move {
                            backend.handle(connection).await;
                        });
                    },
                    Err(e) => {
                        // FD exhaustion, resets between connect and accept:
                        // transient, must not take the frontend down.
                        error!(name = %self.name, error = %e, "could not accept connection");
                    },
                },
                _ = shutdown_rx.wait_for(|closed| *closed) => break,
            }
        }

        info!(name = %self.name, "frontend stopped listening");
        Ok(())
    }

    /// Request the accept loop to stop and the listener to close.
    ///
    /// Idempotent; safe to call before, during, or after `listen`.
    ///
    /// # Errors
    ///
    /// Currently infallible; the `Result` keeps the close contract uniform
    /// with the rest of the shutdown path.
    pub fn close(&self) -> FrontendResult<()> {
        self.shutdown.send_replace(true);
        Ok(())
    }
}
