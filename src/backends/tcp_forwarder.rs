//! Plain TCP forwarding backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, warn};

use super::dialer::{Dialer, TcpDialer};
use super::tracker::ActivePipes;
use super::Backend;
use crate::config::TcpForwarderBackendConfig;
use crate::pipe::Pipe;

/// How long a dial attempt may take before the incoming connection is
/// dropped. The target is expected to be up, so there are no retries.
const DIAL_TIMEOUT: Duration = Duration::from_secs(10);

/// A backend that relays each incoming connection to a fixed TCP target.
pub struct TcpForwarderBackend {
    name: String,
    target_addr: String,
    pipes: Arc<ActivePipes>,
    dialer: Arc<dyn Dialer>,
}

impl TcpForwarderBackend {
    /// Create a forwarder backend from its configuration.
    #[must_use]
    pub fn new(config: &TcpForwarderBackendConfig) -> Self {
        Self {
            name: config.name.clone(),
            target_addr: config.target_addr.clone(),
            pipes: Arc::new(ActivePipes::new()),
            dialer: Arc::new(TcpDialer),
        }
    }
}

#[async_trait]
impl Backend for TcpForwarderBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn active_pipes(&self) -> usize {
        self.pipes.len()
    }

    async fn handle(&self, connection: TcpStream) {
        let target = match self.dialer.dial(&self.target_addr, DIAL_TIMEOUT).await {
            Ok(target) => target,
            Err(e) => {
                info!(
                    name = %self.name,
                    target = %self.target_addr,
                    error = %e,
                    "backend could not connect to target"
                );
                close_incoming(connection).await;
                return;
            },
        };

        self.pipes.track(Pipe::between(connection, target));
    }
}

/// Close an incoming connection whose target could not be reached.
pub(super) async fn close_incoming(mut connection: TcpStream) {
    if let Err(e) = connection.shutdown().await {
        warn!(error = %e, "could not properly close incoming connection after dial failure");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn tcp_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (client, accepted) = tokio::join!(TcpStream::connect(addr), listener.accept());
        let (server, _) = accepted.unwrap();
        (client.unwrap(), server)
    }

    /// A one-shot echo server for forwarding tests.
    async fn spawn_echo_target() -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let (mut read, mut write) = stream.split();
                    let _ = tokio::io::copy(&mut read, &mut write).await;
                });
            }
        });

        addr
    }

    #[tokio::test]
    async fn test_forwards_both_directions() {
        let target = spawn_echo_target().await;
        let backend = TcpForwarderBackend::new(&TcpForwarderBackendConfig {
            name: "fwd".to_string(),
            target_addr: target.to_string(),
        });

        let (mut client, server) = tcp_pair().await;
        backend.handle(server).await;
        assert_eq!(backend.active_pipes(), 1);

        client.write_all(b"GET /").await.unwrap();
        let mut buf = [0u8; 5];
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"GET /");
    }

    #[tokio::test]
    async fn test_dial_failure_closes_incoming() {
        // Bind and drop to get an address that refuses connections.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead_addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = TcpForwarderBackend::new(&TcpForwarderBackendConfig {
            name: "fwd".to_string(),
            target_addr: dead_addr.to_string(),
        });

        let (mut client, server) = tcp_pair().await;
        backend.handle(server).await;

        let mut buf = [0u8; 1];
        let read = client.read(&mut buf).await.unwrap();
        assert_eq!(read, 0, "client should observe EOF");
        assert_eq!(backend.active_pipes(), 0);
    }
}
