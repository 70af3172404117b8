//! Echo backend.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::TcpStream;

use super::tracker::ActivePipes;
use super::Backend;
use crate::config::EchoBackendConfig;
use crate::pipe::Pipe;

/// A backend that feeds every byte read from a connection back to it.
pub struct EchoBackend {
    name: String,
    pipes: Arc<ActivePipes>,
}

impl EchoBackend {
    /// Create an echo backend from its configuration.
    #[must_use]
    pub fn new(config: &EchoBackendConfig) -> Self {
        Self {
            name: config.name.clone(),
            pipes: Arc::new(ActivePipes::new()),
        }
    }
}

#[async_trait]
impl Backend for EchoBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn active_pipes(&self) -> usize {
        self.pipes.len()
    }

    async fn handle(&self, connection: TcpStream) {
        self.pipes.track(Pipe::loopback(connection));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn tcp_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (client, accepted) = tokio::join!(TcpStream::connect(addr), listener.accept());
        let (server, _) = accepted.unwrap();
        (client.unwrap(), server)
    }

    #[tokio::test]
    async fn test_echoes_bytes_in_order() {
        let backend = EchoBackend::new(&EchoBackendConfig {
            name: "e1".to_string(),
        });

        let (mut client, server) = tcp_pair().await;
        backend.handle(server).await;
        assert_eq!(backend.active_pipes(), 1);

        client.write_all(b"first").await.unwrap();
        let mut buf = [0u8; 5];
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"first");

        client.write_all(b"second").await.unwrap();
        let mut buf = [0u8; 6];
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"second");
    }

    #[tokio::test]
    async fn test_pipe_set_drains_after_peer_closes() {
        let backend = EchoBackend::new(&EchoBackendConfig {
            name: "e1".to_string(),
        });

        let (client, server) = tcp_pair().await;
        backend.handle(server).await;
        drop(client);

        tokio::time::timeout(Duration::from_secs(2), async {
            while backend.active_pipes() != 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("active pipe set did not drain");
    }
}
