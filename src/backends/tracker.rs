//! Per-backend tracking of live pipes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::pipe::Pipe;

/// The set of pipes currently owned by a backend.
///
/// Keyed by pipe ID for O(1) removal by identity. Entries remove
/// themselves through the pipe's close callback, so once all peers have
/// closed the set drains to empty. The lock is only ever held for map
/// operations, never across I/O.
#[derive(Default)]
pub struct ActivePipes {
    pipes: Mutex<HashMap<u64, Pipe>>,
}

impl ActivePipes {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pipe and arm its self-removal callback.
    ///
    /// The entry is inserted before the callback is armed, so the callback
    /// always finds it; if the pipe closed in between, registration fails
    /// and the entry is removed directly.
    pub fn track(self: &Arc<Self>, pipe: Pipe) {
        let id = pipe.id();
        self.pipes.lock().unwrap().insert(id, pipe.clone());

        let tracked = Arc::downgrade(self);
        let registered = pipe.on_close(move || {
            if let Some(pipes) = tracked.upgrade() {
                pipes.remove(id);
            }
        });

        if registered.is_err() {
            self.remove(id);
        }
    }

    /// Number of live pipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pipes.lock().unwrap().len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove(&self, id: u64) {
        self.pipes.lock().unwrap().remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::{TcpListener, TcpStream};

    async fn tcp_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (client, accepted) = tokio::join!(TcpStream::connect(addr), listener.accept());
        let (server, _) = accepted.unwrap();
        (client.unwrap(), server)
    }

    async fn wait_empty(pipes: &ActivePipes) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !pipes.is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("active pipe set did not drain");
    }

    #[tokio::test]
    async fn test_track_and_drain() {
        let pipes = Arc::new(ActivePipes::new());

        let (client, server) = tcp_pair().await;
        pipes.track(Pipe::loopback(server));
        assert_eq!(pipes.len(), 1);

        drop(client);
        wait_empty(&pipes).await;
    }

    #[tokio::test]
    async fn test_track_already_closed_pipe() {
        let pipes = Arc::new(ActivePipes::new());

        let (_client, server) = tcp_pair().await;
        let pipe = Pipe::loopback(server);
        pipe.close();

        // Wait for the relay to fully retire before tracking.
        tokio::time::timeout(Duration::from_secs(2), async {
            while !pipe.is_closed() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        pipes.track(pipe);
        assert!(pipes.is_empty());
    }

    #[tokio::test]
    async fn test_multiple_pipes_drain_independently() {
        let pipes = Arc::new(ActivePipes::new());

        let (client_a, server_a) = tcp_pair().await;
        let (client_b, server_b) = tcp_pair().await;
        pipes.track(Pipe::loopback(server_a));
        pipes.track(Pipe::loopback(server_b));
        assert_eq!(pipes.len(), 2);

        drop(client_a);
        tokio::time::timeout(Duration::from_secs(2), async {
            while pipes.len() != 1 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        drop(client_b);
        wait_empty(&pipes).await;
    }
}
