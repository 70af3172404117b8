//! The bidirectional relay and its close lifecycle.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::error::{PipeError, PipeResult};

/// Global pipe ID counter.
static PIPE_ID: AtomicU64 = AtomicU64::new(0);

type CloseCallback = Box<dyn FnOnce() + Send>;

/// The close-callback slot. `Spent` doubles as the closed marker: the slot
/// only becomes `Spent` once the relay task has released both sockets.
enum CallbackSlot {
    Vacant,
    Armed(CloseCallback),
    Spent,
}

/// A handle to a running relay between two owned connections.
///
/// Handles are cheap to clone and all refer to the same relay. Dropping
/// every handle does not stop the relay; it runs until a copy direction
/// terminates or [`Pipe::close`] is called.
#[derive(Clone)]
pub struct Pipe {
    shared: Arc<Shared>,
}

struct Shared {
    /// Process-unique pipe ID.
    id: u64,

    /// Close requests; the relay task selects on the receiving side.
    close_tx: watch::Sender<bool>,

    /// One-shot close callback.
    callback: Mutex<CallbackSlot>,
}

impl Shared {
    fn new() -> (Arc<Self>, watch::Receiver<bool>) {
        let (close_tx, close_rx) = watch::channel(false);
        let shared = Arc::new(Self {
            id: PIPE_ID.fetch_add(1, Ordering::Relaxed),
            close_tx,
            callback: Mutex::new(CallbackSlot::Vacant),
        });
        (shared, close_rx)
    }

    /// Mark the pipe closed and fire the callback if one was armed.
    ///
    /// Called exactly once, from the relay task, after both sockets have
    /// been released.
    fn finish(&self) {
        let callback = {
            let mut slot = self.callback.lock().unwrap();
            std::mem::replace(&mut *slot, CallbackSlot::Spent)
        };

        if let CallbackSlot::Armed(callback) = callback {
            callback();
        }
    }
}

impl Pipe {
    /// Start relaying between `source` and `target` in both directions.
    ///
    /// Ownership of both connections transfers into the pipe; the relay
    /// begins immediately. Must be called from within a tokio runtime.
    pub fn between(source: TcpStream, target: TcpStream) -> Self {
        let (shared, close_rx) = Shared::new();

        let task_shared = Arc::clone(&shared);
        tokio::spawn(async move {
            relay_between(source, target, close_rx).await;
            task_shared.finish();
        });

        Self { shared }
    }

    /// Start echoing a single connection back onto itself.
    ///
    /// Every byte read from `conn` is written back to it. Lifecycle and
    /// accounting are identical to [`Pipe::between`].
    pub fn loopback(conn: TcpStream) -> Self {
        let (shared, close_rx) = Shared::new();

        let task_shared = Arc::clone(&shared);
        tokio::spawn(async move {
            relay_loopback(conn, close_rx).await;
            task_shared.finish();
        });

        Self { shared }
    }

    /// Process-unique identifier of this pipe.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    /// Whether the pipe has fully closed (sockets released, callback run).
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(*self.shared.callback.lock().unwrap(), CallbackSlot::Spent)
    }

    /// Register a callback to run once when the pipe closes.
    ///
    /// # Errors
    ///
    /// Fails if a callback is already registered or the pipe has already
    /// closed (a late callback would never fire).
    pub fn on_close<F>(&self, callback: F) -> PipeResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut slot = self.shared.callback.lock().unwrap();
        match &*slot {
            CallbackSlot::Vacant => {
                *slot = CallbackSlot::Armed(Box::new(callback));
                Ok(())
            },
            CallbackSlot::Armed(_) => Err(PipeError::CallbackAlreadyRegistered),
            CallbackSlot::Spent => Err(PipeError::AlreadyClosed),
        }
    }

    /// Request the pipe to close.
    ///
    /// Idempotent and safe to call concurrently; the relay task performs
    /// the actual teardown.
    pub fn close(&self) {
        let _ = self.shared.close_tx.send(true);
    }
}

/// Copy both directions until one ends or a close is requested.
async fn relay_between(
    source: TcpStream,
    target: TcpStream,
    mut close_rx: watch::Receiver<bool>,
) {
    let (mut source_read, mut source_write) = source.into_split();
    let (mut target_read, mut target_write) = target.into_split();

    {
        let upstream = tokio::io::copy(&mut source_read, &mut target_write);
        let downstream = tokio::io::copy(&mut target_read, &mut source_write);
        tokio::pin!(upstream);
        tokio::pin!(downstream);

        tokio::select! {
            result = &mut upstream => log_copy_end("source to target", result),
            result = &mut downstream => log_copy_end("target to source", result),
            _ = close_rx.wait_for(|closed| *closed) => {
                debug!("relay stopped by explicit close");
            },
        }
    }

    shutdown_half(&mut source_write, "source").await;
    shutdown_half(&mut target_write, "target").await;
}

/// Echo a connection onto itself until it ends or a close is requested.
async fn relay_loopback(conn: TcpStream, mut close_rx: watch::Receiver<bool>) {
    let (mut read, mut write) = conn.into_split();

    {
        let echo = tokio::io::copy(&mut read, &mut write);
        tokio::pin!(echo);

        tokio::select! {
            result = &mut echo => log_copy_end("loopback", result),
            _ = close_rx.wait_for(|closed| *closed) => {
                debug!("relay stopped by explicit close");
            },
        }
    }

    shutdown_half(&mut write, "loopback").await;
}

fn log_copy_end(direction: &str, result: io::Result<u64>) {
    match result {
        Ok(bytes) => debug!(direction, bytes, "copy direction finished"),
        Err(e) => debug!(direction, error = %e, "connection closed during copy"),
    }
}

async fn shutdown_half(half: &mut OwnedWriteHalf, side: &str) {
    if let Err(e) = half.shutdown().await {
        // The peer may already be gone; NotConnected is the usual noise.
        if e.kind() != io::ErrorKind::NotConnected {
            warn!(side, error = %e, "could not cleanly shut down connection");
        }
    }
}
