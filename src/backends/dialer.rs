//! Injectable dial and sleep seams.
//!
//! Dialing and sleeping are hoisted behind narrow traits so the
//! wake-and-retry state machine can be driven by deterministic fakes in
//! tests, without real sockets or wall-clock waits.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Establishes outbound TCP connections.
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Dial `addr` (host:port), giving up after `dial_timeout`.
    async fn dial(&self, addr: &str, dial_timeout: Duration) -> io::Result<TcpStream>;
}

/// The production dialer: a plain connect under a timeout.
pub struct TcpDialer;

#[async_trait]
impl Dialer for TcpDialer {
    async fn dial(&self, addr: &str, dial_timeout: Duration) -> io::Result<TcpStream> {
        match timeout(dial_timeout, TcpStream::connect(addr)).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "connect timeout")),
        }
    }
}

/// Suspends the current task for a duration.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Sleep for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// The production sleeper, backed by the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
