//! # Backends
//!
//! Named handlers that take ownership of accepted connections.
//!
//! Three backend kinds exist:
//!
//! - **Echo**: writes every byte read from the connection back to it.
//! - **TCP forwarder**: dials a fixed target and relays both directions.
//! - **WoL forwarder**: like the TCP forwarder, but if the target is down
//!   it sends a wake-on-LAN magic packet and retries the dial for a
//!   bounded period before giving up.
//!
//! Backends are indexed by unique name in a [`BackendRegistry`] built once
//! from configuration. Every backend tracks its live [`Pipe`]s so that
//! connection lifetime is observable.
//!
//! [`Pipe`]: crate::pipe::Pipe

mod dialer;
mod echo;
mod error;
mod registry;
mod tcp_forwarder;
mod tracker;
mod wol_forwarder;

use async_trait::async_trait;
use tokio::net::TcpStream;

pub use dialer::{Dialer, Sleeper, TcpDialer, TokioSleeper};
pub use echo::EchoBackend;
pub use error::{BackendError, BackendResult};
pub use registry::BackendRegistry;
pub use tcp_forwarder::TcpForwarderBackend;
pub use tracker::ActivePipes;
pub use wol_forwarder::WolForwarderBackend;

/// A named connection handler.
///
/// `handle` takes ownership of the connection and must be safe to invoke
/// concurrently. Failures are resolved internally (logged, connection
/// closed); nothing propagates to the caller.
#[async_trait]
pub trait Backend: Send + Sync {
    /// The unique name this backend is registered under.
    fn name(&self) -> &str;

    /// Number of pipes currently owned by this backend.
    fn active_pipes(&self) -> usize;

    /// Service one accepted connection, consuming it.
    async fn handle(&self, connection: TcpStream);
}
