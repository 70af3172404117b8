//! Wake-on-LAN error types.

use thiserror::Error;

/// Errors that can occur while building or sending magic packets.
#[derive(Debug, Error)]
pub enum WolError {
    /// The hardware address could not be parsed.
    #[error("invalid MAC address '{0}'")]
    InvalidMac(String),

    /// The broadcast endpoint could not be parsed or resolved.
    #[error("invalid broadcast address '{addr}': {message}")]
    InvalidBroadcastAddr {
        /// The address as given in the configuration.
        addr: String,
        /// Why it was rejected.
        message: String,
    },

    /// Sending the magic packet failed.
    #[error("failed to send magic packet to {addr}: {source}")]
    Send {
        /// The broadcast endpoint.
        addr: std::net::SocketAddr,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for wake-on-LAN operations.
pub type WolResult<T> = Result<T, WolError>;
