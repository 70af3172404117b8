//! Frontend error types.

use std::net::SocketAddr;
use thiserror::Error;

/// Errors that can occur while building or running frontends.
#[derive(Debug, Error)]
pub enum FrontendError {
    /// The configured listen address did not parse or resolve.
    #[error("could not parse listenAddr '{addr}' of frontend '{name}': {message}")]
    InvalidListenAddr {
        /// The frontend name from the configuration.
        name: String,
        /// The address as configured.
        addr: String,
        /// Why it was rejected.
        message: String,
    },

    /// The frontend references a backend that does not exist.
    #[error("target backend '{target}' for frontend '{name}' does not exist")]
    UnknownBackend {
        /// The frontend name from the configuration.
        name: String,
        /// The missing backend name.
        target: String,
    },

    /// Two frontends share a name.
    #[error("duplicate frontend name '{name}'")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },

    /// The listener could not be bound.
    #[error("can't listen on '{addr}' for frontend '{name}': {source}")]
    Bind {
        /// The frontend name.
        name: String,
        /// The address that failed to bind.
        addr: SocketAddr,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for frontend operations.
pub type FrontendResult<T> = Result<T, FrontendError>;
