//! Backend error types.

use thiserror::Error;

use crate::wol::WolError;

/// Errors that can occur while building or running backends.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Two backend sections share a name.
    #[error("duplicate backend name '{name}'")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },

    /// A WoL forwarder's wake parameters could not be parsed.
    #[error("could not create backend '{name}': {source}")]
    WolSetup {
        /// The backend name from the configuration.
        name: String,
        /// The underlying parse failure.
        #[source]
        source: WolError,
    },

    /// The wake-on-LAN magic packet could not be sent.
    #[error("could not send wake-on-LAN magic packet: {0}")]
    WakeSend(#[source] WolError),

    /// The target never became reachable within the retry budget.
    #[error("timeout while waiting for target with addr '{target}'")]
    WakeTimeout {
        /// The target address that stayed down.
        target: String,
    },
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
