//! Pipe error types.

use thiserror::Error;

/// Errors that can occur when interacting with a pipe.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipeError {
    /// A close callback has already been registered.
    #[error("a close callback is already registered")]
    CallbackAlreadyRegistered,

    /// The pipe has already closed; a callback would never fire.
    #[error("pipe is already closed")]
    AlreadyClosed,
}

/// Result type for pipe operations.
pub type PipeResult<T> = Result<T, PipeError>;
