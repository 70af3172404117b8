//! # Pipe
//!
//! Lifetime-bound pairing of two connections with bidirectional copying.
//!
//! A [`Pipe`] takes ownership of its sockets and starts relaying
//! immediately. It has a single observable transition, open to closed,
//! triggered by whichever comes first: one copy direction ending (EOF or
//! error) or an explicit [`Pipe::close`]. On that transition both sockets
//! are shut down and the registered close callback, if any, runs exactly
//! once.

mod error;
mod relay;

pub use error::{PipeError, PipeResult};
pub use relay::Pipe;
