//! # Frontends
//!
//! Named TCP acceptors, each bound to exactly one backend.
//!
//! A frontend listens on a configured address and hands every accepted
//! connection to its backend. Transient accept errors are survived; a
//! close request ends the accept loop deterministically. The
//! [`FrontendRegistry`] starts all frontends in parallel and tears them
//! down together on shutdown.

mod error;
mod registry;
mod tcp;

pub use error::{FrontendError, FrontendResult};
pub use registry::FrontendRegistry;
pub use tcp::TcpFrontend;
