//! # wakegate
//!
//! A wake-on-LAN aware TCP reverse proxy.
//!
//! Named frontends accept TCP connections and hand each one to a named
//! backend, which decides how the byte stream is serviced: echoed back,
//! forwarded to a TCP target, or forwarded to a target that is first woken
//! with a wake-on-LAN magic packet. The proxy is byte-transparent; payloads
//! are never inspected.
//!
//! ## Architecture
//!
//! - [`config`] loads the TOML document declaring frontends and backends.
//! - [`backends`] builds the named handlers and tracks their live pipes.
//! - [`frontends`] runs the accept loops and owns shutdown.
//! - [`pipe`] is the shared relay primitive: two sockets, copied both
//!   ways, retired together.
//! - [`wol`] constructs and emits magic packets.
//!
//! The binary wires these together: load config, build the backend
//! registry, build the frontend registry against it, listen, and tear
//! everything down on SIGINT/SIGTERM.

pub mod backends;
pub mod config;
pub mod frontends;
pub mod pipe;
pub mod wol;
