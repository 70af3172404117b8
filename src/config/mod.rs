//! # Configuration System
//!
//! TOML-based configuration for the proxy daemon.
//!
//! The document declares named frontends and named backends; each frontend
//! references the backend that services its connections. Keys outside the
//! schema are warned about but not fatal.
//!
//! ## Example Configuration
//!
//! ```toml
//! [[frontends.tcp]]
//! name = "rdp"
//! listenAddr = "0.0.0.0:3389"
//! target = "workstation"
//!
//! [[backends.wolForwarder]]
//! name = "workstation"
//! targetAddr = "192.168.0.20:3389"
//! wolMACAddr = "aa:bb:cc:dd:ee:ff"
//! wolBroadcastAddr = "192.168.0.255:9"
//! ```

mod error;
mod loader;
mod types;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use types::{
    BackendConfigs, Config, EchoBackendConfig, FrontendConfigs, TcpForwarderBackendConfig,
    TcpFrontendConfig, WolForwarderBackendConfig,
};
