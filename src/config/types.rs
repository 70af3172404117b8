//! Configuration type definitions.

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Frontend declarations.
    pub frontends: FrontendConfigs,

    /// Backend declarations.
    pub backends: BackendConfigs,
}

/// All frontend sections.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FrontendConfigs {
    /// TCP frontends.
    pub tcp: Vec<TcpFrontendConfig>,
}

/// All backend sections.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BackendConfigs {
    /// Echo backends.
    pub echo: Vec<EchoBackendConfig>,

    /// Plain TCP forwarding backends.
    #[serde(rename = "tcpForwarder")]
    pub tcp_forwarder: Vec<TcpForwarderBackendConfig>,

    /// Wake-on-LAN forwarding backends.
    #[serde(rename = "wolForwarder")]
    pub wol_forwarder: Vec<WolForwarderBackendConfig>,
}

/// A TCP frontend declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcpFrontendConfig {
    /// Frontend name, unique among frontends.
    pub name: String,

    /// Address to listen on (host:port).
    pub listen_addr: String,

    /// Name of the backend that services accepted connections.
    pub target: String,
}

/// An echo backend declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EchoBackendConfig {
    /// Backend name, unique among backends.
    pub name: String,
}

/// A TCP forwarder backend declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcpForwarderBackendConfig {
    /// Backend name, unique among backends.
    pub name: String,

    /// Address connections are forwarded to (host:port).
    pub target_addr: String,
}

/// A wake-on-LAN forwarder backend declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WolForwarderBackendConfig {
    /// Backend name, unique among backends.
    pub name: String,

    /// Address connections are forwarded to (host:port).
    pub target_addr: String,

    /// Hardware address of the machine to wake.
    #[serde(rename = "wolMACAddr")]
    pub wol_mac_addr: String,

    /// UDP endpoint the magic packet is sent to (host:port).
    pub wol_broadcast_addr: String,
}
