//! Magic-packet emission over UDP.

use std::net::{SocketAddr, ToSocketAddrs};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::net::UdpSocket;
use tracing::debug;

use super::error::{WolError, WolResult};
use super::packet::{magic_packet, MacAddr};

/// Something that can emit a wake signal towards a sleeping host.
///
/// The production implementation is [`WolEmitter`]; tests substitute fakes
/// that count or fail sends.
#[async_trait]
pub trait WakeSender: Send + Sync {
    /// Emit one wake signal.
    async fn send_wake(&self) -> WolResult<()>;
}

/// Sends wake-on-LAN magic packets to a fixed broadcast endpoint.
///
/// Both parameters are parsed at construction and the packet is cached, so
/// a construction success guarantees well-formed sends.
pub struct WolEmitter {
    /// The hardware address to wake.
    mac: MacAddr,

    /// UDP endpoint the packet is sent to.
    broadcast_addr: SocketAddr,

    /// The precomputed 102-byte payload.
    packet: Bytes,
}

impl WolEmitter {
    /// Create an emitter from textual parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the MAC address or the broadcast endpoint cannot
    /// be parsed (the endpoint is resolved once, here).
    pub fn new(mac: &str, broadcast_addr: &str) -> WolResult<Self> {
        let mac: MacAddr = mac.parse()?;

        let resolved = broadcast_addr
            .to_socket_addrs()
            .map_err(|e| WolError::InvalidBroadcastAddr {
                addr: broadcast_addr.to_string(),
                message: e.to_string(),
            })?
            .next()
            .ok_or_else(|| WolError::InvalidBroadcastAddr {
                addr: broadcast_addr.to_string(),
                message: "resolved to no addresses".to_string(),
            })?;

        Ok(Self {
            mac,
            broadcast_addr: resolved,
            packet: magic_packet(mac),
        })
    }

    /// The hardware address this emitter wakes.
    #[must_use]
    pub fn mac(&self) -> MacAddr {
        self.mac
    }

    /// The endpoint packets are sent to.
    #[must_use]
    pub fn broadcast_addr(&self) -> SocketAddr {
        self.broadcast_addr
    }
}

#[async_trait]
impl WakeSender for WolEmitter {
    async fn send_wake(&self) -> WolResult<()> {
        let bind_addr: SocketAddr = if self.broadcast_addr.is_ipv4() {
            SocketAddr::from((std::net::Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((std::net::Ipv6Addr::UNSPECIFIED, 0))
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|source| WolError::Send {
                addr: self.broadcast_addr,
                source,
            })?;

        // The target endpoint is usually a subnet broadcast address.
        socket
            .set_broadcast(true)
            .map_err(|source| WolError::Send {
                addr: self.broadcast_addr,
                source,
            })?;

        socket
            .send_to(&self.packet, self.broadcast_addr)
            .await
            .map_err(|source| WolError::Send {
                addr: self.broadcast_addr,
                source,
            })?;

        debug!(
            mac = %self.mac,
            broadcast = %self.broadcast_addr,
            "sent wake-on-LAN magic packet"
        );

        Ok(())
    }
}
