//! Hardware addresses and magic-packet construction.

use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, Bytes, BytesMut};

use super::error::WolError;

/// Length of a wake-on-LAN magic packet in bytes.
pub const MAGIC_PACKET_LEN: usize = 102;

/// A 48-bit Ethernet hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    /// Get the raw octets.
    #[must_use]
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl FromStr for MacAddr {
    type Err = WolError;

    /// Parse six hex octets separated consistently by `:` or `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let separator = if s.contains(':') { ':' } else { '-' };
        let mut octets = [0u8; 6];
        let mut parts = s.split(separator);

        for octet in &mut octets {
            let part = parts
                .next()
                .ok_or_else(|| WolError::InvalidMac(s.to_string()))?;
            if part.len() != 2 {
                return Err(WolError::InvalidMac(s.to_string()));
            }
            *octet =
                u8::from_str_radix(part, 16).map_err(|_| WolError::InvalidMac(s.to_string()))?;
        }

        if parts.next().is_some() {
            return Err(WolError::InvalidMac(s.to_string()));
        }

        Ok(MacAddr(octets))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// Build the magic packet for a hardware address.
///
/// The layout is fixed: six `0xFF` bytes followed by sixteen copies of the
/// 6-byte address, 102 bytes in total.
#[must_use]
pub fn magic_packet(mac: MacAddr) -> Bytes {
    let mut packet = BytesMut::with_capacity(MAGIC_PACKET_LEN);

    packet.put_bytes(0xFF, 6);
    for _ in 0..16 {
        packet.put_slice(&mac.octets());
    }

    packet.freeze()
}
