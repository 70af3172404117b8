//! # Wake-on-LAN
//!
//! Magic-packet construction and emission for waking sleeping hosts.
//!
//! A magic packet is a 102-byte UDP payload: six `0xFF` bytes followed by
//! sixteen repetitions of the target's 6-byte hardware address. The
//! [`WolEmitter`] parses its parameters once at construction and caches the
//! packet, so sending is a single UDP datagram.
//!
//! ## Example
//!
//! ```ignore
//! let emitter = WolEmitter::new("aa:bb:cc:dd:ee:ff", "192.168.0.255:9")?;
//! emitter.send_wake().await?;
//! ```

mod emitter;
mod error;
mod packet;

pub use emitter::{WakeSender, WolEmitter};
pub use error::{WolError, WolResult};
pub use packet::{magic_packet, MacAddr, MAGIC_PACKET_LEN};
