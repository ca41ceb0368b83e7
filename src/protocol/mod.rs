//! Reader wire protocol.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Protocol Stack                          │
//! │                                                            │
//! │  ┌──────────┐   ┌──────────────┐   ┌──────────────────┐    │
//! │  │  Frame   │──▶│  Transport   │──▶│  raw response    │    │
//! │  │ (+ CRC)  │   │  (trait)     │   │  bytes           │    │
//! │  └──────────┘   └──────────────┘   └────────┬─────────┘    │
//! │                                             │              │
//! │                                             ▼              │
//! │                                    ┌──────────────────┐    │
//! │                                    │  Scanner         │    │
//! │                                    │  → Vec<TagId>    │    │
//! │                                    └──────────────────┘    │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the outbound frame format is a bit-exact contract with the
//! device.  Inbound responses are never framed: the scanner looks for
//! tag identifiers anywhere in whatever bytes the link returned.

pub mod crc;
pub mod frame;
pub mod scanner;
pub mod transport;

pub use frame::{AckPolicy, Frame, build_antenna_frame, build_power_frame, expected_power_ack};
pub use scanner::{TagId, extract_tag_ids};

use core::fmt;

/// Lowercase, separator-free hex rendering of a byte slice, for logs and
/// tag identifiers.
pub struct Hex<'a>(pub &'a [u8]);

impl fmt::Display for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}
