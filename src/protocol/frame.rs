//! Outbound command frames.
//!
//! Wire format:
//! ```text
//! ┌──────────────────────────────┬──────────────┐
//! │ Body (length byte + payload) │ CRC-16 (2B)  │
//! │                              │ LSB, MSB     │
//! └──────────────────────────────┴──────────────┘
//! ```
//!
//! Only two commands are ever sent:
//!
//! | Command        | Body                                   |
//! |----------------|----------------------------------------|
//! | power-set      | `05 00 2F PP` (PP = dBm, 10–33)        |
//! | antenna-select | `09 00 01 00 00 00 AA 0A` (AA = 0x80 + port − 1) |
//!
//! Frames are immutable once built and carry their own checksum.

use core::fmt;
use core::ops::Deref;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Hex;
use super::crc::checksum;
use crate::error::CodecError;

/// Largest frame the codec produces (antenna-select body + checksum).
pub const MAX_FRAME_LEN: usize = 10;

/// Checksum trailer length.
pub const CHECKSUM_LEN: usize = 2;

/// Accepted transmit power range, dBm.
pub const POWER_MIN_DBM: u8 = 10;
pub const POWER_MAX_DBM: u8 = 33;

/// Antenna ports are numbered 1..=8 on the reader's front panel.
pub const PORT_MIN: u8 = 1;
pub const PORT_MAX: u8 = 8;

/// Power byte of the acknowledgement some reader firmware echoes
/// regardless of the level that was requested.
pub const SENTINEL_ACK_POWER: u8 = 0x00;

const POWER_PREFIX: [u8; 3] = [0x05, 0x00, 0x2F];
const ANTENNA_PREFIX: [u8; 6] = [0x09, 0x00, 0x01, 0x00, 0x00, 0x00];
const ANTENNA_SUFFIX: u8 = 0x0A;
const ANTENNA_BASE: u8 = 0x80;

/// A complete command: body followed by its checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: heapless::Vec<u8, MAX_FRAME_LEN>,
}

impl Frame {
    /// Append the checksum of `body` and freeze the result.
    ///
    /// Bodies are fixed-size arrays, so the capacity check is evaluated at
    /// compile time for every call site.
    fn seal<const N: usize>(body: [u8; N]) -> Self {
        const { assert!(N + CHECKSUM_LEN <= MAX_FRAME_LEN) };
        let mut bytes: heapless::Vec<u8, MAX_FRAME_LEN> = body.into_iter().collect();
        bytes.extend(checksum(&body));
        Self { bytes }
    }

    /// Full frame as sent on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Frame without its checksum trailer.
    pub fn body(&self) -> &[u8] {
        &self.bytes[..self.bytes.len() - CHECKSUM_LEN]
    }

    /// The two checksum bytes, low byte first.
    pub fn checksum(&self) -> [u8; 2] {
        let n = self.bytes.len();
        [self.bytes[n - 2], self.bytes[n - 1]]
    }
}

impl Deref for Frame {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Hex(self.bytes.as_slice()), f)
    }
}

fn check_range(param: &'static str, value: u8, min: u8, max: u8) -> Result<(), CodecError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(CodecError::OutOfRange {
            param,
            value,
            min,
            max,
        })
    }
}

fn power_frame_unchecked(power_dbm: u8) -> Frame {
    let [a, b, c] = POWER_PREFIX;
    Frame::seal([a, b, c, power_dbm])
}

/// Build the power-set command.  `power_dbm` must lie in 10..=33.
pub fn build_power_frame(power_dbm: u8) -> Result<Frame, CodecError> {
    check_range("power_dbm", power_dbm, POWER_MIN_DBM, POWER_MAX_DBM)?;
    Ok(power_frame_unchecked(power_dbm))
}

/// Build the antenna-select (inventory) command for a 1-based port.
pub fn build_antenna_frame(port: u8) -> Result<Frame, CodecError> {
    check_range("antenna port", port, PORT_MIN, PORT_MAX)?;
    let mut body = [0u8; 8];
    body[..6].copy_from_slice(&ANTENNA_PREFIX);
    body[6] = ANTENNA_BASE + port - 1;
    body[7] = ANTENNA_SUFFIX;
    Ok(Frame::seal(body))
}

/// The frame the reader is expected to echo after a power-set command
/// carrying `power_dbm`.
///
/// No range check: acknowledgement matching must also work for the
/// sentinel value, which is not a settable power level.
pub fn expected_power_ack(power_dbm: u8) -> Frame {
    power_frame_unchecked(power_dbm)
}

// ---------------------------------------------------------------------------
// Acknowledgement policy
// ---------------------------------------------------------------------------

/// Which acknowledgement frame counts as a successful power-set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckPolicy {
    /// Byte-exact echo of the requested power level.
    #[default]
    Requested,
    /// Echo carrying [`SENTINEL_ACK_POWER`], whatever was requested.
    /// Matches readers that always answer with a zero power byte.
    Sentinel,
}

impl AckPolicy {
    /// Expected acknowledgement for a power-set of `requested_dbm`.
    pub fn expected_ack(self, requested_dbm: u8) -> Frame {
        match self {
            Self::Requested => expected_power_ack(requested_dbm),
            Self::Sentinel => expected_power_ack(SENTINEL_ACK_POWER),
        }
    }
}

impl FromStr for AckPolicy {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "requested" => Ok(Self::Requested),
            "sentinel" => Ok(Self::Sentinel),
            _ => Err("ack policy must be 'requested' or 'sentinel'"),
        }
    }
}

impl fmt::Display for AckPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => write!(f, "requested"),
            Self::Sentinel => write!(f, "sentinel"),
        }
    }
}
