//! Frame checksum.
//!
//! Reflected CRC-16, polynomial `0x8408` (bit-reversed `0x1021`), preset
//! `0xFFFF`, no final XOR.  The reader firmware calls this "Kermit"; the
//! catalogued name for these parameters is CRC-16/MCRF4XX.  The result is
//! appended to every outbound frame low byte first and is checked by the
//! device itself, so it must match bit for bit.

/// Register preset.
const PRESET: u16 = 0xFFFF;

/// Reflected generator polynomial.
const POLYNOMIAL: u16 = 0x8408;

/// Compute the 16-bit register over `data`.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = PRESET;
    for &byte in data {
        crc ^= u16::from(byte);
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ POLYNOMIAL;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Checksum bytes in wire order: `[low, high]`.
pub fn checksum(data: &[u8]) -> [u8; 2] {
    crc16(data).to_le_bytes()
}

/// `true` if the last two bytes of `frame` are the checksum of the rest.
///
/// Because the checksum is appended LSB first with no final XOR, running
/// the register over the complete frame leaves it at zero.
pub fn verify(frame: &[u8]) -> bool {
    frame.len() >= 2 && crc16(frame) == 0
}
