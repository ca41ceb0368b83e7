//! Transport abstraction for the reader's byte-oriented duplex link.
//!
//! Concrete implementations:
//! - USB-serial adapter ([`SerialTransport`](crate::adapters::serial::SerialTransport))
//! - scripted mocks in the integration tests
//!
//! The scan service is generic over `Transport`, so swapping the link
//! requires zero changes to the scan logic.  The link decides how long a
//! read may block; the service decides how long the reader gets to settle.

use crate::error::LinkError;

/// Byte-oriented transport channel to the reader.
pub trait Transport {
    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns the number of bytes actually read; 0 if the reader sent
    /// nothing before the read timeout.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError>;

    /// Write the whole of `data`.
    fn write(&mut self, data: &[u8]) -> Result<(), LinkError>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), LinkError>;

    /// Drop any unread input left over from a previous exchange.
    fn discard_input(&mut self) -> Result<(), LinkError> {
        Ok(())
    }
}

/// A null transport that discards all writes and never reads.
/// Useful for dry runs without a reader attached.
pub struct NullTransport;

impl Transport for NullTransport {
    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, LinkError> {
        Ok(0)
    }

    fn write(&mut self, _data: &[u8]) -> Result<(), LinkError> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), LinkError> {
        Ok(())
    }
}
