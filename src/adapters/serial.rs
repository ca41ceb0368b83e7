//! USB-serial transport adapter.
//!
//! Implements [`Transport`] over a `serialport` device.  Reads return
//! whatever the reader has queued, or block for at most the configured
//! read timeout when nothing is queued yet.  A timed-out read is not an
//! error here: it means the reader had nothing to say.

use std::io::{self, Read, Write};
use std::time::Duration;

use log::{info, warn};
use serialport::{ClearBuffer, SerialPort};

use crate::error::LinkError;
use crate::protocol::transport::Transport;

/// Reader attached to a local serial device (8N1).
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open `path` at `baud_rate`.
    pub fn open(path: &str, baud_rate: u32, read_timeout: Duration) -> Result<Self, LinkError> {
        let port = serialport::new(path, baud_rate)
            .timeout(read_timeout)
            .open()
            .map_err(|e| {
                warn!("Failed to open {}: {}", path, e);
                LinkError::Open
            })?;
        info!("Opened {} at {} baud", path, baud_rate);
        Ok(Self { port })
    }
}

impl Transport for SerialTransport {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        let queued = self.port.bytes_to_read().map_err(|_| LinkError::Read)? as usize;
        let want = if queued == 0 { buf.len() } else { queued.min(buf.len()) };

        match self.port.read(&mut buf[..want]) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => {
                warn!("Serial read failed: {}", e);
                Err(LinkError::Read)
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<(), LinkError> {
        match self.port.write(data) {
            Ok(n) if n == data.len() => Ok(()),
            Ok(_) => Err(LinkError::ShortWrite),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Err(LinkError::Timeout),
            Err(e) => {
                warn!("Serial write failed: {}", e);
                Err(LinkError::Write)
            }
        }
    }

    fn flush(&mut self) -> Result<(), LinkError> {
        self.port.flush().map_err(|_| LinkError::Write)
    }

    fn discard_input(&mut self) -> Result<(), LinkError> {
        self.port
            .clear(ClearBuffer::Input)
            .map_err(|_| LinkError::Read)
    }
}
