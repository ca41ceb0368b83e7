//! Unified error types for the gate reader.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! scan loop's error handling uniform.  Codec and link variants are `Copy`
//! so they can be passed through the service and logged without allocation.
//!
//! Note that "no tag in this response" is not an error anywhere in the
//! crate: the scanner simply returns an empty sequence.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the reader funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A frame was requested with an invalid power level or antenna port.
    Codec(CodecError),
    /// The serial link failed to read or write.
    Link(LinkError),
    /// The reader answered the power-set command with something other
    /// than the expected acknowledgement frame.
    UnexpectedAck,
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codec(e) => write!(f, "codec: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::UnexpectedAck => write!(f, "reader did not acknowledge power setting"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Codec errors
// ---------------------------------------------------------------------------

/// Errors from outbound frame construction.  Always a caller error:
/// the frame must not be sent and the request must not be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// `value` lies outside `min..=max` for the named parameter.
    OutOfRange {
        param: &'static str,
        value: u8,
        min: u8,
        max: u8,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange {
                param,
                value,
                min,
                max,
            } => write!(f, "{param} {value} out of range ({min}..={max})"),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

/// Device link failures.  Produced by [`Transport`] implementations only.
///
/// [`Transport`]: crate::protocol::transport::Transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The serial device could not be opened or configured.
    Open,
    /// Writing a frame failed.
    Write,
    /// The device accepted fewer bytes than the frame length.
    ShortWrite,
    /// Reading the response failed.
    Read,
    /// No response arrived before the read timeout.
    Timeout,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "serial open failed"),
            Self::Write => write!(f, "serial write failed"),
            Self::ShortWrite => write!(f, "short write"),
            Self::Read => write!(f, "serial read failed"),
            Self::Timeout => write!(f, "read timed out"),
        }
    }
}

impl std::error::Error for LinkError {}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
