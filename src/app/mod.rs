//! Application core: domain orchestration, no direct I/O.
//!
//! This module drives the reader: power handshake, antenna sweep, movement
//! de-duplication and event emission.  All interaction with the device,
//! clock and outputs happens through the **port traits** defined in
//! [`ports`] (plus [`Transport`](crate::protocol::transport::Transport)),
//! keeping this layer testable without a reader attached.

pub mod events;
pub mod ports;
pub mod service;
