//! Gate reader library.
//!
//! Drives a serial UHF RFID reader through a fixed antenna sweep, pulls tag
//! identifiers out of its responses and reports each tag only when it
//! genuinely moves through a gate (or lingers past the re-confirmation
//! timeout).  Everything that touches the outside world sits behind a
//! trait, so the whole pipeline runs in tests without a reader attached.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod protocol;
pub mod tracker;

pub use error::{Error, Result};
