//! Gate-pair topology.
//!
//! Antennas are mounted on both sides of a physical gate.  A pair links
//! the inside antenna to the outside one; a tag seen on one and then the
//! other has crossed the gate.  The table is symmetric and fixed once
//! the tracker is built.

use crate::error::Error;
use crate::protocol::frame::{PORT_MAX, PORT_MIN};

/// Symmetric port → opposite-side port lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatePairs {
    /// Indexed by port number; slot 0 is unused.
    partner: [Option<u8>; PORT_MAX as usize + 1],
}

impl GatePairs {
    /// A table with no gates: every movement is either a repeat or noise.
    pub const fn empty() -> Self {
        Self {
            partner: [None; PORT_MAX as usize + 1],
        }
    }

    /// Build the table from unordered `(a, b)` pairs.
    ///
    /// Rejects ports outside 1..=8, a port paired with itself, and a port
    /// that appears in more than one pair.  Repeating an identical pair
    /// is harmless.
    pub fn new(pairs: &[(u8, u8)]) -> Result<Self, Error> {
        let mut table = Self::empty();
        for &(a, b) in pairs {
            if !(PORT_MIN..=PORT_MAX).contains(&a) || !(PORT_MIN..=PORT_MAX).contains(&b) {
                return Err(Error::Config("gate pair port must be 1-8"));
            }
            if a == b {
                return Err(Error::Config("gate pair must join two different ports"));
            }
            match (table.partner(a), table.partner(b)) {
                (None, None) => {
                    table.partner[a as usize] = Some(b);
                    table.partner[b as usize] = Some(a);
                }
                (Some(pa), Some(pb)) if pa == b && pb == a => {}
                _ => return Err(Error::Config("antenna port appears in more than one gate pair")),
            }
        }
        Ok(table)
    }

    /// The port on the other side of `port`'s gate, if it has one.
    pub fn partner(&self, port: u8) -> Option<u8> {
        self.partner.get(port as usize).copied().flatten()
    }

    /// `true` if moving from `from` to `to` crosses a monitored gate.
    pub fn is_crossing(&self, from: u8, to: u8) -> bool {
        self.partner(from) == Some(to)
    }

    /// Each pair once, lower port first.
    pub fn pairs(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.partner
            .iter()
            .enumerate()
            .filter_map(|(port, &partner)| {
                let port = port as u8;
                partner.filter(|&p| port < p).map(|p| (port, p))
            })
    }
}

impl Default for GatePairs {
    /// The standard single-gate deployment: port 1 inside, port 8 outside.
    fn default() -> Self {
        let mut table = Self::empty();
        table.partner[1] = Some(8);
        table.partner[8] = Some(1);
        table
    }
}
