//! Tag identifier extraction from raw reader responses.
//!
//! The reader answers an inventory command with a burst of bytes that may
//! hold zero, one or many EPC identifiers between status bytes and
//! checksums.  Rather than decode that framing, the scanner slides over
//! the buffer looking for the fixed two-byte EPC header `E2 80` and takes
//! the 12-byte window starting there as one identifier.  Matches are
//! leftmost-first and never overlap.
//!
//! Nothing here can fail: an empty, truncated or noise-only buffer simply
//! yields no identifiers.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Hex;

/// Length of an identifier in bytes (96 bits).
pub const TAG_ID_LEN: usize = 12;

/// Every identifier the deployment cares about begins with these bytes.
pub const TAG_HEADER: [u8; 2] = [0xE2, 0x80];

/// A 96-bit tag identifier.  Opaque to the rest of the crate: compared,
/// hashed and rendered as 24 lowercase hex digits, never decoded further.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId([u8; TAG_ID_LEN]);

impl TagId {
    /// Wrap a 12-byte window.  `None` unless it starts with [`TAG_HEADER`].
    pub fn from_bytes(bytes: [u8; TAG_ID_LEN]) -> Option<Self> {
        (bytes[..2] == TAG_HEADER).then_some(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; TAG_ID_LEN] {
        &self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Hex(&self.0), f)
    }
}

impl fmt::Debug for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TagId({self})")
    }
}

impl FromStr for TagId {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != TAG_ID_LEN * 2 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err("tag id must be 24 hex digits");
        }
        let mut bytes = [0u8; TAG_ID_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| "tag id must be 24 hex digits")?;
        }
        Self::from_bytes(bytes).ok_or("tag id must start with e280")
    }
}

impl Serialize for TagId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TagId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Extract every tag identifier in `raw`, in order of appearance.
pub fn extract_tag_ids(raw: &[u8]) -> Vec<TagId> {
    let mut ids = Vec::new();
    let mut pos = 0;

    while pos + TAG_ID_LEN <= raw.len() {
        if raw[pos..pos + 2] == TAG_HEADER {
            let mut window = [0u8; TAG_ID_LEN];
            window.copy_from_slice(&raw[pos..pos + TAG_ID_LEN]);
            ids.push(TagId(window));
            pos += TAG_ID_LEN;
        } else {
            pos += 1;
        }
    }

    ids
}
