//! Shared protocol crate for native-bomber.
//!
//! This crate contains:
//! - Inbound server messages (`init`, `map`, `log`) and their entity deltas
//! - Outbound client messages (`action`, `chat`)
//! - Shared types (SessionId, Position)

mod error;
pub mod messages;

pub use error::ProtocolError;
pub use messages::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid coordinate: `x` is the column, `y` the row.
pub type Position = glam::IVec2;

/// Opaque identifier the server assigns to the locally controlled player.
///
/// The server may send it as a string (UUID) or as a number; numbers are
/// kept in their decimal text form so both compare the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "RawSessionId", into = "String")]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSessionId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl From<RawSessionId> for SessionId {
    fn from(raw: RawSessionId) -> Self {
        match raw {
            RawSessionId::Text(text) => Self(text),
            RawSessionId::Signed(n) => Self(n.to_string()),
            RawSessionId::Unsigned(n) => Self(n.to_string()),
        }
    }
}
