//! Message definitions for the bomber JSON protocol.
//!
//! This module contains both server->client and client->server messages.

mod client;
mod server;

pub use client::*;
pub use server::*;

use std::fmt;

/// Declared `type` of a server->client message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Session establishment with grid dimensions.
    Init,
    /// Incremental board update.
    Map,
    /// Narrative log entries (kills, chat, joins).
    Log,
    /// Empty `{}` frame the server sends on ticks where nothing changed.
    /// Has no `type` on the wire.
    KeepAlive,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Init => "init",
            MessageKind::Map => "map",
            MessageKind::Log => "log",
            MessageKind::KeepAlive => "keep-alive",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "init" => Some(MessageKind::Init),
            "map" => Some(MessageKind::Map),
            "log" => Some(MessageKind::Log),
            _ => None,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
