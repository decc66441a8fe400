//! Protocol error types.

use crate::messages::MessageKind;
use thiserror::Error;

/// Errors raised while decoding or routing wire messages.
///
/// None of these are fatal: the offending message is dropped and the
/// message loop continues.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Message has no type field")]
    MissingType,

    #[error("Unsupported message type: {0}")]
    UnknownType(String),

    #[error("{0} message received before session init")]
    NotEstablished(MessageKind),

    #[error("Duplicate init message for an established session")]
    AlreadyEstablished,
}
