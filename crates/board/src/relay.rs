//! Forwards player input to the server.

use protocol::{Action, ClientMessage, ProtocolError};
use std::fmt::Debug;
use thiserror::Error;
use tracing::debug;

/// Outbound half of the connection.
pub trait Transport {
    type Error: Debug;

    /// Connectivity status, polled before every send.
    fn is_connected(&self) -> bool;

    fn send_text(&self, text: &str) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// Not connected; the message was dropped, not queued.
    Disconnected,
    /// Nothing to send (blank chat).
    Empty,
}

#[derive(Debug, Error)]
pub enum RelayError<E: Debug> {
    #[error(transparent)]
    Encode(#[from] ProtocolError),

    #[error("Transport send failed: {0:?}")]
    Transport(E),
}

/// Turns actions and chat into outbound messages. Sends are never queued
/// or retried; offline sends are dropped.
#[derive(Debug)]
pub struct InputRelay<T> {
    transport: T,
}

impl<T: Transport> InputRelay<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn send_action(&self, action: Action) -> Result<SendOutcome, RelayError<T::Error>> {
        self.send(&ClientMessage::Action(action))
    }

    /// Send trimmed chat text; blank input is not sent.
    pub fn send_chat(&self, text: &str) -> Result<SendOutcome, RelayError<T::Error>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(SendOutcome::Empty);
        }
        self.send(&ClientMessage::Chat(text.to_string()))
    }

    pub fn send(&self, message: &ClientMessage) -> Result<SendOutcome, RelayError<T::Error>> {
        if !self.transport.is_connected() {
            debug!(?message, "not connected, dropping outbound message");
            return Ok(SendOutcome::Disconnected);
        }
        let text = message.encode()?;
        self.transport.send_text(&text).map_err(RelayError::Transport)?;
        Ok(SendOutcome::Sent)
    }
}
