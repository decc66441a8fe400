//! Session identity: which player on the board is us.

use protocol::{ProtocolError, SessionId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Unestablished,
    Established(SessionId),
}

/// Two-state machine, `Unestablished -> Established`, driven by the first
/// `init` of a connection. Only a new connection resets it.
#[derive(Debug, Clone, Default)]
pub struct SessionTracker {
    state: SessionState,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_established(&self) -> bool {
        matches!(self.state, SessionState::Established(_))
    }

    pub fn identity(&self) -> Option<&SessionId> {
        match &self.state {
            SessionState::Established(id) => Some(id),
            SessionState::Unestablished => None,
        }
    }

    /// Record the server-assigned identity. Fails if one is already set.
    pub fn establish(&mut self, id: SessionId) -> Result<&SessionId, ProtocolError> {
        if self.is_established() {
            return Err(ProtocolError::AlreadyEstablished);
        }
        self.state = SessionState::Established(id);
        self.identity().ok_or(ProtocolError::AlreadyEstablished)
    }

    /// Back to `Unestablished`, for a fresh connection.
    pub fn reset(&mut self) {
        self.state = SessionState::Unestablished;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_establish_once() {
        let mut session = SessionTracker::new();
        assert!(session.identity().is_none());

        session.establish(SessionId::new("a")).unwrap();
        assert_eq!(session.identity(), Some(&SessionId::new("a")));

        assert!(matches!(
            session.establish(SessionId::new("b")),
            Err(ProtocolError::AlreadyEstablished)
        ));
        assert_eq!(session.identity(), Some(&SessionId::new("a")));
    }

    #[test]
    fn test_reset_allows_new_identity() {
        let mut session = SessionTracker::new();
        session.establish(SessionId::new("a")).unwrap();
        session.reset();
        assert_eq!(session.state(), &SessionState::Unestablished);

        session.establish(SessionId::new("b")).unwrap();
        assert_eq!(session.identity(), Some(&SessionId::new("b")));
    }
}
