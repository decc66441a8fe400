//! Message classification and dispatch.

use crate::BoardError;
use crate::session::SessionTracker;
use protocol::{InitMessage, LogBatch, MapUpdate, MessageKind, ProtocolError, ServerMessage, SessionId};
use tracing::trace;

/// One slot per message type. `on_init` and `on_map` are required, log
/// handling is optional.
///
/// The session identity is handed to every call; handlers never look it up
/// from shared state.
pub trait MessageHandler {
    fn on_init(&mut self, identity: &SessionId, init: InitMessage) -> Result<(), BoardError>;

    fn on_map(&mut self, identity: &SessionId, update: MapUpdate);

    fn on_log(&mut self, _identity: &SessionId, _batch: LogBatch) {}
}

/// Routes decoded server messages to a [`MessageHandler`], enforcing the
/// session rules:
/// - `init` is accepted only while no identity exists, and establishes it
/// - `map`/`log` are dropped until an identity exists
/// - keep-alive frames are accepted in any state and reach no handler
///
/// Rejected messages come back as errors; nothing is buffered for replay.
#[derive(Debug, Default)]
pub struct MessageRouter {
    session: SessionTracker,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &SessionTracker {
        &self.session
    }

    /// Forget the session, as required before a new connection's `init`.
    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// Decode a JSON text frame and route it.
    pub fn route_text<H: MessageHandler>(&mut self, text: &str, handler: &mut H) -> Result<MessageKind, BoardError> {
        let message = ServerMessage::decode(text)?;
        self.route(message, handler)
    }

    pub fn route<H: MessageHandler>(&mut self, message: ServerMessage, handler: &mut H) -> Result<MessageKind, BoardError> {
        let kind = message.kind();
        match message {
            ServerMessage::Init(init) => {
                let identity = self.session.establish(init.id.clone())?;
                handler.on_init(identity, init)?;
            }
            ServerMessage::Map(update) => {
                let identity = self.session.identity().ok_or(ProtocolError::NotEstablished(kind))?;
                handler.on_map(identity, update);
            }
            ServerMessage::Log(batch) => {
                let identity = self.session.identity().ok_or(ProtocolError::NotEstablished(kind))?;
                handler.on_log(identity, batch);
            }
            ServerMessage::KeepAlive => trace!("keep-alive"),
        }
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(MessageKind, String)>,
    }

    impl MessageHandler for Recorder {
        fn on_init(&mut self, identity: &SessionId, _init: InitMessage) -> Result<(), BoardError> {
            self.calls.push((MessageKind::Init, identity.to_string()));
            Ok(())
        }

        fn on_map(&mut self, identity: &SessionId, _update: MapUpdate) {
            self.calls.push((MessageKind::Map, identity.to_string()));
        }
    }

    const INIT: &str = r#"{"type":"init","id":"me","length":2,"width":2}"#;
    const MAP: &str = r#"{"type":"map","wall":[{"x":0,"y":0}]}"#;

    #[test]
    fn test_map_before_init_is_dropped() {
        let mut router = MessageRouter::new();
        let mut handler = Recorder::default();

        let err = router.route_text(MAP, &mut handler).unwrap_err();
        assert!(matches!(err, BoardError::Protocol(ProtocolError::NotEstablished(MessageKind::Map))));
        assert!(handler.calls.is_empty());

        router.route_text(INIT, &mut handler).unwrap();
        assert_eq!(router.route_text(MAP, &mut handler).unwrap(), MessageKind::Map);
        assert_eq!(
            handler.calls,
            vec![(MessageKind::Init, "me".to_string()), (MessageKind::Map, "me".to_string())]
        );
    }

    #[test]
    fn test_second_init_rejected() {
        let mut router = MessageRouter::new();
        let mut handler = Recorder::default();

        router.route_text(INIT, &mut handler).unwrap();
        let second = r#"{"type":"init","id":"other","length":5,"width":5}"#;
        assert!(matches!(
            router.route_text(second, &mut handler),
            Err(BoardError::Protocol(ProtocolError::AlreadyEstablished))
        ));
        assert_eq!(router.session().identity(), Some(&SessionId::new("me")));
        assert_eq!(handler.calls.len(), 1);
    }

    #[test]
    fn test_optional_log_slot_and_unknown_type() {
        let mut router = MessageRouter::new();
        let mut handler = Recorder::default();
        router.route_text(INIT, &mut handler).unwrap();

        // Recorder keeps the default no-op log slot
        let kind = router.route_text(r#"{"type":"log","logs":[{"1":"hi"}]}"#, &mut handler).unwrap();
        assert_eq!(kind, MessageKind::Log);
        assert_eq!(handler.calls.len(), 1);

        assert!(matches!(
            router.route_text(r#"{"type":"ping"}"#, &mut handler),
            Err(BoardError::Protocol(ProtocolError::UnknownType(_)))
        ));
    }

    #[test]
    fn test_keep_alive_is_a_no_op() {
        let mut router = MessageRouter::new();
        let mut handler = Recorder::default();

        // idle ticks arrive before and after init
        assert_eq!(router.route_text("{}", &mut handler).unwrap(), MessageKind::KeepAlive);
        assert!(!router.session().is_established());

        router.route_text(INIT, &mut handler).unwrap();
        for _ in 0..50 {
            assert_eq!(router.route_text("{}", &mut handler).unwrap(), MessageKind::KeepAlive);
        }
        assert_eq!(handler.calls, vec![(MessageKind::Init, "me".to_string())]);
    }

    #[test]
    fn test_reset_requires_fresh_init() {
        let mut router = MessageRouter::new();
        let mut handler = Recorder::default();
        router.route_text(INIT, &mut handler).unwrap();
        router.reset();

        assert!(router.route_text(MAP, &mut handler).is_err());
        router.route_text(INIT, &mut handler).unwrap();
        assert!(router.route_text(MAP, &mut handler).is_ok());
    }
}
