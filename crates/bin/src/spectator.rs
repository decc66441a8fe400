//! Native client session: feeds a WebSocket through the board pipeline and
//! relays typed commands back to the server.

use board::{Action, Frame, Game, InputRelay, SendOutcome, Transport};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// A line typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Action(Action),
    Chat(String),
}

impl Command {
    /// Action names map to actions, any other text is chat. Blank lines
    /// are not commands.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        Some(match Action::from_name(&line.to_ascii_lowercase()) {
            Some(action) => Command::Action(action),
            None => Command::Chat(line.to_string()),
        })
    }
}

/// Outbound half handed to the relay: a queue into the socket writer.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<String>,
    connected: Arc<AtomicBool>,
}

impl Transport for ChannelTransport {
    type Error = mpsc::error::SendError<String>;

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire) && !self.tx.is_closed()
    }

    fn send_text(&self, text: &str) -> Result<(), Self::Error> {
        self.tx.send(text.to_string())
    }
}

/// Run one session against `url` until the server closes it.
///
/// `view` is called with the board and the presentation work after every
/// message that changed something. Returns the final board.
pub async fn run<F>(
    url: &str,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut view: F,
) -> anyhow::Result<Game>
where
    F: FnMut(&Game, &Frame),
{
    let (ws_stream, _) = connect_async(url).await?;
    info!("Connected to {}", url);

    let (mut write, mut read) = ws_stream.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    let connected = Arc::new(AtomicBool::new(true));
    let relay = InputRelay::new(ChannelTransport {
        tx: out_tx,
        connected: connected.clone(),
    });

    let mut game = Game::new();
    let mut commands_open = true;

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        // Errors are already logged by the board
                        let _ = game.handle_text(text.as_str());
                        let frame = game.take_frame();
                        if !frame.is_empty() {
                            view(&game, &frame);
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Server closed the connection");
                        break;
                    }
                    Some(Ok(Message::Binary(data))) => {
                        debug!(len = data.len(), "Ignoring binary frame");
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
            Some(text) = out_rx.recv() => {
                if let Err(e) = write.send(Message::text(text)).await {
                    warn!("Failed to send: {}", e);
                    break;
                }
            }
            command = commands.recv(), if commands_open => {
                match command {
                    Some(command) => dispatch(&relay, command),
                    None => {
                        debug!("Command input closed");
                        commands_open = false;
                    }
                }
            }
        }
    }

    connected.store(false, Ordering::Release);
    Ok(game)
}

fn dispatch(relay: &InputRelay<ChannelTransport>, command: Command) {
    let result = match &command {
        Command::Action(action) => relay.send_action(*action),
        Command::Chat(text) => relay.send_chat(text),
    };
    match result {
        Ok(SendOutcome::Sent) => debug!(?command, "sent"),
        Ok(outcome) => debug!(?command, ?outcome, "not sent"),
        Err(e) => warn!("Failed to queue {:?}: {}", command, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("bomb"), Some(Command::Action(Action::Bomb)));
        assert_eq!(Command::parse("  LEFT \n"), Some(Command::Action(Action::Left)));
        assert_eq!(Command::parse("gg all"), Some(Command::Chat("gg all".to_string())));
        assert_eq!(Command::parse("   "), None);
    }

    #[test]
    fn test_channel_transport_tracks_connection() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(true));
        let relay = InputRelay::new(ChannelTransport { tx, connected: connected.clone() });

        assert_eq!(relay.send_action(Action::Up).unwrap(), SendOutcome::Sent);
        assert_eq!(rx.try_recv().unwrap(), r#"{"action":"up"}"#);

        connected.store(false, Ordering::Release);
        assert_eq!(relay.send_chat("hi").unwrap(), SendOutcome::Disconnected);
        assert!(rx.try_recv().is_err());
    }
}
