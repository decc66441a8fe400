// WebSocket connection to the game server
use board::Transport;
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use web_sys::WebSocket;

use crate::console_log;
use crate::utils::is_secure_page;

/// Where to connect, as injected into the page (`window.BOMBER_TARGET`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectTarget {
    pub address: String,
    pub port: u16,
    /// Reconnect with backoff after the socket closes.
    pub reconnect: bool,
}

impl Default for ConnectTarget {
    fn default() -> Self {
        Self {
            address: "localhost".to_string(),
            port: 5678,
            reconnect: false,
        }
    }
}

impl ConnectTarget {
    pub fn url(&self, secure: bool) -> String {
        let scheme = if secure { "wss" } else { "ws" };
        format!("{}://{}:{}/", scheme, self.address, self.port)
    }
}

pub struct Connection {
    ws: WebSocket,
    url: String,
}

impl Connection {
    pub fn new(target: &ConnectTarget) -> Result<Self, JsValue> {
        let url = target.url(is_secure_page());
        console_log!("Connecting to: {}", url);
        let ws = WebSocket::new(&url)?;
        Ok(Self { ws, url })
    }

    pub fn websocket(&self) -> &WebSocket {
        &self.ws
    }

    pub fn reconnect(&mut self) -> Result<WebSocket, JsValue> {
        // Detach the old socket so its late events are ignored
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onerror(None);
        self.ws.set_onclose(None);
        let _ = self.ws.close();

        console_log!("Reconnecting to: {}", self.url);
        self.ws = WebSocket::new(&self.url)?;
        Ok(self.ws.clone())
    }
}

impl Transport for Connection {
    type Error = JsValue;

    fn is_connected(&self) -> bool {
        self.ws.ready_state() == WebSocket::OPEN
    }

    fn send_text(&self, text: &str) -> Result<(), JsValue> {
        self.ws.send_with_str(text)
    }
}
