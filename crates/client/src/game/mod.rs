// Browser game state: board pipeline, presentation and outbound input
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use board::{Action, Frame, Game, InputRelay, SendOutcome, Transport};
use wasm_bindgen::JsValue;
use web_sys::WebSocket;

use crate::network::{ConnectTarget, Connection};
use crate::render::Renderer;
use crate::ui::UI;
use crate::utils::document;
use crate::{console_error, console_log};

pub struct GameClient {
    game: Game,
    relay: InputRelay<Connection>,
    renderer: Renderer,
    ui: UI,
    reconnect: bool,

    // Filled by socket callbacks, drained by `update`
    message_queue: Rc<RefCell<VecDeque<String>>>,
    ws_open_flag: Rc<Cell<bool>>,
    ws_close_flag: Rc<Cell<bool>>,
}

impl GameClient {
    pub fn new(board_id: &str, target: &ConnectTarget) -> Result<Self, JsValue> {
        let document = document()?;
        let renderer = Renderer::new(document.clone(), board_id)?;
        let ui = UI::new(document);
        let connection = Connection::new(target)?;

        Ok(Self {
            game: Game::new(),
            relay: InputRelay::new(connection),
            renderer,
            ui,
            reconnect: target.reconnect,
            message_queue: Rc::new(RefCell::new(VecDeque::new())),
            ws_open_flag: Rc::new(Cell::new(false)),
            ws_close_flag: Rc::new(Cell::new(false)),
        })
    }

    pub fn message_queue(&self) -> Rc<RefCell<VecDeque<String>>> {
        self.message_queue.clone()
    }

    pub fn ws_open_flag(&self) -> Rc<Cell<bool>> {
        self.ws_open_flag.clone()
    }

    pub fn ws_close_flag(&self) -> Rc<Cell<bool>> {
        self.ws_close_flag.clone()
    }

    pub fn websocket(&self) -> WebSocket {
        self.relay.transport().websocket().clone()
    }

    pub fn reconnect_enabled(&self) -> bool {
        self.reconnect
    }

    pub fn is_connected(&self) -> bool {
        self.relay.transport().is_connected()
    }

    pub fn ui(&self) -> &UI {
        &self.ui
    }

    /// Frame pump: route queued messages in arrival order, then present.
    pub fn update(&mut self) -> Result<(), JsValue> {
        if self.ws_open_flag.replace(false) {
            self.ui.show_connected();
        }

        loop {
            // Release the queue before routing so socket callbacks never contend
            let Some(text) = self.message_queue.borrow_mut().pop_front() else {
                break;
            };
            if let Err(e) = self.game.handle_text(&text) {
                console_log!("Dropped server message: {}", e);
            }
        }

        let frame = self.game.take_frame();
        if !frame.is_empty() {
            self.present(frame)?;
        }

        if self.ws_close_flag.replace(false) {
            self.ui.show_disconnected();
        }
        Ok(())
    }

    fn present(&mut self, frame: Frame) -> Result<(), JsValue> {
        if let Some(dims) = frame.resized {
            self.renderer.resize(dims)?;
        }
        self.renderer.paint(&frame.cells);
        if let Some(status) = &frame.status {
            self.ui.update_status(status)?;
        }
        let keep = self.game.logs().capacity();
        for line in &frame.logs {
            self.ui.append_log(line, keep)?;
        }
        Ok(())
    }

    /// Send an action; the matching control flashes when it went out.
    pub fn send_action(&self, action: Action) -> bool {
        match self.relay.send_action(action) {
            Ok(SendOutcome::Sent) => {
                self.ui.press_control(action);
                true
            }
            Ok(_) => false,
            Err(e) => {
                console_error!("Failed to send {}: {}", action, e);
                false
            }
        }
    }

    pub fn send_chat(&self, text: &str) -> bool {
        match self.relay.send_chat(text) {
            Ok(outcome) => outcome == SendOutcome::Sent,
            Err(e) => {
                console_error!("Failed to send chat: {}", e);
                false
            }
        }
    }

    /// Open a fresh socket. The session restarts, so the next `init`
    /// rebuilds the board.
    pub fn reconnect(&mut self) -> Result<WebSocket, JsValue> {
        self.message_queue.borrow_mut().clear();
        self.game.reset_session();
        self.relay.transport_mut().reconnect()
    }
}
