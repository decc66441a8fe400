// WASM client entry point for native-bomber
// Presents the board, status and log of one session and relays player input

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use board::Action;
use input::KeyEffect;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, KeyboardEvent, MessageEvent, WebSocket, window};

mod game; // Board pipeline, frame pump, outbound input
mod input; // Key and control mapping
mod network; // WebSocket connection, connect target
mod render; // DOM grid of cell images
mod ui; // Status region, log region, control feedback
mod utils; // Console logging, DOM helpers

pub use game::GameClient;
pub use network::ConnectTarget;

/// Initialize panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub struct BomberClient {
    client: Rc<RefCell<GameClient>>,
}

#[wasm_bindgen]
impl BomberClient {
    /// Connect to `target` (`{address, port, reconnect}`, any field optional)
    /// and draw into the element with id `board_id`.
    #[wasm_bindgen(constructor)]
    pub fn new(board_id: &str, target: JsValue) -> Result<BomberClient, JsValue> {
        init();

        let target = if target.is_undefined() || target.is_null() {
            ConnectTarget::default()
        } else {
            serde_wasm_bindgen::from_value(target)?
        };

        let client = Rc::new(RefCell::new(GameClient::new(board_id, &target)?));

        setup_websocket_handler(client.clone())?;
        setup_animation_loop(client.clone())?;
        setup_input_handlers(client.clone())?;
        setup_control_handlers(client.clone())?;
        setup_chat_handlers(client.clone())?;

        Ok(BomberClient { client })
    }

    /// Send an action by name (`left`, `right`, `up`, `down`, `bomb`).
    pub fn send_action(&self, name: &str) -> bool {
        match Action::from_name(name) {
            Some(action) => self.client.borrow().send_action(action),
            None => false,
        }
    }

    pub fn send_chat(&self, message: &str) -> bool {
        self.client.borrow().send_chat(message)
    }

    pub fn is_connected(&self) -> bool {
        self.client.borrow().is_connected()
    }
}

struct ReconnectState {
    delay_ms: i32,
    max_delay_ms: i32,
    scheduled: bool,
}

impl ReconnectState {
    const INITIAL_DELAY_MS: i32 = 1000;
    const MAX_DELAY_MS: i32 = 5000;

    fn new() -> Self {
        Self {
            delay_ms: Self::INITIAL_DELAY_MS,
            max_delay_ms: Self::MAX_DELAY_MS,
            scheduled: false,
        }
    }

    /// Delay for the next attempt, growing ×1.5 up to the cap.
    fn next_delay(&mut self) -> i32 {
        let current = self.delay_ms;
        self.delay_ms = ((self.delay_ms as f64) * 1.5).min(self.max_delay_ms as f64) as i32;
        current
    }
}

fn attach_websocket_handlers(
    client: Rc<RefCell<GameClient>>,
    ws: WebSocket,
    reconnect_state: Rc<RefCell<ReconnectState>>,
) -> Result<(), JsValue> {
    let message_queue = client.borrow().message_queue();
    let ws_open_flag = client.borrow().ws_open_flag();

    let onmessage = Closure::wrap(Box::new(move |event: MessageEvent| {
        // The server only speaks JSON text frames
        match event.data().as_string() {
            Some(text) => message_queue.borrow_mut().push_back(text),
            None => console_log!("Ignoring non-text frame"),
        }
    }) as Box<dyn FnMut(MessageEvent)>);
    ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();

    let onopen_state = reconnect_state.clone();
    let onopen = Closure::wrap(Box::new(move |_event: JsValue| {
        console_log!("WebSocket connected");
        ws_open_flag.set(true);
        if let Ok(mut state) = onopen_state.try_borrow_mut() {
            state.delay_ms = ReconnectState::INITIAL_DELAY_MS;
            state.scheduled = false;
        }
    }) as Box<dyn FnMut(JsValue)>);
    ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
    onopen.forget();

    let onerror = Closure::wrap(Box::new(move |e: JsValue| {
        console_error!("WebSocket error: {:?}", e);
    }) as Box<dyn FnMut(JsValue)>);
    ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onerror.forget();

    let client_weak: Weak<RefCell<GameClient>> = Rc::downgrade(&client);
    let ws_close_flag = client.borrow().ws_close_flag();
    let reconnect = client.borrow().reconnect_enabled();
    let onclose_state = reconnect_state;
    let onclose = Closure::wrap(Box::new(move |event: CloseEvent| {
        console_log!("WebSocket closed: {}", event.code());
        ws_close_flag.set(true);

        if !reconnect {
            return;
        }
        let delay = {
            let mut state = onclose_state.borrow_mut();
            if state.scheduled {
                return;
            }
            state.scheduled = true;
            state.next_delay()
        };
        schedule_reconnect(client_weak.clone(), onclose_state.clone(), delay);
    }) as Box<dyn FnMut(CloseEvent)>);
    ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
    onclose.forget();

    Ok(())
}

fn schedule_reconnect(
    client_weak: Weak<RefCell<GameClient>>,
    state: Rc<RefCell<ReconnectState>>,
    delay: i32,
) {
    let Some(window) = window() else {
        return;
    };
    let callback = Closure::wrap(Box::new(move || {
        let Some(client_rc) = client_weak.upgrade() else {
            return;
        };
        let attempt = match client_rc.try_borrow_mut() {
            Ok(mut client) => client.reconnect(),
            Err(_) => Err(JsValue::from_str("client busy")),
        };
        match attempt {
            Ok(new_ws) => {
                if let Ok(mut state) = state.try_borrow_mut() {
                    state.scheduled = false;
                }
                if let Err(e) = attach_websocket_handlers(client_rc.clone(), new_ws, state.clone()) {
                    console_error!("Failed to attach handlers: {:?}", e);
                }
            }
            Err(e) => {
                console_error!("Reconnect failed: {:?}", e);
                // Try again on the next close
                if let Ok(mut state) = state.try_borrow_mut() {
                    state.scheduled = false;
                }
            }
        }
    }) as Box<dyn FnMut()>);
    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.as_ref().unchecked_ref(),
        delay,
    );
    callback.forget();
}

fn setup_websocket_handler(client: Rc<RefCell<GameClient>>) -> Result<(), JsValue> {
    let ws = client.borrow().websocket();
    let reconnect_state = Rc::new(RefCell::new(ReconnectState::new()));
    attach_websocket_handlers(client, ws, reconnect_state)
}

fn setup_animation_loop(client: Rc<RefCell<GameClient>>) -> Result<(), JsValue> {
    let window = window().ok_or("No window")?;

    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if let Err(e) = client.borrow_mut().update() {
            console_error!("Update error: {:?}", e);
        }

        if let (Some(win), Some(callback)) = (web_sys::window(), f.borrow().as_ref()) {
            win.request_animation_frame(callback.as_ref().unchecked_ref()).ok();
        }
    }) as Box<dyn FnMut()>));

    if let Some(callback) = g.borrow().as_ref() {
        window.request_animation_frame(callback.as_ref().unchecked_ref())?;
    }

    Ok(())
}

fn setup_input_handlers(client: Rc<RefCell<GameClient>>) -> Result<(), JsValue> {
    let document = utils::document()?;

    let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        let client = client.borrow();
        if client.ui().is_chat_focused() {
            return;
        }
        match input::key_effect(&event.type_(), &event.key()) {
            // Space and arrows would otherwise scroll the page
            KeyEffect::Claim => event.prevent_default(),
            KeyEffect::Send(action) => {
                event.prevent_default();
                client.send_action(action);
            }
            KeyEffect::Ignore => {}
        }
    }) as Box<dyn FnMut(_)>);

    for event_type in ["keydown", "keyup"] {
        document.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())?;
    }
    closure.forget();

    Ok(())
}

fn setup_control_handlers(client: Rc<RefCell<GameClient>>) -> Result<(), JsValue> {
    let document = utils::document()?;

    for action in Action::ALL {
        let Some(control) = document.get_element_by_id(&input::control_id(action)) else {
            continue;
        };
        let client = client.clone();
        let closure = Closure::wrap(Box::new(move |_| {
            client.borrow().send_action(action);
        }) as Box<dyn FnMut(JsValue)>);
        control.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}

fn setup_chat_handlers(client: Rc<RefCell<GameClient>>) -> Result<(), JsValue> {
    let Some(chat_input) = client.borrow().ui().chat_input() else {
        console_log!("No chat input on the page, chat disabled");
        return Ok(());
    };

    // Enter sends, Escape dismisses
    let input = chat_input.clone();
    let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| match event.key().as_str() {
        "Enter" => {
            event.prevent_default();
            client.borrow().send_chat(&input.value());
            input.set_value("");
        }
        "Escape" => {
            event.prevent_default();
            input.set_value("");
            let _ = input.blur();
        }
        _ => {}
    }) as Box<dyn FnMut(_)>);

    chat_input.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
    closure.forget();

    Ok(())
}
