// Browser helpers and console logging
use wasm_bindgen::JsValue;
use web_sys::Document;

/// Log to browser console
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => {
        web_sys::console::log_1(&format!($($t)*).into())
    }
}

/// Log an error to browser console
#[macro_export]
macro_rules! console_error {
    ($($t:tt)*) => {
        web_sys::console::error_1(&format!($($t)*).into())
    }
}

pub fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .ok_or("No window")?
        .document()
        .ok_or_else(|| JsValue::from_str("No document"))
}

/// True when the page itself was served over https.
pub fn is_secure_page() -> bool {
    web_sys::window()
        .and_then(|w| w.location().protocol().ok())
        .map(|p| p == "https:")
        .unwrap_or(false)
}
