//! WASM module: the session controller inside a browser page
//!
//! Architecture:
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        WalletSession (JS API)           │
//! │  detect, connect, disconnect, view      │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │          SessionController              │
//! │  state machine, staleness, validator    │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │   WindowHost / InjectedProvider         │
//! │  window[slot] probes, enable() promise  │
//! └─────────────────────────────────────────┘
//! ```

mod host;
mod session;
mod timer;

pub use host::{InjectedProvider, WindowHost};
pub use session::WalletSession;
pub use timer::BrowserDelay;

use wasm_bindgen::prelude::*;

/// Initialize WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Log to browser console
pub fn console_log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

macro_rules! log {
    ($($t:tt)*) => {
        crate::wasm::console_log(&format!($($t)*))
    }
}

pub(crate) use log;
