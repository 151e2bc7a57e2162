//! WalletSession: the session controller exposed to JavaScript
//!
//! ```javascript
//! import { WalletSession } from 'starklink';
//!
//! const session = new WalletSession({ expected_network: 'sepolia' });
//! session.subscribe((snapshot) => render(session.view()));
//!
//! await session.detectWithRecheck();   // catches late-injecting extensions
//! const outcome = await session.connect();   // recommended connector
//! ```

use futures::StreamExt;
use js_sys::Function;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::host::WindowHost;
use super::log;
use super::timer::BrowserDelay;
use crate::config::SessionConfig;
use crate::session::{ConnectOutcome, SessionController};

fn js_error(message: impl ToString) -> JsValue {
    JsValue::from_str(&message.to_string())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer).map_err(js_error)
}

type Listener = Closure<dyn FnMut(JsValue)>;

/// A handler registered through the wallet's `on(event, handler)`
struct Subscription {
    wallet: JsValue,
    event: &'static str,
    handler: Listener,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let off = js_sys::Reflect::get(&self.wallet, &JsValue::from_str("off"))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok());
        if let Some(off) = off {
            let _ = off.call2(&self.wallet, &JsValue::from_str(self.event), self.handler.as_ref().unchecked_ref());
        }
    }
}

#[wasm_bindgen]
pub struct WalletSession {
    controller: SessionController,
    host: WindowHost,
    listeners: RefCell<Vec<Subscription>>,
}

#[wasm_bindgen]
impl WalletSession {
    /// Create a session. `config` may be omitted for Sepolia defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WalletSession, JsValue> {
        let config: SessionConfig = if config.is_undefined() || config.is_null() {
            SessionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(js_error)?
        };
        log!("[WalletSession] expecting {}", config.expected_network);

        let host = WindowHost;
        let controller = SessionController::from_config(&config, Rc::new(host), Rc::new(BrowserDelay));
        Ok(Self { controller, host, listeners: RefCell::new(Vec::new()) })
    }

    /// Single detection pass; returns the connectors
    pub fn detect(&self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.detect())
    }

    #[wasm_bindgen(js_name = "detectWithRecheck")]
    pub async fn detect_with_recheck(&self) -> Result<JsValue, JsValue> {
        let connectors = self.controller.detect_with_recheck().await;
        to_js(&connectors)
    }

    /// Connect; resolves to "connected", "failed", "ignored" or "discarded".
    pub async fn connect(&self, connector_id: Option<String>) -> String {
        let outcome = self.controller.connect(connector_id.as_deref()).await;
        if outcome == ConnectOutcome::Connected {
            self.watch_wallet();
        }
        outcome.as_str().to_string()
    }

    pub async fn disconnect(&self) {
        self.listeners.borrow_mut().clear();
        self.controller.disconnect().await;
    }

    pub fn session(&self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.session())
    }

    /// `{short_address, status_label, warning_text, error_message, pending}`
    pub fn view(&self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.view())
    }

    pub fn recommended(&self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.recommended())
    }

    /// Call `callback(session)` after every transition
    pub fn subscribe(&self, callback: Function) {
        let mut rx = self.controller.subscribe();
        wasm_bindgen_futures::spawn_local(async move {
            while let Some(session) = rx.next().await {
                if let Ok(value) = to_js(&session) {
                    let _ = callback.call1(&JsValue::NULL, &value);
                }
            }
        });
    }

    /// Forward the wallet's own events into the controller.
    fn watch_wallet(&self) {
        let session = self.controller.session();
        let Some(id) = session.connector_id().map(String::from) else { return };
        let Some(object) = self.host.object_for(&id) else { return };
        let Some(on) = js_sys::Reflect::get(&object, &JsValue::from_str("on"))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
        else {
            return;
        };

        let mut listeners = self.listeners.borrow_mut();
        listeners.clear();

        let controller = self.controller.clone();
        let wallet_id = id.clone();
        let accounts: Listener = Closure::new(move |value: JsValue| {
            let address = value
                .dyn_ref::<js_sys::Array>()
                .and_then(|accounts| accounts.get(0).as_string())
                .or_else(|| value.as_string());
            controller.on_account_changed(&wallet_id, address.as_deref());
        });

        let controller = self.controller.clone();
        let wallet_id = id;
        let network: Listener = Closure::new(move |value: JsValue| {
            controller.on_network_changed(&wallet_id, value.as_string().as_deref());
        });

        for (event, handler) in [("accountsChanged", accounts), ("networkChanged", network)] {
            let _ = on.call2(&object, &JsValue::from_str(event), handler.as_ref().unchecked_ref());
            listeners.push(Subscription { wallet: object.clone(), event, handler });
        }
    }
}
