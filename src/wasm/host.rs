//! Browser host: probes `window[slot]` for injected Starknet wallets
//!
//! Injected wallet objects expose `id`, `name`, `enable()` (a promise of
//! account addresses), `selectedAddress`, `chainId`, and `on(event, handler)`.

use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect};
use std::any::Any;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::core::slots::slot;
use crate::core::{Account, ProviderFailure};
use crate::registry::{granted_account, ProviderHost, WalletProvider};

/// EIP-1193 user rejection
const CODE_USER_REJECTED: f64 = 4001.0;
/// Starknet wallet API `USER_REFUSED_OP`
const CODE_USER_REFUSED_OP: f64 = 113.0;

const SLOT_PREFIX: &str = "starknet_";

fn get(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn get_string(target: &JsValue, key: &str) -> Option<String> {
    get(target, key).and_then(|v| v.as_string())
}

/// Call `target[method](...args)` and await the result if it is a promise.
async fn call(target: &JsValue, method: &str, args: &Array) -> Result<JsValue, JsValue> {
    let function = get(target, method)
        .and_then(|f| f.dyn_into::<Function>().ok())
        .ok_or_else(|| JsValue::from_str(&format!("{} is not a function", method)))?;
    let result = function.apply(target, args)?;
    if result.has_type::<Promise>() {
        JsFuture::from(result.unchecked_into::<Promise>()).await
    } else {
        Ok(result)
    }
}

fn classify(error: JsValue) -> ProviderFailure {
    if let Some(code) = get(&error, "code").and_then(|c| c.as_f64()) {
        if code == CODE_USER_REJECTED || code == CODE_USER_REFUSED_OP {
            return ProviderFailure::Rejected;
        }
    }
    let detail = get_string(&error, "message")
        .or_else(|| error.as_string())
        .unwrap_or_else(|| format!("{:?}", error));
    ProviderFailure::Failed(detail)
}

/// One injected wallet object
pub struct InjectedProvider {
    object: JsValue,
}

impl InjectedProvider {
    pub fn new(object: JsValue) -> Self { Self { object } }

    pub fn object(&self) -> &JsValue { &self.object }
}

#[async_trait(?Send)]
impl WalletProvider for InjectedProvider {
    fn id(&self) -> String {
        get_string(&self.object, "id").unwrap_or_default()
    }

    fn name(&self) -> Option<String> {
        get_string(&self.object, "name")
    }

    async fn enable(&self) -> Result<Account, ProviderFailure> {
        let granted = call(&self.object, "enable", &Array::new()).await.map_err(classify)?;

        let first = granted
            .dyn_ref::<Array>()
            .and_then(|accounts| accounts.get(0).as_string());
        let selected = get_string(&self.object, "selectedAddress");

        let chain_id = get_string(&self.object, "chainId")
            .or_else(|| get(&self.object, "provider").and_then(|p| get_string(&p, "chainId")));

        granted_account([first, selected], chain_id)
    }

    async fn disconnect(&self) {
        if get(&self.object, "disconnect").is_some() {
            let _ = call(&self.object, "disconnect", &Array::new()).await;
        }
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }

    /// Every lookup wraps the window object anew; compare the objects.
    fn same_wallet(&self, other: &dyn WalletProvider) -> bool {
        other
            .as_any()
            .and_then(|any| any.downcast_ref::<InjectedProvider>())
            .map(|other| Object::is(&self.object, &other.object))
            .unwrap_or(false)
    }
}

/// `window` as a provider host.
///
/// Host-registered connectors are every other `starknet_*` global, which is
/// how wallets outside the well-known list announce themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowHost;

impl WindowHost {
    fn window() -> Option<JsValue> {
        web_sys::window().map(JsValue::from)
    }

    fn wallet_at(key: &str) -> Option<JsValue> {
        Self::window()
            .and_then(|window| get(&window, key))
            .filter(|value| value.is_object())
    }

    fn slot_keys() -> Vec<String> {
        let Some(window) = Self::window() else { return Vec::new() };
        Object::keys(window.unchecked_ref::<Object>())
            .iter()
            .filter_map(|key| key.as_string())
            .filter(|key| key.starts_with(SLOT_PREFIX))
            .collect()
    }

    /// Raw wallet object for a connector id, for event wiring.
    pub fn object_for(&self, id: &str) -> Option<JsValue> {
        std::iter::once(slot::GENERIC.to_string())
            .chain(Self::slot_keys())
            .filter_map(|key| Self::wallet_at(&key))
            .find(|object| get_string(object, "id").as_deref() == Some(id))
    }
}

impl ProviderHost for WindowHost {
    fn lookup(&self, slot: &str) -> Option<Rc<dyn WalletProvider>> {
        Self::wallet_at(slot).map(|object| Rc::new(InjectedProvider::new(object)) as Rc<dyn WalletProvider>)
    }

    fn registered(&self) -> Vec<Rc<dyn WalletProvider>> {
        Self::slot_keys()
            .into_iter()
            .filter_map(|key| Self::wallet_at(&key))
            .map(|object| Rc::new(InjectedProvider::new(object)) as Rc<dyn WalletProvider>)
            .collect()
    }
}
