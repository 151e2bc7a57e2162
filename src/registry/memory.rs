//! In-process host for native builds, the CLI simulator and tests

use async_trait::async_trait;
use futures::channel::oneshot;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use super::provider::{ProviderHost, WalletProvider};
use crate::core::{Account, ProviderFailure};

/// Host whose slots are filled programmatically
#[derive(Default)]
pub struct MemoryHost {
    slots: RefCell<HashMap<String, Rc<dyn WalletProvider>>>,
    registered: RefCell<Vec<Rc<dyn WalletProvider>>>,
}

impl MemoryHost {
    pub fn new() -> Self { Self::default() }

    /// Simulate an extension injecting itself under `slot`
    pub fn inject(&self, slot: &str, provider: Rc<dyn WalletProvider>) {
        self.slots.borrow_mut().insert(slot.to_string(), provider);
    }

    pub fn remove(&self, slot: &str) {
        self.slots.borrow_mut().remove(slot);
    }

    pub fn register(&self, provider: Rc<dyn WalletProvider>) {
        self.registered.borrow_mut().push(provider);
    }

    pub fn clear(&self) {
        self.slots.borrow_mut().clear();
        self.registered.borrow_mut().clear();
    }
}

impl ProviderHost for MemoryHost {
    fn lookup(&self, slot: &str) -> Option<Rc<dyn WalletProvider>> {
        self.slots.borrow().get(slot).cloned()
    }

    fn registered(&self) -> Vec<Rc<dyn WalletProvider>> {
        self.registered.borrow().clone()
    }
}

/// How a scripted wallet answers `enable`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    Approve(Account),
    Reject,
    Fail(String),
    /// Never answers
    Hang,
}

/// Wallet with a scripted answer. Deferred answers take priority, in order.
pub struct ScriptedProvider {
    id: String,
    name: Option<String>,
    script: RefCell<Script>,
    deferred: RefCell<VecDeque<oneshot::Receiver<Result<Account, ProviderFailure>>>>,
    enable_calls: Cell<usize>,
    disconnect_calls: Cell<usize>,
}

impl ScriptedProvider {
    pub fn new(id: impl Into<String>, script: Script) -> Self {
        Self {
            id: id.into(),
            name: None,
            script: RefCell::new(script),
            deferred: RefCell::new(VecDeque::new()),
            enable_calls: Cell::new(0),
            disconnect_calls: Cell::new(0),
        }
    }

    pub fn approving(id: impl Into<String>, address: &str, chain_id: &str) -> Self {
        Self::new(id, Script::Approve(Account::new(address, Some(chain_id.to_string()))))
    }

    pub fn rejecting(id: impl Into<String>) -> Self { Self::new(id, Script::Reject) }

    pub fn failing(id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(id, Script::Fail(detail.into()))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self { self.name = Some(name.into()); self }

    pub fn set_script(&self, script: Script) {
        *self.script.borrow_mut() = script;
    }

    /// Queue an answer the caller resolves later through the returned sender.
    pub fn defer(&self) -> oneshot::Sender<Result<Account, ProviderFailure>> {
        let (tx, rx) = oneshot::channel();
        self.deferred.borrow_mut().push_back(rx);
        tx
    }

    pub fn enable_calls(&self) -> usize { self.enable_calls.get() }
    pub fn disconnect_calls(&self) -> usize { self.disconnect_calls.get() }
}

#[async_trait(?Send)]
impl WalletProvider for ScriptedProvider {
    fn id(&self) -> String { self.id.clone() }

    fn name(&self) -> Option<String> { self.name.clone() }

    async fn enable(&self) -> Result<Account, ProviderFailure> {
        self.enable_calls.set(self.enable_calls.get() + 1);

        let deferred = self.deferred.borrow_mut().pop_front();
        if let Some(rx) = deferred {
            return rx
                .await
                .unwrap_or_else(|_| Err(ProviderFailure::Failed("provider went away".into())));
        }

        let script = self.script.borrow().clone();
        match script {
            Script::Approve(account) => Ok(account),
            Script::Reject => Err(ProviderFailure::Rejected),
            Script::Fail(detail) => Err(ProviderFailure::Failed(detail)),
            Script::Hang => futures::future::pending().await,
        }
    }

    async fn disconnect(&self) {
        self.disconnect_calls.set(self.disconnect_calls.get() + 1);
    }
}
