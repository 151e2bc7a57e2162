//! SessionController - the single writer of session state
//!
//! # State machine
//!
//! ```text
//!                  detect()
//!   Disconnected ───────────► Detecting ──► Disconnected (+connectors)
//!        │  ▲
//!  connect│  │disconnect / provider disconnect
//!        ▼  │
//!   ConnectPending ──granted──► Connected (address, chain, mismatch flag)
//!        │
//!        └──rejected / failed / timed out──► Error (last_error)
//! ```
//!
//! `ConnectPending` is the lock: a second `connect` while pending is ignored,
//! so the wallet never opens two approval popups. Every connect attempt gets a
//! number; a provider answer is applied only if that attempt is still the one
//! pending. Anything else (an intervening `disconnect`, a newer attempt) makes
//! the answer stale and it is dropped.

use futures::channel::mpsc;
use futures::future::{self, Either};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::delay::Delay;
use super::view::{project_for, SessionView};
use crate::config::SessionConfig;
use crate::core::{Account, Connector, ProviderFailure, Session, SessionError, SessionStatus};
use crate::network::NetworkValidator;
use crate::registry::{ProviderHost, ProviderRegistry, WalletProvider};

/// Why `connect` did nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    AlreadyPending,
    AlreadyConnected,
    UnknownConnector(String),
    Detecting,
}

/// What a `connect` call ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected,
    Failed(SessionError),
    Ignored(IgnoreReason),
    /// The provider answered after the attempt was superseded
    Discarded,
}

impl ConnectOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectOutcome::Connected => "connected",
            ConnectOutcome::Failed(_) => "failed",
            ConnectOutcome::Ignored(_) => "ignored",
            ConnectOutcome::Discarded => "discarded",
        }
    }
}

struct Inner {
    session: Session,
    active: Option<Rc<dyn WalletProvider>>,
    attempt: u64,
    rechecking: bool,
    watchers: Vec<mpsc::UnboundedSender<Session>>,
}

impl Inner {
    fn notify(&mut self) {
        let snapshot = self.session.clone();
        self.watchers.retain(|tx| tx.unbounded_send(snapshot.clone()).is_ok());
    }
}

/// Clears the re-check flag even if the re-check future is dropped mid-sleep.
struct RecheckGuard(Rc<RefCell<Inner>>);

impl Drop for RecheckGuard {
    fn drop(&mut self) {
        self.0.borrow_mut().rechecking = false;
    }
}

#[derive(Clone)]
pub struct SessionController {
    registry: Rc<ProviderRegistry>,
    validator: Rc<NetworkValidator>,
    delay: Rc<dyn Delay>,
    recheck_delay: Duration,
    connect_timeout: Option<Duration>,
    inner: Rc<RefCell<Inner>>,
}

impl SessionController {
    pub fn new(registry: ProviderRegistry, validator: NetworkValidator, delay: Rc<dyn Delay>) -> Self {
        Self {
            registry: Rc::new(registry),
            validator: Rc::new(validator),
            delay,
            recheck_delay: SessionConfig::default().recheck_delay(),
            connect_timeout: None,
            inner: Rc::new(RefCell::new(Inner {
                session: Session::default(),
                active: None,
                attempt: 0,
                rechecking: false,
                watchers: Vec::new(),
            })),
        }
    }

    pub fn from_config(config: &SessionConfig, host: Rc<dyn ProviderHost>, delay: Rc<dyn Delay>) -> Self {
        let registry = ProviderRegistry::new(host, config.probes.clone());
        let validator = NetworkValidator::new(config.expected_network.clone());
        let mut controller = Self::new(registry, validator, delay);
        controller.recheck_delay = config.recheck_delay();
        controller.connect_timeout = config.connect_timeout();
        controller
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self { self.connect_timeout = Some(timeout); self }
    pub fn with_recheck_delay(mut self, delay: Duration) -> Self { self.recheck_delay = delay; self }

    /// Snapshot of the current session
    pub fn session(&self) -> Session {
        self.inner.borrow().session.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.borrow().session.status()
    }

    pub fn view(&self) -> SessionView {
        project_for(&self.inner.borrow().session, self.validator.expected())
    }

    pub fn validator(&self) -> &NetworkValidator { &self.validator }

    /// Connector `connect(None)` would pick
    pub fn recommended(&self) -> Option<Connector> {
        self.inner.borrow().session.available_connectors().first().cloned()
    }

    /// Receive a snapshot after every transition
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Session> {
        let (tx, rx) = mpsc::unbounded();
        self.inner.borrow_mut().watchers.push(tx);
        rx
    }

    /// One detection pass. Replaces `available_connectors`.
    ///
    /// From `Disconnected` or `Error` the session passes through `Detecting`
    /// and lands in `Disconnected`. A connected or pending session keeps its
    /// status and only gets a fresh connector list.
    pub fn detect(&self) -> Vec<Connector> {
        {
            let mut inner = self.inner.borrow_mut();
            match inner.session.status() {
                SessionStatus::Detecting => return inner.session.available_connectors().to_vec(),
                SessionStatus::Disconnected | SessionStatus::Error => {
                    inner.session.set_status(SessionStatus::Detecting);
                    inner.notify();
                }
                SessionStatus::ConnectPending | SessionStatus::Connected => {}
            }
        }

        let connectors = self.registry.detect();

        let mut inner = self.inner.borrow_mut();
        inner.session.set_connectors(connectors.clone());
        if inner.session.status() == SessionStatus::Detecting {
            inner.session.set_disconnected();
        }
        tracing::info!(count = connectors.len(), status = %inner.session.status(), "wallets detected");
        inner.notify();
        connectors
    }

    /// Detect now, then once more after the re-check window to catch
    /// extensions that inject late. Only one re-check runs at a time; a call
    /// while one is outstanding just runs an immediate pass.
    pub async fn detect_with_recheck(&self) -> Vec<Connector> {
        let first = self.detect();
        {
            let mut inner = self.inner.borrow_mut();
            if inner.rechecking {
                return first;
            }
            inner.rechecking = true;
        }
        let _guard = RecheckGuard(self.inner.clone());
        self.delay.sleep(self.recheck_delay).await;
        let second = self.detect();
        if second.len() != first.len() {
            tracing::debug!(before = first.len(), after = second.len(), "re-check found late injection");
        }
        second
    }

    /// Connect to `connector_id`, or to the recommended connector when `None`.
    pub async fn connect(&self, connector_id: Option<&str>) -> ConnectOutcome {
        let (attempt, id) = match self.begin_connect(connector_id) {
            Ok(started) => started,
            Err(outcome) => return outcome,
        };

        let Some(provider) = self.registry.resolve(&id) else {
            tracing::warn!(connector = %id, "connector vanished before connect");
            return self.finish(attempt, &id, None, Err(SessionError::NoProviderDetected));
        };

        let answer = self.enable(provider.as_ref()).await.map_err(SessionError::from);
        self.finish(attempt, &id, Some(provider), answer)
    }

    fn begin_connect(&self, connector_id: Option<&str>) -> Result<(u64, String), ConnectOutcome> {
        let mut inner = self.inner.borrow_mut();
        let status = inner.session.status();

        match status {
            SessionStatus::ConnectPending => {
                tracing::debug!("connect ignored: attempt already in flight");
                return Err(ConnectOutcome::Ignored(IgnoreReason::AlreadyPending));
            }
            SessionStatus::Detecting => return Err(ConnectOutcome::Ignored(IgnoreReason::Detecting)),
            _ => {}
        }

        if inner.session.available_connectors().is_empty() {
            tracing::warn!("connect failed: no wallet provider detected");
            inner.active = None;
            inner.session.set_error(SessionError::NoProviderDetected);
            inner.notify();
            return Err(ConnectOutcome::Failed(SessionError::NoProviderDetected));
        }

        if status == SessionStatus::Connected {
            return Err(ConnectOutcome::Ignored(IgnoreReason::AlreadyConnected));
        }

        let id = match connector_id {
            Some(id) if inner.session.has_connector(id) => id.to_string(),
            Some(id) => {
                tracing::debug!(connector = %id, "connect ignored: unknown connector");
                return Err(ConnectOutcome::Ignored(IgnoreReason::UnknownConnector(id.to_string())));
            }
            None => match inner.session.available_connectors().first() {
                Some(first) => first.id.clone(),
                None => return Err(ConnectOutcome::Failed(SessionError::NoProviderDetected)),
            },
        };

        inner.attempt += 1;
        inner.session.begin_connect(&id);
        tracing::info!(connector = %id, attempt = inner.attempt, "connect requested");
        inner.notify();
        Ok((inner.attempt, id))
    }

    async fn enable(&self, provider: &dyn WalletProvider) -> Result<Account, ProviderFailure> {
        let Some(limit) = self.connect_timeout else {
            return provider.enable().await;
        };
        match future::select(provider.enable(), self.delay.sleep(limit)).await {
            Either::Left((answer, _)) => answer,
            Either::Right(_) => Err(ProviderFailure::Failed(format!("timed out after {} ms", limit.as_millis()))),
        }
    }

    fn finish(
        &self,
        attempt: u64,
        id: &str,
        provider: Option<Rc<dyn WalletProvider>>,
        answer: Result<Account, SessionError>,
    ) -> ConnectOutcome {
        let mut inner = self.inner.borrow_mut();
        if inner.attempt != attempt || inner.session.status() != SessionStatus::ConnectPending {
            tracing::debug!(connector = %id, attempt, "stale connect answer discarded");
            return ConnectOutcome::Discarded;
        }

        match answer {
            Ok(account) => {
                let validation = self.validator.validate(account.chain_id.as_deref());
                if !validation.matches {
                    tracing::warn!(
                        chain = account.chain_id.as_deref().unwrap_or("unknown"),
                        expected = self.validator.expected().chain_id(),
                        "wallet on unexpected network"
                    );
                }
                tracing::info!(connector = %id, address = %account.address, "wallet connected");
                inner.active = provider;
                inner.session.set_connected(account, !validation.matches);
                inner.notify();
                ConnectOutcome::Connected
            }
            Err(error) => {
                tracing::warn!(connector = %id, error = %error, "wallet connect failed");
                inner.active = None;
                inner.session.set_error(error.clone());
                inner.notify();
                ConnectOutcome::Failed(error)
            }
        }
    }

    /// Drop the connection. A pending attempt is abandoned and its answer
    /// will be discarded. Calling this while disconnected changes nothing.
    pub async fn disconnect(&self) {
        let active = {
            let mut inner = self.inner.borrow_mut();
            match inner.session.status() {
                SessionStatus::Disconnected | SessionStatus::Detecting => return,
                SessionStatus::Connected | SessionStatus::ConnectPending | SessionStatus::Error => {}
            }
            tracing::info!(from = %inner.session.status(), "disconnect");
            inner.session.set_disconnected();
            inner.notify();
            inner.active.take()
        };
        if let Some(provider) = active {
            provider.disconnect().await;
        }
    }

    /// The wallet dropped the connection on its own.
    pub fn on_provider_disconnected(&self, connector_id: &str) {
        let mut inner = self.inner.borrow_mut();
        if !is_active(&inner.session, connector_id) {
            return;
        }
        tracing::info!(connector = %connector_id, "wallet disconnected");
        inner.active = None;
        inner.session.set_disconnected();
        inner.notify();
    }

    /// The wallet switched accounts. No account means the wallet locked.
    pub fn on_account_changed(&self, connector_id: &str, address: Option<&str>) {
        let address = address.map(str::trim).filter(|a| !a.is_empty());
        let Some(address) = address else {
            self.on_provider_disconnected(connector_id);
            return;
        };
        let mut inner = self.inner.borrow_mut();
        if !is_active(&inner.session, connector_id) || inner.session.address() == Some(address) {
            return;
        }
        tracing::info!(connector = %connector_id, address = %address, "account changed");
        inner.session.set_address(address.to_string());
        inner.notify();
    }

    /// The wallet switched chains; mismatch is re-evaluated.
    pub fn on_network_changed(&self, connector_id: &str, chain_id: Option<&str>) {
        let mut inner = self.inner.borrow_mut();
        if !is_active(&inner.session, connector_id) {
            return;
        }
        let validation = self.validator.validate(chain_id);
        tracing::info!(connector = %connector_id, chain = chain_id.unwrap_or("unknown"), matches = validation.matches, "network changed");
        inner.session.set_chain(chain_id.map(String::from), !validation.matches);
        inner.notify();
    }
}

fn is_active(session: &Session, connector_id: &str) -> bool {
    session.is_connected() && session.connector_id() == Some(connector_id)
}
