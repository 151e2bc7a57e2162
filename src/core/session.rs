//! Session record and connector values
//!
//! `Session` is the single record of connection state. Only the controller
//! mutates it; everyone else receives cloned snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::SessionError;

/// Connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionStatus {
    #[default]
    Disconnected,
    Detecting,
    ConnectPending,
    Connected,
    Error,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Disconnected => "disconnected",
            SessionStatus::Detecting => "detecting",
            SessionStatus::ConnectPending => "connect_pending",
            SessionStatus::Connected => "connected",
            SessionStatus::Error => "error",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A wallet provider candidate found by a detection pass.
///
/// Carries no provider handle; the registry resolves handles by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    pub id: String,
    pub display_name: String,
    /// Slot the provider was found under, `None` for host-registered connectors
    pub slot: Option<String>,
}

/// What a provider hands back when it grants access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: String,
    pub chain_id: Option<String>,
}

impl Account {
    pub fn new(address: impl Into<String>, chain_id: Option<String>) -> Self {
        Self { address: address.into(), chain_id }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    status: SessionStatus,
    address: Option<String>,
    chain_id: Option<String>,
    network_mismatch: bool,
    last_error: Option<SessionError>,
    available_connectors: Vec<Connector>,
    connector_id: Option<String>,
    connected_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn status(&self) -> SessionStatus { self.status }
    pub fn address(&self) -> Option<&str> { self.address.as_deref() }
    pub fn chain_id(&self) -> Option<&str> { self.chain_id.as_deref() }
    pub fn network_mismatch(&self) -> bool { self.network_mismatch }
    pub fn last_error(&self) -> Option<&SessionError> { self.last_error.as_ref() }
    pub fn available_connectors(&self) -> &[Connector] { &self.available_connectors }
    pub fn connector_id(&self) -> Option<&str> { self.connector_id.as_deref() }
    pub fn connected_at(&self) -> Option<DateTime<Utc>> { self.connected_at }

    pub fn is_connected(&self) -> bool { self.status == SessionStatus::Connected }
    pub fn is_pending(&self) -> bool { self.status == SessionStatus::ConnectPending }

    pub fn has_connector(&self, id: &str) -> bool {
        self.available_connectors.iter().any(|c| c.id == id)
    }

    /// Account fields only when connected, error only when failed, neither otherwise.
    pub fn is_consistent(&self) -> bool {
        let has_account = self.address.is_some();
        let has_error = self.last_error.is_some();
        match self.status {
            SessionStatus::Connected => has_account && !has_error,
            SessionStatus::Error => has_error && !has_account && self.chain_id.is_none(),
            _ => !has_account && !has_error && self.chain_id.is_none() && !self.network_mismatch,
        }
    }

    pub(crate) fn set_connectors(&mut self, connectors: Vec<Connector>) {
        self.available_connectors = connectors;
    }

    pub(crate) fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
    }

    pub(crate) fn begin_connect(&mut self, connector_id: &str) {
        self.clear_account();
        self.last_error = None;
        self.connector_id = Some(connector_id.to_string());
        self.status = SessionStatus::ConnectPending;
    }

    pub(crate) fn set_connected(&mut self, account: Account, mismatch: bool) {
        self.last_error = None;
        self.address = Some(account.address);
        self.chain_id = account.chain_id;
        self.network_mismatch = mismatch;
        self.connected_at = Some(Utc::now());
        self.status = SessionStatus::Connected;
    }

    pub(crate) fn set_address(&mut self, address: String) {
        self.address = Some(address);
    }

    pub(crate) fn set_chain(&mut self, chain_id: Option<String>, mismatch: bool) {
        self.chain_id = chain_id;
        self.network_mismatch = mismatch;
    }

    pub(crate) fn set_error(&mut self, error: SessionError) {
        self.clear_account();
        self.connector_id = None;
        self.last_error = Some(error);
        self.status = SessionStatus::Error;
    }

    pub(crate) fn set_disconnected(&mut self) {
        self.clear_account();
        self.connector_id = None;
        self.last_error = None;
        self.status = SessionStatus::Disconnected;
    }

    fn clear_account(&mut self) {
        self.address = None;
        self.chain_id = None;
        self.network_mismatch = false;
        self.connected_at = None;
    }
}
