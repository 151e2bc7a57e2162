//! Registry - which wallet connectors are available right now?
//!
//! # Detection
//!
//! ```text
//! probes (ranked, most specific first)
//!   starknet_argentX → "Argent X"
//!   starknet_braavos → "Braavos"
//!   starknet         → provider name / "Connector N"
//!        │
//!        ▼
//! host.lookup(slot) ── present? ──► dedupe by provider id ──► Vec<Connector>
//!        ▲
//! host.registered() ─────────────────────┘
//! ```
//!
//! Extensions may inject after page load, so detection is repeatable and
//! cheap. It never fails: an empty list means no wallet was found.

mod memory;
mod provider;

pub use memory::{MemoryHost, Script, ScriptedProvider};
pub use provider::{granted_account, ProviderHost, WalletProvider};

use provider::same_provider;

use crate::core::slots::{label, slot};
use crate::core::Connector;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// One named capability check against the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probe {
    pub slot: String,
    /// Label preferred over the provider's own name
    #[serde(default)]
    pub label: Option<String>,
    /// Lower ranks are probed first and win deduplication
    #[serde(default)]
    pub rank: u32,
}

impl Probe {
    pub fn new(slot: impl Into<String>, rank: u32) -> Self {
        Self { slot: slot.into(), label: None, rank }
    }
    pub fn with_label(mut self, label: impl Into<String>) -> Self { self.label = Some(label.into()); self }
}

/// Starknet wallet slots: Argent X, Braavos, then the generic slot.
pub fn default_probes() -> Vec<Probe> {
    vec![
        Probe::new(slot::ARGENT_X, 0).with_label(label::ARGENT_X),
        Probe::new(slot::BRAAVOS, 1).with_label(label::BRAAVOS),
        Probe::new(slot::GENERIC, 10),
    ]
}

pub struct ProviderRegistry {
    host: Rc<dyn ProviderHost>,
    probes: Vec<Probe>,
}

impl ProviderRegistry {
    pub fn new(host: Rc<dyn ProviderHost>, mut probes: Vec<Probe>) -> Self {
        probes.sort_by_key(|p| p.rank);
        Self { host, probes }
    }

    pub fn with_default_probes(host: Rc<dyn ProviderHost>) -> Self {
        Self::new(host, default_probes())
    }

    pub fn probes(&self) -> &[Probe] { &self.probes }

    /// One detection pass. Order: probes by rank, then host-registered connectors.
    pub fn detect(&self) -> Vec<Connector> {
        let connectors: Vec<Connector> = self.scan().into_iter().map(|(c, _)| c).collect();
        tracing::debug!(count = connectors.len(), "detection pass");
        connectors
    }

    /// Provider handle for a connector id, re-read from the host.
    pub fn resolve(&self, id: &str) -> Option<Rc<dyn WalletProvider>> {
        self.scan().into_iter().find(|(c, _)| c.id == id).map(|(_, p)| p)
    }

    fn scan(&self) -> Vec<(Connector, Rc<dyn WalletProvider>)> {
        let mut found: Vec<(Connector, Rc<dyn WalletProvider>)> = Vec::new();

        for probe in &self.probes {
            let Some(provider) = self.host.lookup(&probe.slot) else { continue };
            let id = provider_id(provider.as_ref(), &probe.slot);
            if seen(&found, &id, &provider) {
                continue;
            }
            let name = probe.label.clone().or_else(|| reported_name(provider.as_ref()));
            found.push((Connector { id, display_name: name.unwrap_or_default(), slot: Some(probe.slot.clone()) }, provider));
        }

        for (position, provider) in self.host.registered().into_iter().enumerate() {
            let id = provider_id(provider.as_ref(), &format!("registered-{}", position + 1));
            if seen(&found, &id, &provider) {
                continue;
            }
            let name = reported_name(provider.as_ref()).unwrap_or_default();
            found.push((Connector { id, display_name: name, slot: None }, provider));
        }

        for (index, (connector, _)) in found.iter_mut().enumerate() {
            if connector.display_name.is_empty() {
                connector.display_name = label::ordinal(index + 1);
            }
        }
        found
    }
}

/// Same id, or the same wallet behind an id-less handle
fn seen(found: &[(Connector, Rc<dyn WalletProvider>)], id: &str, provider: &Rc<dyn WalletProvider>) -> bool {
    found.iter().any(|(c, p)| c.id == id || same_provider(p, provider))
}

fn provider_id(provider: &dyn WalletProvider, fallback: &str) -> String {
    let id = provider.id();
    if id.trim().is_empty() { fallback.to_string() } else { id }
}

fn reported_name(provider: &dyn WalletProvider) -> Option<String> {
    provider.name().filter(|n| !n.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> Rc<MemoryHost> { Rc::new(MemoryHost::new()) }

    #[test]
    fn test_empty_host_detects_nothing() {
        let registry = ProviderRegistry::with_default_probes(host());
        assert!(registry.detect().is_empty());
        assert!(registry.resolve("argentX").is_none());
    }

    #[test]
    fn test_specific_slot_wins_over_generic() {
        let host = host();
        let argent = Rc::new(ScriptedProvider::approving("argentX", "0x01", "SN_SEPOLIA").with_name("argent-x-ext"));
        host.inject(slot::ARGENT_X, argent.clone());
        host.inject(slot::GENERIC, argent);

        let connectors = ProviderRegistry::with_default_probes(host).detect();
        assert_eq!(connectors.len(), 1);
        assert_eq!(connectors[0].id, "argentX");
        assert_eq!(connectors[0].display_name, "Argent X");
        assert_eq!(connectors[0].slot.as_deref(), Some(slot::ARGENT_X));
    }

    #[test]
    fn test_order_follows_rank() {
        let host = host();
        host.inject(slot::GENERIC, Rc::new(ScriptedProvider::approving("okx", "0x03", "SN_SEPOLIA").with_name("OKX")));
        host.inject(slot::BRAAVOS, Rc::new(ScriptedProvider::approving("braavos", "0x02", "SN_SEPOLIA")));
        host.inject(slot::ARGENT_X, Rc::new(ScriptedProvider::approving("argentX", "0x01", "SN_SEPOLIA")));

        let ids: Vec<String> = ProviderRegistry::with_default_probes(host).detect().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["argentX", "braavos", "okx"]);
    }

    #[test]
    fn test_ordinal_fallback_label() {
        let host = host();
        host.inject(slot::BRAAVOS, Rc::new(ScriptedProvider::approving("braavos", "0x02", "SN_SEPOLIA")));
        host.inject(slot::GENERIC, Rc::new(ScriptedProvider::approving("mystery", "0x03", "SN_SEPOLIA")));
        host.register(Rc::new(ScriptedProvider::approving("webwallet", "0x04", "SN_SEPOLIA").with_name(" ")));

        let connectors = ProviderRegistry::with_default_probes(host).detect();
        assert_eq!(connectors[0].display_name, "Braavos");
        assert_eq!(connectors[1].display_name, "Connector 2");
        assert_eq!(connectors[2].display_name, "Connector 3");
        assert_eq!(connectors[2].slot, None);
    }

    #[test]
    fn test_registered_deduped_against_slots() {
        let host = host();
        let braavos = Rc::new(ScriptedProvider::approving("braavos", "0x02", "SN_SEPOLIA"));
        host.inject(slot::BRAAVOS, braavos.clone());
        host.register(braavos);

        let connectors = ProviderRegistry::with_default_probes(host).detect();
        assert_eq!(connectors.len(), 1);
    }

    #[test]
    fn test_idless_provider_in_two_slots_listed_once() {
        let host = host();
        let wallet = Rc::new(ScriptedProvider::approving("", "0x01", "SN_SEPOLIA").with_name("argent-x-ext"));
        host.inject(slot::ARGENT_X, wallet.clone());
        host.inject(slot::GENERIC, wallet.clone());
        host.register(wallet);

        let connectors = ProviderRegistry::with_default_probes(host).detect();
        assert_eq!(connectors.len(), 1);
        assert_eq!(connectors[0].id, slot::ARGENT_X);
        assert_eq!(connectors[0].display_name, "Argent X");
    }

    #[test]
    fn test_idless_registered_providers_kept_apart() {
        let host = host();
        host.register(Rc::new(ScriptedProvider::approving("", "0x0a", "SN_SEPOLIA").with_name("A")));
        host.register(Rc::new(ScriptedProvider::approving(" ", "0x0b", "SN_SEPOLIA").with_name("B")));

        let registry = ProviderRegistry::with_default_probes(host);
        let connectors = registry.detect();
        let names: Vec<&str> = connectors.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(connectors[0].id, "registered-1");
        assert_eq!(connectors[1].id, "registered-2");
        assert_eq!(registry.resolve("registered-2").and_then(|p| p.name()).as_deref(), Some("B"));
    }

    #[test]
    fn test_custom_probe_rank() {
        let host = host();
        host.inject("starknet_keplr", Rc::new(ScriptedProvider::approving("keplr", "0x05", "SN_SEPOLIA")));
        host.inject(slot::ARGENT_X, Rc::new(ScriptedProvider::approving("argentX", "0x01", "SN_SEPOLIA")));

        let mut probes = default_probes();
        probes.push(Probe::new("starknet_keplr", 0).with_label("Keplr"));
        let registry = ProviderRegistry::new(host, probes);
        let names: Vec<String> = registry.detect().into_iter().map(|c| c.display_name).collect();
        assert_eq!(names, vec!["Argent X", "Keplr"]);
        assert!(registry.resolve("keplr").is_some());
    }
}
