//! Session configuration - passed from higher layers

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::core::slots::{env, RECHECK_DELAY_MS};
use crate::core::{ConfigError, ConfigResult};
use crate::network::Network;
use crate::registry::{default_probes, Probe};

/// Session configuration. Higher layers construct this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub app: String,
    pub expected_network: Network,
    /// Late-injection re-check window
    pub recheck_delay_ms: u64,
    /// Give up on a silent wallet after this long. `None` waits forever.
    pub connect_timeout_ms: Option<u64>,
    pub probes: Vec<Probe>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            app: "starklink".into(),
            expected_network: Network::default(),
            recheck_delay_ms: RECHECK_DELAY_MS,
            connect_timeout_ms: None,
            probes: default_probes(),
        }
    }
}

impl SessionConfig {
    pub fn new(app: impl Into<String>) -> Self {
        Self { app: app.into(), ..Default::default() }
    }
    pub fn with_network(mut self, network: Network) -> Self { self.expected_network = network; self }
    pub fn with_recheck_delay(mut self, delay: Duration) -> Self { self.recheck_delay_ms = delay.as_millis() as u64; self }
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self { self.connect_timeout_ms = Some(timeout.as_millis() as u64); self }
    pub fn with_probe(mut self, probe: Probe) -> Self { self.probes.push(probe); self }

    pub fn recheck_delay(&self) -> Duration { Duration::from_millis(self.recheck_delay_ms) }
    pub fn connect_timeout(&self) -> Option<Duration> { self.connect_timeout_ms.map(Duration::from_millis) }

    pub fn from_json(raw: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Defaults overridden by `STARKLINK_*` variables
    pub fn from_env() -> ConfigResult<Self> {
        Self::default().apply_env()
    }

    pub fn apply_env(mut self) -> ConfigResult<Self> {
        if let Some(value) = read_var(env::NETWORK) {
            self.expected_network = Network::from_config(&value).ok_or_else(|| invalid(env::NETWORK, &value))?;
        }
        if let Some(value) = read_var(env::RECHECK_MS) {
            self.recheck_delay_ms = value.parse().map_err(|_| invalid(env::RECHECK_MS, &value))?;
        }
        if let Some(value) = read_var(env::CONNECT_TIMEOUT_MS) {
            let ms: u64 = value.parse().map_err(|_| invalid(env::CONNECT_TIMEOUT_MS, &value))?;
            self.connect_timeout_ms = if ms == 0 { None } else { Some(ms) };
        }
        Ok(self)
    }
}

fn read_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::Invalid { key: key.to_string(), value: value.to_string() }
}
