//! Slot and label constants for injected wallet providers
//!
//! Centralized registry for the global names wallets inject themselves under,
//! the labels shown for them, and the Starknet chain identifiers.

/// Well-known `window` slots, most specific first
pub mod slot {
    pub const ARGENT_X: &str = "starknet_argentX";
    pub const BRAAVOS: &str = "starknet_braavos";
    pub const GENERIC: &str = "starknet";

    pub const ALL: &[&str] = &[ARGENT_X, BRAAVOS, GENERIC];
}

/// Labels preferred over provider-reported names for specific slots
pub mod label {
    pub const ARGENT_X: &str = "Argent X";
    pub const BRAAVOS: &str = "Braavos";

    /// Ordinal fallback when neither slot nor provider names the wallet
    pub fn ordinal(position: usize) -> String {
        format!("Connector {}", position)
    }
}

/// Starknet chain identifiers (short strings)
pub mod chain {
    pub const MAINNET: &str = "SN_MAIN";
    pub const SEPOLIA: &str = "SN_SEPOLIA";
}

/// Status labels shown by display components
pub mod status {
    pub const DISCONNECTED: &str = "Disconnected";
    pub const DETECTING: &str = "Detecting wallets";
    pub const CONNECTING: &str = "Connecting...";
    pub const CONNECTED: &str = "Connected";
    pub const NO_PROVIDER: &str = "No wallet detected";
    pub const REJECTED: &str = "Connection rejected";
    pub const PROVIDER_ERROR: &str = "Wallet error";
}

/// Late-injection re-check window
pub const RECHECK_DELAY_MS: u64 = 2000;

/// Environment variables read by `SessionConfig::from_env`
pub mod env {
    pub const NETWORK: &str = "STARKLINK_NETWORK";
    pub const RECHECK_MS: &str = "STARKLINK_RECHECK_MS";
    pub const CONNECT_TIMEOUT_MS: &str = "STARKLINK_CONNECT_TIMEOUT_MS";
    pub const LOG_JSON: &str = "STARKLINK_LOG_JSON";
}
