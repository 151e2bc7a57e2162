//! Network - expected-chain checks for connected wallets
//!
//! Wallets report their active chain either as a Starknet short string
//! (`SN_SEPOLIA`) or as the hex felt encoding of that string
//! (`0x534e5f5345504f4c4941`). Both forms normalize to the same `Network`.
//!
//! A mismatch is not an error: the session stays connected and the view
//! carries a warning.

use crate::core::slots::chain;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Sepolia,
    Custom(String),
}

impl Network {
    /// Canonical short-string chain id
    pub fn chain_id(&self) -> &str {
        match self {
            Network::Mainnet => chain::MAINNET,
            Network::Sepolia => chain::SEPOLIA,
            Network::Custom(id) => id,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Sepolia => "sepolia",
            Network::Custom(id) => id,
        }
    }

    /// Parse a config value: `mainnet`, `sepolia`, or any chain id.
    pub fn from_config(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed.to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Network::Mainnet,
            "sepolia" | "testnet" => Network::Sepolia,
            _ => Network::from_chain_id(trimmed),
        })
    }

    /// Map a wallet-reported chain id to a network.
    pub fn from_chain_id(reported: &str) -> Self {
        let normalized = normalize_chain_id(reported);
        match normalized.as_str() {
            chain::MAINNET => Network::Mainnet,
            chain::SEPOLIA => Network::Sepolia,
            _ => Network::Custom(normalized),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => f.write_str("Starknet Mainnet"),
            Network::Sepolia => f.write_str("Starknet Sepolia"),
            Network::Custom(id) => f.write_str(id),
        }
    }
}

/// Decode hex felt chain ids into their short-string form.
///
/// Values that are not valid hex-encoded ASCII are returned trimmed as-is.
pub fn normalize_chain_id(reported: &str) -> String {
    let trimmed = reported.trim();
    let Some(digits) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) else {
        return trimmed.to_string();
    };
    let digits = digits.trim_start_matches('0');
    let padded = if digits.len() % 2 == 1 { format!("0{}", digits) } else { digits.to_string() };
    match hex::decode(&padded) {
        Ok(bytes) if !bytes.is_empty() && bytes.iter().all(|b| b.is_ascii_graphic()) => {
            String::from_utf8(bytes).unwrap_or_else(|_| trimmed.to_string())
        }
        _ => trimmed.to_string(),
    }
}

/// Result of comparing a reported chain against the expected network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub matches: bool,
    pub reported: Option<Network>,
}

/// Compares reported chain ids against a single configured network
#[derive(Debug, Clone)]
pub struct NetworkValidator {
    expected: Network,
    /// `expected.chain_id()` in short-string form
    expected_id: String,
}

impl NetworkValidator {
    pub fn new(expected: Network) -> Self {
        let expected_id = normalize_chain_id(expected.chain_id());
        Self { expected, expected_id }
    }

    pub fn expected(&self) -> &Network { &self.expected }

    /// Both sides are compared in normalized form. Missing ids never match.
    pub fn validate(&self, chain_id: Option<&str>) -> Validation {
        let reported = chain_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(Network::from_chain_id);
        let matches = reported
            .as_ref()
            .map(|network| !self.expected_id.is_empty() && network.chain_id() == self.expected_id)
            .unwrap_or(false);
        Validation { matches, reported }
    }
}

impl Default for NetworkValidator {
    fn default() -> Self { Self::new(Network::default()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEPOLIA_HEX: &str = "0x534e5f5345504f4c4941";
    const MAINNET_HEX: &str = "0x534e5f4d41494e";

    #[test]
    fn test_hex_and_short_string_agree() {
        assert_eq!(normalize_chain_id(SEPOLIA_HEX), "SN_SEPOLIA");
        assert_eq!(normalize_chain_id(MAINNET_HEX), "SN_MAIN");
        assert_eq!(Network::from_chain_id(SEPOLIA_HEX), Network::Sepolia);
        assert_eq!(Network::from_chain_id("SN_MAIN"), Network::Mainnet);
    }

    #[test]
    fn test_non_ascii_hex_kept_raw() {
        assert_eq!(normalize_chain_id("0x01"), "0x01");
        assert_eq!(normalize_chain_id("0xzz"), "0xzz");
        assert_eq!(Network::from_chain_id("0x01"), Network::Custom("0x01".into()));
    }

    #[test]
    fn test_validate() {
        let validator = NetworkValidator::new(Network::Sepolia);
        assert!(validator.validate(Some("SN_SEPOLIA")).matches);
        assert!(validator.validate(Some(SEPOLIA_HEX)).matches);

        let mainnet = validator.validate(Some(MAINNET_HEX));
        assert!(!mainnet.matches);
        assert_eq!(mainnet.reported, Some(Network::Mainnet));

        assert!(!validator.validate(None).matches);
        assert!(!validator.validate(Some("")).matches);
        assert!(!validator.validate(Some("SN_GOERLI")).matches);
    }

    #[test]
    fn test_custom_expected() {
        let validator = NetworkValidator::new(Network::Custom("SN_DEVNET".into()));
        assert!(validator.validate(Some("SN_DEVNET")).matches);
        assert!(!validator.validate(Some("SN_SEPOLIA")).matches);
    }

    #[test]
    fn test_hex_custom_expected() {
        const DEVNET_HEX: &str = "0x534e5f4445564e4554";
        let validator = NetworkValidator::new(Network::Custom(DEVNET_HEX.into()));
        assert!(validator.validate(Some(DEVNET_HEX)).matches);
        assert!(validator.validate(Some("SN_DEVNET")).matches);
        assert!(!validator.validate(Some(SEPOLIA_HEX)).matches);

        let short = NetworkValidator::new(Network::Custom("SN_DEVNET".into()));
        assert!(short.validate(Some(DEVNET_HEX)).matches);

        let blank = NetworkValidator::new(Network::Custom(" ".into()));
        assert!(!blank.validate(Some(" ")).matches);
    }

    #[test]
    fn test_hex_custom_from_json() {
        let network: Network = serde_json::from_str(r#"{"custom": "0x534e5f4445564e4554"}"#).unwrap();
        let validator = NetworkValidator::new(network);
        assert!(validator.validate(Some("0x534e5f4445564e4554")).matches);
    }

    #[test]
    fn test_from_config() {
        assert_eq!(Network::from_config("Mainnet"), Some(Network::Mainnet));
        assert_eq!(Network::from_config(" sepolia "), Some(Network::Sepolia));
        assert_eq!(Network::from_config(SEPOLIA_HEX), Some(Network::Sepolia));
        assert_eq!(Network::from_config("SN_DEVNET"), Some(Network::Custom("SN_DEVNET".into())));
        assert_eq!(Network::from_config("  "), None);
    }
}
