//! Display projection of a session

use serde::{Deserialize, Serialize};

use crate::core::slots::status;
use crate::core::{Session, SessionError, SessionStatus};
use crate::network::Network;

const HEAD: usize = 6;
const TAIL: usize = 4;

const NO_WALLET_WARNING: &str = "No Starknet wallet detected. Install Argent X or Braavos.";

/// What display components render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub short_address: Option<String>,
    pub status_label: String,
    pub warning_text: Option<String>,
    pub error_message: Option<String>,
    pub pending: bool,
}

/// `0xABCDEF1234567890` → `0xABCD...7890`. Short inputs come back unchanged.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= HEAD + TAIL {
        return address.to_string();
    }
    let head: String = chars[..HEAD].iter().collect();
    let tail: String = chars[chars.len() - TAIL..].iter().collect();
    format!("{}...{}", head, tail)
}

pub fn status_label(session: &Session) -> &'static str {
    match session.status() {
        SessionStatus::Disconnected => status::DISCONNECTED,
        SessionStatus::Detecting => status::DETECTING,
        SessionStatus::ConnectPending => status::CONNECTING,
        SessionStatus::Connected => status::CONNECTED,
        SessionStatus::Error => match session.last_error() {
            Some(SessionError::NoProviderDetected) | None => status::NO_PROVIDER,
            Some(SessionError::ConnectionRejectedByUser) => status::REJECTED,
            Some(SessionError::ProviderError(_)) => status::PROVIDER_ERROR,
        },
    }
}

pub fn project(session: &Session) -> SessionView {
    build(session, None)
}

/// Like `project`, naming the expected network in mismatch warnings.
pub fn project_for(session: &Session, expected: &Network) -> SessionView {
    build(session, Some(expected))
}

fn build(session: &Session, expected: Option<&Network>) -> SessionView {
    let short = if session.is_connected() { session.address().map(short_address) } else { None };
    SessionView {
        short_address: short,
        status_label: status_label(session).to_string(),
        warning_text: warning(session, expected),
        error_message: session.last_error().map(|e| e.to_string()),
        pending: session.is_pending(),
    }
}

fn warning(session: &Session, expected: Option<&Network>) -> Option<String> {
    match session.status() {
        SessionStatus::Connected if session.network_mismatch() => {
            let reported = session
                .chain_id()
                .map(|id| Network::from_chain_id(id).to_string())
                .unwrap_or_else(|| "an unknown network".to_string());
            Some(match expected {
                Some(expected) => format!("Wallet is on {}. Switch it to {}.", reported, expected),
                None => format!("Wallet is on {}, not the network this app expects.", reported),
            })
        }
        SessionStatus::Disconnected if session.available_connectors().is_empty() => {
            Some(NO_WALLET_WARNING.to_string())
        }
        SessionStatus::Error if matches!(session.last_error(), Some(SessionError::NoProviderDetected)) => {
            Some(NO_WALLET_WARNING.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Account;

    fn connected(address: &str, chain: Option<&str>, mismatch: bool) -> Session {
        let mut session = Session::default();
        session.begin_connect("argentX");
        session.set_connected(Account::new(address, chain.map(String::from)), mismatch);
        session
    }

    #[test]
    fn test_short_address() {
        assert_eq!(short_address("0xABCDEF1234567890"), "0xABCD...7890");
        assert_eq!(short_address("0x1234"), "0x1234");
        assert_eq!(short_address("0x12345678"), "0x12345678");
        assert_eq!(short_address("0x123456789"), "0x1234...6789");
        assert_eq!(short_address(""), "");
        assert_eq!(short_address("ñandú-ñandú-ñandú"), "ñandú-...andú");
    }

    #[test]
    fn test_connected_view() {
        let view = project(&connected("0xABCDEF1234567890", Some("SN_SEPOLIA"), false));
        assert_eq!(view.short_address.as_deref(), Some("0xABCD...7890"));
        assert_eq!(view.status_label, "Connected");
        assert_eq!(view.warning_text, None);
        assert!(!view.pending);
    }

    #[test]
    fn test_mismatch_warning() {
        let session = connected("0xABCDEF1234567890", Some("0x534e5f4d41494e"), true);
        let generic = project(&session);
        assert!(generic.warning_text.unwrap().contains("Starknet Mainnet"));

        let named = project_for(&session, &Network::Sepolia);
        assert_eq!(
            named.warning_text.as_deref(),
            Some("Wallet is on Starknet Mainnet. Switch it to Starknet Sepolia.")
        );
    }

    #[test]
    fn test_disconnected_views() {
        let empty = project(&Session::default());
        assert_eq!(empty.short_address, None);
        assert_eq!(empty.status_label, "Disconnected");
        assert_eq!(empty.warning_text.as_deref(), Some(NO_WALLET_WARNING));

        let mut pending = Session::default();
        pending.begin_connect("braavos");
        let view = project(&pending);
        assert!(view.pending);
        assert_eq!(view.status_label, "Connecting...");
        assert_eq!(view.short_address, None);
    }

    #[test]
    fn test_error_views() {
        let mut session = Session::default();
        session.set_error(SessionError::ConnectionRejectedByUser);
        let view = project(&session);
        assert_eq!(view.status_label, "Connection rejected");
        assert_eq!(view.error_message.as_deref(), Some("connection rejected by user"));

        session.set_error(SessionError::ProviderError("boom".into()));
        assert_eq!(project(&session).status_label, "Wallet error");
        assert_eq!(project(&session).error_message.as_deref(), Some("provider error: boom"));

        session.set_error(SessionError::NoProviderDetected);
        let view = project(&session);
        assert_eq!(view.status_label, "No wallet detected");
        assert_eq!(view.warning_text.as_deref(), Some(NO_WALLET_WARNING));
    }
}
