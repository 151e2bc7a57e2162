//! Provider and host traits
//!
//! `ProviderHost` is the environment a page runs in: a set of global slots
//! that wallet extensions inject into, plus an optional list of connectors
//! registered by a discovery library. `WalletProvider` is one injected wallet.

use async_trait::async_trait;
use std::any::Any;
use std::rc::Rc;

use crate::core::{Account, ProviderFailure};

/// An injected wallet. Futures are `!Send`: browser providers are JS objects.
#[async_trait(?Send)]
pub trait WalletProvider {
    /// Stable identifier; two slots exposing the same wallet report the same id
    fn id(&self) -> String;

    /// Name the wallet reports for itself, if any
    fn name(&self) -> Option<String>;

    /// Ask the wallet for account access. Opens the wallet's approval popup.
    async fn enable(&self) -> Result<Account, ProviderFailure>;

    /// Best-effort release. Wallets without a disconnect API do nothing.
    async fn disconnect(&self) {}

    /// Concrete handle, for identity checks between separately built handles
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }

    /// Whether `other` wraps the same underlying wallet object.
    ///
    /// Hosts that hand out a fresh handle per lookup override this;
    /// shared `Rc` handles are matched by pointer before this is asked.
    fn same_wallet(&self, _other: &dyn WalletProvider) -> bool {
        false
    }
}

/// One wallet reachable through two handles?
pub(crate) fn same_provider(a: &Rc<dyn WalletProvider>, b: &Rc<dyn WalletProvider>) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ()) || a.same_wallet(b.as_ref())
}

/// First non-empty address from `candidates`. A grant with no address is a
/// wallet fault, not a user rejection.
pub fn granted_account(
    candidates: impl IntoIterator<Item = Option<String>>,
    chain_id: Option<String>,
) -> Result<Account, ProviderFailure> {
    let address = candidates
        .into_iter()
        .flatten()
        .map(|a| a.trim().to_string())
        .find(|a| !a.is_empty())
        .ok_or_else(|| ProviderFailure::Failed("no account returned".into()))?;
    Ok(Account::new(address, chain_id))
}

/// Read-only view of the page's injected globals
pub trait ProviderHost {
    /// Provider injected under `slot`, if present right now
    fn lookup(&self, slot: &str) -> Option<Rc<dyn WalletProvider>>;

    /// Connectors registered outside the well-known slots
    fn registered(&self) -> Vec<Rc<dyn WalletProvider>> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_granted_account_takes_first_address() {
        let account = granted_account([None, Some(" ".into()), Some("0x0abc".into())], Some("SN_SEPOLIA".into())).unwrap();
        assert_eq!(account.address, "0x0abc");
        assert_eq!(account.chain_id.as_deref(), Some("SN_SEPOLIA"));
    }

    #[test]
    fn test_empty_grant_is_not_a_rejection() {
        let result = granted_account([None, Some(String::new())], None);
        assert_eq!(result, Err(ProviderFailure::Failed("no account returned".into())));
    }
}
