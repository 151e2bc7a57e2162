//! Starklink: wallet sessions for Starknet dApps.
//!
//! Discovers browser-injected wallet providers, negotiates a connection,
//! tracks its status, and checks the wallet's network against the one the
//! application expects.
//!
//! # Architecture
//!
//! ```text
//! SessionController (single writer of Session)
//!   │
//!   ├── ProviderRegistry
//!   │     ├── Probe list: starknet_argentX, starknet_braavos, starknet
//!   │     └── ProviderHost: WindowHost (browser) | MemoryHost (native/tests)
//!   │
//!   ├── NetworkValidator (expected chain: SN_SEPOLIA by default)
//!   │
//!   └── subscribers ◄── Session snapshots ──► SessionView (display projection)
//! ```
//!
//! # Operations
//!
//! | Operation | Method | Effect |
//! |-----------|--------|--------|
//! | detect | `controller.detect()` | Refresh `available_connectors` |
//! | re-check | `controller.detect_with_recheck()` | Detect, wait 2 s, detect again |
//! | connect | `controller.connect(id)` | `ConnectPending` → `Connected` / `Error` |
//! | disconnect | `controller.disconnect()` | → `Disconnected` |
//! | view | `controller.view()` | Short address, status label, warning |
//!
//! # Features
//!
//! - `native` - tokio timers, tracing-subscriber logging, CLI simulator
//! - `wasm` - `window` slot probing and `WalletSession` JS bindings
//!
//! # Usage
//!
//! ```ignore
//! use starklink::{MemoryHost, ScriptedProvider, SessionConfig, SessionController, TokioDelay};
//! use std::rc::Rc;
//!
//! let host = Rc::new(MemoryHost::new());
//! host.inject("starknet_argentX", Rc::new(ScriptedProvider::approving("argentX", "0xabc", "SN_SEPOLIA")));
//!
//! let controller = SessionController::from_config(&SessionConfig::default(), host, Rc::new(TokioDelay));
//! controller.detect();
//! controller.connect(None).await;
//! assert!(controller.session().is_connected());
//! ```

// =============================================================================
// Shared modules (compile everywhere)
// =============================================================================
pub mod config;
pub mod core;
pub mod network;
pub mod registry;
pub mod session;

// =============================================================================
// Native-only modules
// =============================================================================
#[cfg(feature = "native")]
pub mod logging;

// =============================================================================
// WASM-only modules (browser, wasm-bindgen)
// =============================================================================
#[cfg(feature = "wasm")]
pub mod wasm;

// =============================================================================
// Re-exports
// =============================================================================
pub use crate::config::SessionConfig;
pub use crate::core::{Account, ConfigError, Connector, ProviderFailure, Session, SessionError, SessionStatus};
pub use crate::network::{Network, NetworkValidator, Validation};
pub use crate::registry::{
    default_probes, MemoryHost, Probe, ProviderHost, ProviderRegistry, Script, ScriptedProvider, WalletProvider,
};
pub use crate::session::{project, ConnectOutcome, Delay, IgnoreReason, SessionController, SessionView};

#[cfg(feature = "native")]
pub use crate::session::TokioDelay;

#[cfg(feature = "wasm")]
pub use crate::wasm::{BrowserDelay, WalletSession, WindowHost};
