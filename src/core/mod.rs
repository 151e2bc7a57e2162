//! Shared types: session record, error taxonomy, slot constants

pub mod error;
pub mod session;
pub mod slots;

pub use error::{ConfigError, ConfigResult, ProviderFailure, SessionError};
pub use session::{Account, Connector, Session, SessionStatus};
