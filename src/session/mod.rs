//! Session - connect/disconnect state machine and its display projection

mod controller;
mod delay;
pub mod view;

pub use controller::{ConnectOutcome, IgnoreReason, SessionController};
pub use delay::Delay;
#[cfg(feature = "native")]
pub use delay::TokioDelay;
pub use view::{project, project_for, short_address, SessionView};
