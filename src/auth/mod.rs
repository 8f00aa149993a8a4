//! The authentication state machine.

pub mod machine;
pub mod state;

pub use machine::{AuthStore, Intent, Outcome};
pub use state::{AuthEvent, AuthState, AuthStatus};
