//! Shared application state.
//!
//! Holds what every view needs: configuration, the token store, and the
//! auth container built on top of it.

use crate::auth::AuthStore;
use crate::config::ConfigV1;
use crate::store::TokenStore;
use std::sync::Arc;

/// Application state shared across all views.
#[derive(Clone)]
pub struct AppState {
    /// Configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Durable access/refresh token storage.
    pub tokens: Arc<dyn TokenStore>,
    /// The auth container; the only writer of user/session state.
    pub auth: Arc<AuthStore>,
}
