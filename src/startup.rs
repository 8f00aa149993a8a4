//! Application startup.
//!
//! Wires the token store, the HTTP API client and the auth container
//! together from configuration.

use std::sync::Arc;
use tracing::info;

use crate::api::HttpAuthApi;
use crate::auth::AuthStore;
use crate::config::ConfigV1;
use crate::state::AppState;
use crate::store::create_store;

/// Builds the application state.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn build(config: Arc<ConfigV1>) -> Result<AppState, String> {
    let tokens = create_store(&config.storage);
    let api = HttpAuthApi::new(&config.api, tokens.clone())
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

    info!(
        base_url = %config.api.base_url,
        store = tokens.backend(),
        "Client initialised"
    );

    let auth = Arc::new(AuthStore::new(Arc::new(api), tokens.clone()));

    Ok(AppState {
        config,
        tokens,
        auth,
    })
}
