pub mod base;
pub mod errors;
pub mod http_client;

// Re-export so callers can do "use crate::api::{AuthApi, HttpAuthApi};"
pub use base::{persist_session, ApiError, AuthApi, Endpoint};
pub use errors::normalize_error;
pub use http_client::HttpAuthApi;
