use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::models::{AuthSession, Credentials, ProfileDraft, TokenKind, UserProfile};
use crate::store::{StoreError, TokenStore};

/// The four calls the client makes against the remote auth API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Login,
    Register,
    FetchCurrentUser,
    UpdateCurrentUser,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Login => "/api/auth/login/",
            Endpoint::Register => "/api/auth/register/",
            Endpoint::FetchCurrentUser | Endpoint::UpdateCurrentUser => "/api/auth/me/",
        }
    }

    /// The message shown when nothing better can be extracted from a failure.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Endpoint::Login => "Login failed",
            Endpoint::Register => "Registration failed",
            Endpoint::FetchCurrentUser => "Failed to load profile",
            Endpoint::UpdateCurrentUser => "Profile update failed",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Endpoint::Login => "login",
            Endpoint::Register => "register",
            Endpoint::FetchCurrentUser => "fetch-current-user",
            Endpoint::UpdateCurrentUser => "update-current-user",
        };
        f.write_str(name)
    }
}

/// A failed API call, already normalized into a user-facing message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server could not be reached or answered with something unreadable.
    #[error("{message}")]
    Transport { message: String },
    /// The server answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// The call succeeded but the returned tokens could not be persisted.
    #[error("{message}")]
    Storage { message: String },
}

impl ApiError {
    pub fn transport(endpoint: Endpoint) -> Self {
        ApiError::Transport {
            message: endpoint.fallback_message().to_string(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Transport { message }
            | ApiError::Rejected { message, .. }
            | ApiError::Storage { message } => message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The remote auth API as seen by the state machine.
///
/// `login`/`register` only return the session. Writing its tokens belongs to
/// the caller, which knows whether the response is still wanted.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, ApiError>;
    async fn register(&self, credentials: &Credentials) -> Result<AuthSession, ApiError>;
    /// Sends the stored access token as a bearer credential.
    async fn fetch_current_user(&self) -> Result<UserProfile, ApiError>;
    async fn update_current_user(&self, draft: &ProfileDraft) -> Result<UserProfile, ApiError>;
}

/// Writes whichever tokens the session carries.
pub fn persist_session(tokens: &dyn TokenStore, session: &AuthSession) -> Result<(), StoreError> {
    if let Some(access) = &session.access {
        tokens.set(TokenKind::Access, access)?;
    }
    if let Some(refresh) = &session.refresh {
        tokens.set(TokenKind::Refresh, refresh)?;
    }
    debug!(
        access = session.access.is_some(),
        refresh = session.refresh.is_some(),
        backend = tokens.backend(),
        "Persisted session tokens"
    );
    Ok(())
}
