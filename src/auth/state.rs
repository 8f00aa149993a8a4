use serde::Serialize;

use crate::models::UserProfile;

/// Lifecycle of whichever request last touched the state.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl std::fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuthStatus::Idle => "idle",
            AuthStatus::Loading => "loading",
            AuthStatus::Succeeded => "succeeded",
            AuthStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Transitions of the auth slot. Produced by the store, folded by [`AuthState::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    /// A network intent was dispatched.
    Pending,
    /// Login or registration resolved; the payload may omit the user.
    Authenticated(Option<UserProfile>),
    /// The current user was fetched.
    Fetched(UserProfile),
    /// A profile update was accepted; the body is the server's view of the user.
    Updated(UserProfile),
    /// Any intent failed with a normalized message.
    Rejected(String),
    /// The user was restored from somewhere other than the network.
    Restored(Option<UserProfile>),
    LoggedOut,
}

/// The single shared authentication slot.
///
/// `is_authenticated` always equals `user.is_some()`.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<UserProfile>,
    pub is_authenticated: bool,
    pub status: AuthStatus,
    pub error: Option<String>,
}

impl AuthState {
    pub fn is_loading(&self) -> bool {
        self.status == AuthStatus::Loading
    }

    pub fn apply(&mut self, event: AuthEvent) {
        match event {
            AuthEvent::Pending => {
                self.status = AuthStatus::Loading;
                self.error = None;
            }
            AuthEvent::Authenticated(user) => {
                self.status = AuthStatus::Succeeded;
                self.set_user(user);
                self.error = None;
            }
            AuthEvent::Fetched(user) => {
                self.status = AuthStatus::Succeeded;
                self.set_user(Some(user));
            }
            AuthEvent::Updated(update) => {
                self.status = AuthStatus::Succeeded;
                let merged = match self.user.take() {
                    Some(mut current) => {
                        current.merge(update);
                        current
                    }
                    None => update,
                };
                self.set_user(Some(merged));
            }
            AuthEvent::Rejected(message) => {
                self.status = AuthStatus::Failed;
                self.error = Some(message);
            }
            AuthEvent::Restored(user) => self.set_user(user),
            AuthEvent::LoggedOut => *self = AuthState::default(),
        }
    }

    fn set_user(&mut self, user: Option<UserProfile>) {
        self.is_authenticated = user.is_some();
        self.user = user;
    }
}
