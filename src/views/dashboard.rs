use std::sync::Arc;

use tracing::{info, warn};

use super::Screen;
use crate::auth::AuthStore;
use crate::models::{ProfileDraft, UserProfile};
use crate::routes::{GuardDecision, GuardState, Route, RouteGuard};
use crate::session::now_millis;
use crate::store::TokenStore;

pub const PROFILE_UPDATED: &str = "Profile updated successfully.";

/// The protected dashboard. One value is one mount: it owns the guard for
/// that mount and the profile edit draft.
pub struct DashboardView {
    guard: RouteGuard,
    draft: ProfileDraft,
    editing: bool,
}

impl DashboardView {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        DashboardView {
            guard: RouteGuard::new(tokens),
            draft: ProfileDraft::default(),
            editing: false,
        }
    }

    pub async fn mount(&mut self, auth: &AuthStore) -> Screen {
        self.mount_at(auth, now_millis()).await
    }

    /// Runs the guard as of `now_ms`, then loads the current user. A failed
    /// load logs the user out.
    pub async fn mount_at(&mut self, auth: &AuthStore, now_ms: i64) -> Screen {
        if let GuardDecision::Redirect(route) = self.guard.enter_at(now_ms) {
            return Screen::at(route);
        }

        match auth.fetch_current_user().await {
            Ok(user) => {
                self.draft = ProfileDraft::from_profile(&user);
                render(&user)
            }
            Err(e) => {
                warn!("Could not load the current user, signing out: {}", e);
                auth.logout();
                Screen::at(Route::SignIn)
            }
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn draft(&self) -> &ProfileDraft {
        &self.draft
    }

    pub fn edit(&mut self) {
        self.editing = true;
    }

    pub fn set_first_name(&mut self, value: impl Into<String>) {
        self.draft.first_name = Some(value.into());
    }

    pub fn set_last_name(&mut self, value: impl Into<String>) {
        self.draft.last_name = Some(value.into());
    }

    /// Drops unsaved edits.
    pub fn cancel(&mut self, auth: &AuthStore) {
        self.editing = false;
        if let Some(user) = auth.state().user {
            self.draft = ProfileDraft::from_profile(&user);
        }
    }

    /// Sends the draft. Failure keeps the user signed in with the error
    /// shown inline.
    pub async fn save(&mut self, auth: &AuthStore) -> Screen {
        if self.guard.state() != GuardState::Resolved {
            return Screen::at(Route::SignIn);
        }

        match auth.update_current_user(&self.draft).await {
            Ok(_) => {
                self.editing = false;
                let state = auth.state();
                let screen = match &state.user {
                    Some(user) => render(user),
                    None => Screen::at(Route::Dashboard),
                };
                screen.with_notice(PROFILE_UPDATED)
            }
            Err(_) => {
                let state = auth.state();
                let screen = match &state.user {
                    Some(user) => render(user),
                    None => Screen::at(Route::Dashboard),
                };
                screen.with_error(state.error)
            }
        }
    }

    pub fn logout(&self, auth: &AuthStore) -> Screen {
        auth.logout();
        info!("Signed out from the dashboard");
        Screen::at(Route::SignIn)
    }
}

fn render(user: &UserProfile) -> Screen {
    let name = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    Screen::at(Route::Dashboard)
        .line(format!("Welcome, {}", user.display_name()))
        .line(format!("Email: {}", user.email))
        .line(format!("Username: {}", user.username))
        .line(format!("First name: {}", name(&user.first_name)))
        .line(format!("Last name: {}", name(&user.last_name)))
}
