use tracing::debug;

use super::{FormError, Screen};
use crate::auth::{AuthState, AuthStore};
use crate::models::Credentials;
use crate::routes::Route;

#[derive(Debug, Clone, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        SignInForm {
            email: email.into(),
            password: password.into(),
        }
    }

    /// On mount an authenticated user is sent straight to the dashboard.
    pub fn mount(state: &AuthState) -> Option<Route> {
        state.is_authenticated.then_some(Route::Dashboard)
    }

    /// Empty fields never reach the network.
    pub fn validate(&self) -> Result<Credentials, FormError> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(FormError::MissingFields);
        }
        Ok(Credentials::new(self.email.clone(), self.password.clone()))
    }

    /// Logs in; success navigates to the dashboard, failure stays with the
    /// error shown inline.
    pub async fn submit(&self, auth: &AuthStore) -> Result<Screen, FormError> {
        let credentials = self.validate()?;
        match auth.login(&credentials).await {
            Ok(_) => Ok(Screen::at(Route::Dashboard)),
            Err(e) => {
                debug!("Login failed: {}", e);
                Ok(Screen::at(Route::SignIn)
                    .line("Welcome Back")
                    .with_error(auth.state().error))
            }
        }
    }
}
