use tracing::debug;

use super::{FormError, Screen};
use crate::auth::AuthStore;
use crate::models::Credentials;
use crate::routes::Route;

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        SignUpForm {
            email: email.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    /// Trims every field and checks the confirmation. Nothing is dispatched
    /// when this fails.
    pub fn validate(&self) -> Result<Credentials, FormError> {
        let email = self.email.trim();
        let password = self.password.trim();
        if email.is_empty() || password.is_empty() {
            return Err(FormError::MissingFields);
        }
        if password != self.confirm_password.trim() {
            return Err(FormError::PasswordMismatch);
        }
        Ok(Credentials::new(email, password))
    }

    /// Registers; success sends the user to sign in, failure stays with the
    /// error shown inline.
    pub async fn submit(&self, auth: &AuthStore) -> Result<Screen, FormError> {
        let credentials = self.validate()?;
        match auth.register(&credentials).await {
            Ok(_) => Ok(Screen::at(Route::SignIn).with_notice("Account created. Please sign in.")),
            Err(e) => {
                debug!("Registration failed: {}", e);
                Ok(Screen::at(Route::SignUp)
                    .line("Create Account")
                    .with_error(auth.state().error))
            }
        }
    }
}
