//! The view layer: what each page shows and where it navigates, driven by
//! [`AuthStore`](crate::auth::AuthStore).

pub mod dashboard;
pub mod home;
pub mod signin;
pub mod signup;

use thiserror::Error;

use crate::routes::Route;

pub use dashboard::DashboardView;
pub use home::home;
pub use signin::SignInForm;
pub use signup::SignUpForm;

/// A form rejected on the client, before any request was made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Email and password are required")]
    MissingFields,
    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Where the user ended up and what the page shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Screen {
    pub route: Option<Route>,
    pub body: Vec<String>,
    /// Success banner.
    pub notice: Option<String>,
    /// Inline error next to the submit action.
    pub error: Option<String>,
}

impl Screen {
    pub fn at(route: Route) -> Self {
        Screen {
            route: Some(route),
            ..Default::default()
        }
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.body.push(line.into());
        self
    }

    pub fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }

    pub fn with_error(mut self, error: Option<String>) -> Self {
        self.error = error;
        self
    }

    pub fn route(&self) -> Route {
        self.route.unwrap_or(Route::Home)
    }

    pub fn render(&self) -> String {
        let mut out = Vec::with_capacity(self.body.len() + 3);
        out.push(format!("[{}]", self.route()));
        if let Some(notice) = &self.notice {
            out.push(notice.clone());
        }
        out.extend(self.body.iter().cloned());
        if let Some(error) = &self.error {
            out.push(format!("error: {}", error));
        }
        out.join("\n")
    }
}
