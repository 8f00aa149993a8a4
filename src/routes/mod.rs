//! Navigation surface: the four routes and the guard in front of the protected one.

pub mod guard;

use std::str::FromStr;

pub use guard::{check, DenyReason, GuardDecision, GuardState, RouteGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    SignIn,
    SignUp,
    Dashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::SignIn => "/auth/signin",
            Route::SignUp => "/auth/signup",
            Route::Dashboard => "/dashboard",
        }
    }

    /// Only the dashboard sits behind the route guard.
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    /// Accepts paths with or without a trailing slash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let path = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        match path {
            "/" | "" => Ok(Route::Home),
            "/auth/signin" => Ok(Route::SignIn),
            "/auth/signup" => Ok(Route::SignUp),
            "/dashboard" => Ok(Route::Dashboard),
            other => Err(format!("unknown route '{}'", other)),
        }
    }
}
