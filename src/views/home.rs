use super::Screen;
use crate::routes::Route;

/// The public landing page.
pub fn home() -> Screen {
    Screen::at(Route::Home)
        .line("Team Shiksha")
        .line("Secure authentication and profile management.")
        .line(format!("Sign in: {}", Route::SignIn))
        .line(format!("Sign up: {}", Route::SignUp))
}
