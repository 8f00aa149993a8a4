pub mod token;
pub mod user;

pub use token::{AuthSession, TokenKind};
pub use user::{Credentials, ProfileDraft, UserProfile};
