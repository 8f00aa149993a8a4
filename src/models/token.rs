use serde::{Deserialize, Serialize};

use super::user::UserProfile;

/// The two credentials kept in the token store.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub const ALL: [TokenKind; 2] = [TokenKind::Access, TokenKind::Refresh];

    /// The fixed key under which the token is persisted.
    pub fn key(&self) -> &'static str {
        match self {
            TokenKind::Access => "access_token",
            TokenKind::Refresh => "refresh_token",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Body of a successful login or registration.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AuthSession {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keys_are_fixed() {
        assert_eq!(TokenKind::Access.key(), "access_token");
        assert_eq!(TokenKind::Refresh.key(), "refresh_token");
    }

    #[test]
    fn test_session_without_user() {
        let session: AuthSession =
            serde_json::from_value(json!({"access": "T1", "refresh": "T2"})).unwrap();
        assert_eq!(session.access.as_deref(), Some("T1"));
        assert!(session.user.is_none());
    }
}
