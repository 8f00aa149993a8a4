use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The profile of the signed-in user as returned by `/api/auth/me/`.
///
/// Only `email` and `username` are guaranteed for display; any field the
/// server adds is kept in `extra` so a round-trip does not drop it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn new(email: impl Into<String>, username: impl Into<String>) -> Self {
        UserProfile {
            email: email.into(),
            username: username.into(),
            ..Default::default()
        }
    }

    /// Folds a server response into this profile.
    ///
    /// The email is immutable once set; every other field present in
    /// `update` replaces the current value.
    pub fn merge(&mut self, update: UserProfile) {
        if update.id.is_some() {
            self.id = update.id;
        }
        if self.email.is_empty() {
            self.email = update.email;
        }
        if !update.username.is_empty() {
            self.username = update.username;
        }
        if update.first_name.is_some() {
            self.first_name = update.first_name;
        }
        if update.last_name.is_some() {
            self.last_name = update.last_name;
        }
        self.extra.extend(update.extra);
    }

    /// "First Last" when a name is known, otherwise the username.
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }
}

/// The editable subset of a profile, sent as a partial update.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl ProfileDraft {
    /// Seeds an edit form from the current profile; missing names become "".
    pub fn from_profile(user: &UserProfile) -> Self {
        ProfileDraft {
            first_name: Some(user.first_name.clone().unwrap_or_default()),
            last_name: Some(user.last_name.clone().unwrap_or_default()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none()
    }
}

/// Email/password pair for login and registration.
#[derive(Serialize, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
