use std::sync::Arc;

use tracing::{debug, info};

use super::Route;
use crate::models::TokenKind;
use crate::session::{self, now_millis};
use crate::store::TokenStore;

/// Whether a protected view may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    Redirect(Route),
}

/// Why a mount was sent back to sign-in. Logged only, never shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    MissingTokens,
    Malformed,
    Expired,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DenyReason::MissingTokens => "missing-tokens",
            DenyReason::Malformed => "malformed-access-token",
            DenyReason::Expired => "expired-access-token",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Nothing (or a placeholder) is rendered.
    Unresolved,
    /// Children may render.
    Resolved,
}

/// Gate in front of a protected view.
///
/// It trusts only the stored tokens, never in-memory auth state, since the
/// latter does not survive a restart. The check is UX gating: the remote API
/// still validates every request. Each `RouteGuard` is one mount; the check
/// runs once and its result sticks.
pub struct RouteGuard {
    tokens: Arc<dyn TokenStore>,
    state: GuardState,
    decision: Option<GuardDecision>,
}

impl RouteGuard {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        RouteGuard {
            tokens,
            state: GuardState::Unresolved,
            decision: None,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Runs the check against the wall clock.
    pub fn enter(&mut self) -> GuardDecision {
        self.enter_at(now_millis())
    }

    /// Runs the check as of `now_ms`. Later calls on the same mount return
    /// the first decision.
    pub fn enter_at(&mut self, now_ms: i64) -> GuardDecision {
        if let Some(decision) = self.decision {
            return decision;
        }

        let decision = match check(self.tokens.as_ref(), now_ms) {
            Ok(()) => {
                self.state = GuardState::Resolved;
                debug!("Route guard resolved; rendering protected view");
                GuardDecision::Render
            }
            Err(reason) => {
                info!(reason = %reason, "Route guard redirecting to sign-in");
                GuardDecision::Redirect(Route::SignIn)
            }
        };
        self.decision = Some(decision);
        decision
    }
}

/// The decision procedure: both tokens present, access token decodable and
/// not yet expired.
pub fn check(tokens: &dyn TokenStore, now_ms: i64) -> Result<(), DenyReason> {
    let access = tokens.get(TokenKind::Access);
    let refresh = tokens.get(TokenKind::Refresh);
    let (Some(access), Some(_refresh)) = (access, refresh) else {
        return Err(DenyReason::MissingTokens);
    };
    if access.is_empty() {
        return Err(DenyReason::MissingTokens);
    }

    let claims = session::decode(&access).map_err(|e| {
        debug!("Access token rejected: {}", e);
        DenyReason::Malformed
    })?;

    if session::is_expired(&claims, now_ms) {
        return Err(DenyReason::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTokenStore;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const NOW_MS: i64 = 1_700_000_000_000;

    fn token_expiring_at(exp: i64) -> String {
        encode(
            &Header::default(),
            &json!({"token_type": "access", "exp": exp, "user_id": 1}),
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap()
    }

    fn store_with(access: Option<&str>, refresh: Option<&str>) -> Arc<dyn TokenStore> {
        let store = MemoryTokenStore::new();
        if let Some(access) = access {
            store.set(TokenKind::Access, access).unwrap();
        }
        if let Some(refresh) = refresh {
            store.set(TokenKind::Refresh, refresh).unwrap();
        }
        Arc::new(store)
    }

    #[test]
    fn test_valid_tokens_render() {
        let access = token_expiring_at(NOW_MS / 1000 + 300);
        let mut guard = RouteGuard::new(store_with(Some(&access), Some("R")));
        assert_eq!(guard.state(), GuardState::Unresolved);
        assert_eq!(guard.enter_at(NOW_MS), GuardDecision::Render);
        assert_eq!(guard.state(), GuardState::Resolved);
    }

    #[test]
    fn test_missing_tokens_redirect() {
        let access = token_expiring_at(NOW_MS / 1000 + 300);
        for (a, r) in [
            (None, None),
            (Some(access.as_str()), None),
            (None, Some("R")),
            (Some(""), Some("R")),
        ] {
            let tokens = store_with(a, r);
            assert_eq!(
                check(tokens.as_ref(), NOW_MS),
                Err(DenyReason::MissingTokens)
            );
            let mut guard = RouteGuard::new(tokens);
            assert_eq!(
                guard.enter_at(NOW_MS),
                GuardDecision::Redirect(Route::SignIn)
            );
            assert_eq!(guard.state(), GuardState::Unresolved);
        }
    }

    #[test]
    fn test_malformed_access_token_redirects() {
        for access in ["garbage", "a.b", "a.b.c"] {
            let tokens = store_with(Some(access), Some("R"));
            assert_eq!(check(tokens.as_ref(), NOW_MS), Err(DenyReason::Malformed));
            let mut guard = RouteGuard::new(tokens);
            assert_eq!(
                guard.enter_at(NOW_MS),
                GuardDecision::Redirect(Route::SignIn)
            );
        }
    }

    #[test]
    fn test_expired_access_token_redirects_despite_refresh() {
        let refresh = token_expiring_at(NOW_MS / 1000 + 86_400);
        let access = token_expiring_at(NOW_MS / 1000 - 1);
        let tokens = store_with(Some(&access), Some(&refresh));
        assert_eq!(check(tokens.as_ref(), NOW_MS), Err(DenyReason::Expired));
        let mut guard = RouteGuard::new(tokens);
        assert_eq!(
            guard.enter_at(NOW_MS),
            GuardDecision::Redirect(Route::SignIn)
        );
        assert_eq!(guard.state(), GuardState::Unresolved);
    }

    #[test]
    fn test_decision_is_made_once_per_mount() {
        let access = token_expiring_at(NOW_MS / 1000 + 10);
        let tokens = store_with(Some(&access), Some("R"));
        let mut guard = RouteGuard::new(tokens.clone());
        assert_eq!(guard.enter_at(NOW_MS), GuardDecision::Render);

        // Neither later time nor token removal changes this mount.
        tokens.clear().unwrap();
        assert_eq!(guard.enter_at(NOW_MS + 60_000), GuardDecision::Render);

        // A fresh mount re-runs the check.
        let mut remount = RouteGuard::new(tokens);
        assert_eq!(
            remount.enter_at(NOW_MS),
            GuardDecision::Redirect(Route::SignIn)
        );
    }
}
