use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::state::{AuthEvent, AuthState};
use crate::api::{persist_session, ApiError, AuthApi, Endpoint};
use crate::models::{AuthSession, Credentials, ProfileDraft, UserProfile};
use crate::store::TokenStore;

/// A named user action driving one transition cycle of the auth slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Login(Credentials),
    Register(Credentials),
    FetchCurrentUser,
    UpdateCurrentUser(ProfileDraft),
    Logout,
}

/// What a fulfilled intent resolved with.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Session(AuthSession),
    User(UserProfile),
    LoggedOut,
}

/// The application's auth container: one writer entry point (`dispatch`),
/// read-only projections (`state`, `subscribe`).
///
/// Every network intent is tagged with a request id when dispatched. A
/// resolution only lands if no newer intent (or logout) has been dispatched
/// since; otherwise it is dropped and only its caller sees the result. This
/// covers the token pair too: a login that resolves after logout never
/// writes its tokens.
pub struct AuthStore {
    api: Arc<dyn AuthApi>,
    tokens: Arc<dyn TokenStore>,
    state: watch::Sender<AuthState>,
    latest_request: AtomicU64,
}

impl AuthStore {
    pub fn new(api: Arc<dyn AuthApi>, tokens: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        AuthStore {
            api,
            tokens,
            state,
            latest_request: AtomicU64::new(0),
        }
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// A receiver notified after every applied transition.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Runs an intent to completion. The returned result lets callers
    /// branch (e.g. navigate only on success); failures are also recorded
    /// in the state's `error` field.
    pub async fn dispatch(&self, intent: Intent) -> Result<Outcome, String> {
        match intent {
            Intent::Login(credentials) => self.login(&credentials).await.map(Outcome::Session),
            Intent::Register(credentials) => {
                self.register(&credentials).await.map(Outcome::Session)
            }
            Intent::FetchCurrentUser => self.fetch_current_user().await.map(Outcome::User),
            Intent::UpdateCurrentUser(draft) => {
                self.update_current_user(&draft).await.map(Outcome::User)
            }
            Intent::Logout => {
                self.logout();
                Ok(Outcome::LoggedOut)
            }
        }
    }

    /// Logs in. Both tokens are in the token store by the time this returns
    /// `Ok`, unless a newer intent superseded it.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthSession, String> {
        let endpoint = Endpoint::Login;
        self.run(endpoint, self.api.login(credentials), |session| {
            self.store_session(endpoint, session)
        })
        .await
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<AuthSession, String> {
        let endpoint = Endpoint::Register;
        self.run(endpoint, self.api.register(credentials), |session| {
            self.store_session(endpoint, session)
        })
        .await
    }

    pub async fn fetch_current_user(&self) -> Result<UserProfile, String> {
        self.run(
            Endpoint::FetchCurrentUser,
            self.api.fetch_current_user(),
            |user| Ok(AuthEvent::Fetched(user.clone())),
        )
        .await
    }

    pub async fn update_current_user(&self, draft: &ProfileDraft) -> Result<UserProfile, String> {
        self.run(
            Endpoint::UpdateCurrentUser,
            self.api.update_current_user(draft),
            |user| Ok(AuthEvent::Updated(user.clone())),
        )
        .await
    }

    /// Clears both tokens and resets to the initial state. Never fails and
    /// never touches the network; in-flight requests become stale.
    pub fn logout(&self) {
        self.state.send_modify(|state| {
            self.latest_request.fetch_add(1, Ordering::SeqCst);
            if let Err(e) = self.tokens.clear() {
                error!("Failed to clear stored tokens on logout: {}", e);
            }
            state.apply(AuthEvent::LoggedOut);
        });
        info!("Logged out");
    }

    /// Sets the user without a request, e.g. from a cached profile.
    pub fn restore_user(&self, user: Option<UserProfile>) {
        self.state
            .send_modify(|state| state.apply(AuthEvent::Restored(user)));
    }

    fn store_session(
        &self,
        endpoint: Endpoint,
        session: &AuthSession,
    ) -> Result<AuthEvent, ApiError> {
        persist_session(self.tokens.as_ref(), session).map_err(|e| {
            warn!(intent = %endpoint, "Failed to persist tokens: {}", e);
            ApiError::Storage {
                message: endpoint.fallback_message().to_string(),
            }
        })?;
        Ok(AuthEvent::Authenticated(session.user.clone()))
    }

    /// `commit` runs under the state lock, and only if the request is still
    /// the latest one. Its error turns the whole intent into a failure.
    async fn run<T, F, C>(&self, endpoint: Endpoint, call: F, commit: C) -> Result<T, String>
    where
        F: Future<Output = Result<T, ApiError>>,
        C: FnOnce(&T) -> Result<AuthEvent, ApiError>,
    {
        let request_id = self.begin(endpoint);

        let result = call.await;
        if let Err(e) = &result {
            warn!(
                intent = %endpoint,
                request_id,
                status = e.status(),
                "Intent failed: {}",
                e.message()
            );
        }

        let mut commit_error = None;
        let applied = self.state.send_if_modified(|state| {
            if self.latest_request.load(Ordering::SeqCst) != request_id {
                return false;
            }
            let event = match &result {
                Ok(value) => match commit(value) {
                    Ok(event) => event,
                    Err(e) => {
                        let event = AuthEvent::Rejected(e.message().to_string());
                        commit_error = Some(e);
                        event
                    }
                },
                Err(e) => AuthEvent::Rejected(e.message().to_string()),
            };
            state.apply(event);
            true
        });

        if applied {
            debug!(intent = %endpoint, request_id, "Intent resolved");
        } else {
            debug!(
                intent = %endpoint,
                request_id,
                "Dropping stale resolution; a newer intent owns the state"
            );
        }

        match commit_error {
            Some(e) => Err(e.message().to_string()),
            None => result.map_err(|e| e.message().to_string()),
        }
    }

    fn begin(&self, endpoint: Endpoint) -> u64 {
        let mut request_id = 0;
        self.state.send_modify(|state| {
            request_id = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
            state.apply(AuthEvent::Pending);
        });
        debug!(intent = %endpoint, request_id, "Intent dispatched");
        request_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthStatus;
    use crate::models::TokenKind;
    use crate::store::{MemoryTokenStore, StoreError};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    type Gate = Option<oneshot::Receiver<()>>;

    /// Scripted API: each call pops the next prepared response. A response
    /// may be gated on a oneshot so tests can control resolution order.
    #[derive(Default)]
    struct FakeApi {
        sessions: Mutex<Vec<(Gate, Result<AuthSession, ApiError>)>>,
        users: Mutex<Vec<(Gate, Result<UserProfile, ApiError>)>>,
        calls: AtomicUsize,
    }

    impl FakeApi {
        fn push_session(&self, response: Result<AuthSession, ApiError>) {
            self.sessions.lock().unwrap().insert(0, (None, response));
        }

        fn push_gated_session(
            &self,
            response: Result<AuthSession, ApiError>,
        ) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.sessions.lock().unwrap().insert(0, (Some(rx), response));
            tx
        }

        fn push_user(&self, response: Result<UserProfile, ApiError>) {
            self.users.lock().unwrap().insert(0, (None, response));
        }

        fn push_gated_user(&self, response: Result<UserProfile, ApiError>) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.users.lock().unwrap().insert(0, (Some(rx), response));
            tx
        }

        async fn next_session(&self) -> Result<AuthSession, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (gate, response) = self.sessions.lock().unwrap().pop().expect("no session scripted");
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            response
        }

        async fn next_user(&self) -> Result<UserProfile, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (gate, response) = self.users.lock().unwrap().pop().expect("no user scripted");
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            response
        }
    }

    #[async_trait]
    impl AuthApi for FakeApi {
        async fn login(&self, _credentials: &Credentials) -> Result<AuthSession, ApiError> {
            self.next_session().await
        }

        async fn register(&self, _credentials: &Credentials) -> Result<AuthSession, ApiError> {
            self.next_session().await
        }

        async fn fetch_current_user(&self) -> Result<UserProfile, ApiError> {
            self.next_user().await
        }

        async fn update_current_user(&self, _draft: &ProfileDraft) -> Result<UserProfile, ApiError> {
            self.next_user().await
        }
    }

    fn setup() -> (Arc<FakeApi>, Arc<dyn TokenStore>, AuthStore) {
        let tokens: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
        let api = Arc::new(FakeApi::default());
        let store = AuthStore::new(api.clone(), tokens.clone());
        (api, tokens, store)
    }

    fn session(user: Option<UserProfile>) -> AuthSession {
        AuthSession {
            access: Some("T1".to_string()),
            refresh: Some("T2".to_string()),
            user,
        }
    }

    fn rejected(message: &str) -> ApiError {
        ApiError::Rejected {
            status: 400,
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let (api, tokens, store) = setup();
        api.push_session(Ok(session(Some(UserProfile::new("a@b.com", "a")))));

        let outcome = store
            .dispatch(Intent::Login(Credentials::new("a@b.com", "secret")))
            .await
            .expect("login should succeed");
        assert!(matches!(outcome, Outcome::Session(_)));

        assert_eq!(tokens.get(TokenKind::Access).as_deref(), Some("T1"));
        assert_eq!(tokens.get(TokenKind::Refresh).as_deref(), Some("T2"));
        let state = store.state();
        assert_eq!(state.status, AuthStatus::Succeeded);
        assert!(state.is_authenticated);
        assert_eq!(state.user.unwrap().email, "a@b.com");
    }

    #[tokio::test]
    async fn test_login_without_user_is_not_authenticated() {
        let (api, tokens, store) = setup();
        api.push_session(Ok(session(None)));

        store
            .login(&Credentials::new("a@b.com", "secret"))
            .await
            .unwrap();

        assert_eq!(tokens.get(TokenKind::Access).as_deref(), Some("T1"));
        let state = store.state();
        assert_eq!(state.status, AuthStatus::Succeeded);
        assert!(!state.is_authenticated);
    }

    #[tokio::test]
    async fn test_login_failure_records_error() {
        let (api, tokens, store) = setup();
        api.push_session(Err(rejected("Invalid email or password")));

        let err = store
            .login(&Credentials::new("a@b.com", "nope"))
            .await
            .unwrap_err();

        assert_eq!(err, "Invalid email or password");
        assert_eq!(tokens.get(TokenKind::Access), None);
        let state = store.state();
        assert_eq!(state.status, AuthStatus::Failed);
        assert_eq!(state.error.as_deref(), Some("Invalid email or password"));
        assert!(!state.is_authenticated);
    }

    #[tokio::test]
    async fn test_failed_update_keeps_user() {
        let (api, _tokens, store) = setup();
        api.push_session(Ok(session(Some(UserProfile::new("a@b.com", "a")))));
        api.push_user(Err(rejected("Profile update failed")));
        store
            .login(&Credentials::new("a@b.com", "secret"))
            .await
            .unwrap();
        let before = store.state();

        let result = store
            .dispatch(Intent::UpdateCurrentUser(ProfileDraft {
                first_name: Some("X".to_string()),
                last_name: None,
            }))
            .await;

        assert!(result.is_err());
        let after = store.state();
        assert_eq!(after.user, before.user);
        assert_eq!(after.is_authenticated, before.is_authenticated);
        assert_eq!(after.status, AuthStatus::Failed);
        assert!(after.error.is_some());
    }

    #[tokio::test]
    async fn test_fetch_after_login_matches_identity() {
        let (api, _tokens, store) = setup();
        api.push_session(Ok(session(Some(UserProfile::new("a@b.com", "a")))));
        let mut fetched = UserProfile::new("a@b.com", "a");
        fetched.id = Some(1);
        fetched.first_name = Some("Test".to_string());
        api.push_user(Ok(fetched));

        store
            .login(&Credentials::new("a@b.com", "secret"))
            .await
            .unwrap();
        store.dispatch(Intent::FetchCurrentUser).await.unwrap();

        let user = store.state().user.unwrap();
        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.username, "a");
        assert_eq!(user.first_name.as_deref(), Some("Test"));
    }

    #[tokio::test]
    async fn test_logout_resets_everything() {
        let (api, tokens, store) = setup();
        api.push_session(Ok(session(Some(UserProfile::new("a@b.com", "a")))));
        store
            .login(&Credentials::new("a@b.com", "secret"))
            .await
            .unwrap();

        let outcome = store.dispatch(Intent::Logout).await.unwrap();

        assert_eq!(outcome, Outcome::LoggedOut);
        assert_eq!(tokens.get(TokenKind::Access), None);
        assert_eq!(tokens.get(TokenKind::Refresh), None);
        assert_eq!(store.state(), AuthState::default());
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let (api, _tokens, store) = setup();
        api.push_session(Ok(session(Some(UserProfile::new("a@b.com", "a")))));
        let mut rx = store.subscribe();

        store
            .login(&Credentials::new("a@b.com", "secret"))
            .await
            .unwrap();

        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_authenticated);
    }

    #[tokio::test]
    async fn test_stale_resolution_is_dropped() {
        let (api, _tokens, store) = setup();
        let store = Arc::new(store);
        let mut slow = UserProfile::new("a@b.com", "a");
        slow.first_name = Some("Slow".to_string());
        let mut fast = UserProfile::new("a@b.com", "a");
        fast.first_name = Some("Fast".to_string());
        let release_slow = api.push_gated_user(Ok(slow));
        api.push_user(Ok(fast));

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_current_user().await }
        });
        // Let the first request reach its gate before dispatching the second.
        while api.calls.load(Ordering::SeqCst) < 1 {
            tokio::task::yield_now().await;
        }
        store.fetch_current_user().await.unwrap();
        release_slow.send(()).unwrap();
        let slow_result = first.await.unwrap().unwrap();

        // The caller still gets its own answer...
        assert_eq!(slow_result.first_name.as_deref(), Some("Slow"));
        // ...but the shared slot keeps the newer one.
        let state = store.state();
        assert_eq!(state.status, AuthStatus::Succeeded);
        assert_eq!(state.user.unwrap().first_name.as_deref(), Some("Fast"));
    }

    #[tokio::test]
    async fn test_logout_invalidates_in_flight_requests() {
        let (api, _tokens, store) = setup();
        let store = Arc::new(store);
        let release = api.push_gated_user(Ok(UserProfile::new("a@b.com", "a")));

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_current_user().await }
        });
        while api.calls.load(Ordering::SeqCst) < 1 {
            tokio::task::yield_now().await;
        }
        assert!(store.state().is_loading());

        store.logout();
        release.send(()).unwrap();
        pending.await.unwrap().unwrap();

        assert_eq!(store.state(), AuthState::default());
    }

    #[tokio::test]
    async fn test_login_resolving_after_logout_writes_no_tokens() {
        let (api, tokens, store) = setup();
        let store = Arc::new(store);
        let release =
            api.push_gated_session(Ok(session(Some(UserProfile::new("a@b.com", "a")))));

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.login(&Credentials::new("a@b.com", "secret")).await }
        });
        while api.calls.load(Ordering::SeqCst) < 1 {
            tokio::task::yield_now().await;
        }

        store.logout();
        release.send(()).unwrap();
        pending.await.unwrap().unwrap();

        assert_eq!(store.state(), AuthState::default());
        assert_eq!(tokens.get(TokenKind::Access), None);
        assert_eq!(tokens.get(TokenKind::Refresh), None);
    }

    #[tokio::test]
    async fn test_login_storage_failure_is_reported() {
        let api = Arc::new(FakeApi::default());
        let tokens: Arc<dyn TokenStore> = Arc::new(FailingStore);
        let store = AuthStore::new(api.clone(), tokens);
        api.push_session(Ok(session(Some(UserProfile::new("a@b.com", "a")))));

        let err = store
            .login(&Credentials::new("a@b.com", "secret"))
            .await
            .unwrap_err();

        assert_eq!(err, "Login failed");
        let state = store.state();
        assert_eq!(state.status, AuthStatus::Failed);
        assert!(!state.is_authenticated);
    }

    struct FailingStore;

    impl TokenStore for FailingStore {
        fn get(&self, _kind: TokenKind) -> Option<String> {
            None
        }

        fn set(&self, kind: TokenKind, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io {
                path: kind.key().into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }

        fn remove(&self, _kind: TokenKind) -> Result<(), StoreError> {
            Ok(())
        }

        fn backend(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_restore_user() {
        let (_api, _tokens, store) = setup();
        store.restore_user(Some(UserProfile::new("a@b.com", "a")));
        assert!(store.state().is_authenticated);
        store.restore_user(None);
        assert!(!store.state().is_authenticated);
    }
}
