//! Session state container.
//!
//! Owns the authenticated identity, the locally minted bearer token, the
//! inactivity lock, and the set of publications the user may act on. One
//! instance is constructed per application session and shared (via `Arc`)
//! with the login flow and the content store.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::CmsApi;
use crate::error::Result;
use crate::session::model::{Permissions, Session, SessionSnapshot, UserProfile};
use crate::session::repository::SnapshotRepository;

/// Minutes of inactivity after which an authenticated session locks.
pub const INACTIVITY_LOCK_MINUTES: i64 = 5;

/// State container for the authenticated session.
pub struct SessionStore {
    api: Arc<dyn CmsApi>,
    snapshots: Arc<dyn SnapshotRepository>,
    state: Mutex<Session>,
}

impl SessionStore {
    pub fn new(api: Arc<dyn CmsApi>, snapshots: Arc<dyn SnapshotRepository>) -> Self {
        Self {
            api,
            snapshots,
            state: Mutex::new(Session::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.state.lock().expect("session state lock poisoned")
    }

    /// Finalizes a successful two-factor login.
    ///
    /// Builds the normalized profile, fetches the user's allowed
    /// publications, then commits user, token, activity timestamp and
    /// permissions in one step and persists the snapshot. The publications
    /// fetch happens before anything is committed, so a failure leaves no
    /// partial session visible to callers.
    pub async fn complete_login(&self, raw_user: &Value) -> Result<UserProfile> {
        let mut profile = UserProfile::from_raw(raw_user)?;
        debug!(username = %profile.username, "completing two-factor login");

        let allowed = self.fetch_allowed_publications(&profile.username).await?;
        profile.permissions = Permissions {
            allowed_publication_ids: allowed.clone(),
        };

        let token = format!("session-{}", Uuid::new_v4());
        {
            let mut state = self.lock();
            state.user = Some(profile.clone());
            state.token = Some(token.clone());
            state.last_activity = Utc::now();
            state.is_locked = false;
            state.allowed_publication_ids = allowed;
        }

        self.snapshots
            .save(&SessionSnapshot {
                token,
                user: profile.clone(),
            })
            .await?;

        info!(username = %profile.username, "login completed");
        Ok(profile)
    }

    /// Fetches the ids of the publications `username` may act on and caches
    /// them on the session.
    ///
    /// An empty or unrecognizable response is not an error: the allowed list
    /// is simply empty. A failed call resets the list to empty before the
    /// error propagates.
    pub async fn fetch_allowed_publications(&self, username: &str) -> Result<Vec<i64>> {
        match self.api.publications_by_author(username).await {
            Ok(publications) => {
                let ids: Vec<i64> = publications.iter().map(|p| p.id).collect();
                if ids.is_empty() {
                    debug!(username, "no publications for user");
                }
                self.lock().allowed_publication_ids = ids.clone();
                Ok(ids)
            }
            Err(err) => {
                warn!(username, error = %err, "failed to fetch allowed publications");
                self.lock().allowed_publication_ids = Vec::new();
                Err(err)
            }
        }
    }

    /// Clears the session and erases the persisted snapshot. Idempotent.
    pub async fn logout(&self) -> Result<()> {
        {
            let mut state = self.lock();
            state.user = None;
            state.token = None;
            state.is_locked = false;
            state.allowed_publication_ids = Vec::new();
            state.last_activity = Utc::now();
        }
        self.snapshots.clear().await?;
        info!("logged out");
        Ok(())
    }

    /// Restores the session from the persisted snapshot, if any.
    ///
    /// The allowed-publications list is re-derived from the permissions
    /// embedded in the stored profile; no network call is made. Corrupt
    /// storage is cleared and left unauthenticated. Never fails.
    pub async fn restore(&self) {
        match self.snapshots.load().await {
            Ok(Some(snapshot)) => {
                let mut state = self.lock();
                state.allowed_publication_ids =
                    snapshot.user.permissions.allowed_publication_ids.clone();
                state.user = Some(snapshot.user);
                state.token = Some(snapshot.token);
                state.last_activity = Utc::now();
                state.is_locked = false;
                info!("session restored from snapshot");
            }
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, "persisted session unreadable; clearing");
                if let Err(err) = self.snapshots.clear().await {
                    warn!(error = %err, "failed to clear corrupt snapshot");
                }
            }
        }
    }

    /// Marks the session as active now and clears any inactivity lock.
    pub fn record_activity(&self) {
        let mut state = self.lock();
        state.last_activity = Utc::now();
        state.is_locked = false;
    }

    /// Locks the session when authenticated and inactive for longer than
    /// the threshold. Does not log the user out.
    pub fn check_inactivity(&self) {
        self.check_inactivity_at(Utc::now());
    }

    /// [`check_inactivity`](Self::check_inactivity) with an injected clock.
    pub fn check_inactivity_at(&self, now: DateTime<Utc>) {
        let mut state = self.lock();
        let inactive = now - state.last_activity;
        if state.is_authenticated() && inactive > Duration::minutes(INACTIVITY_LOCK_MINUTES) {
            state.is_locked = true;
            info!("session locked after inactivity");
        }
    }

    /// Re-validates the current user's password against the credential-check
    /// endpoint and clears the lock on success.
    ///
    /// Returns false (leaving the lock untouched) for a wrong password, a
    /// missing session, or any network failure.
    pub async fn unlock(&self, password: &str) -> bool {
        let email = match self.lock().user.as_ref() {
            Some(user) => user.email.clone(),
            None => return false,
        };

        match self.api.initiate_login(&email, password).await {
            Ok(response) if response.success => {
                self.record_activity();
                info!("session unlocked");
                true
            }
            Ok(_) => {
                debug!("unlock rejected: invalid password");
                false
            }
            Err(err) => {
                warn!(error = %err, "unlock attempt failed");
                false
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated()
    }

    pub fn is_locked(&self) -> bool {
        self.lock().is_locked
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.lock().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    pub fn allowed_publication_ids(&self) -> Vec<i64> {
        self.lock().allowed_publication_ids.clone()
    }

    /// Uppercase initials of the display name, or `""` when unauthenticated.
    pub fn initials(&self) -> String {
        let state = self.lock();
        if !state.is_authenticated() {
            return String::new();
        }
        state
            .user
            .as_ref()
            .map(UserProfile::initials)
            .unwrap_or_default()
    }

    /// Username of the authenticated user, for content-API calls.
    pub fn current_username(&self) -> Result<String> {
        self.lock()
            .user
            .as_ref()
            .map(|user| user.username.clone())
            .ok_or(crate::error::NewsdeskError::NotAuthenticated)
    }

    #[cfg(test)]
    pub(crate) fn set_last_activity(&self, at: DateTime<Utc>) {
        self.lock().last_activity = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        ArticleSubmission, ArticlesPayload, CmsApi, InitiateLogin, RawPublication, VerifyToken,
    };
    use crate::error::NewsdeskError;
    use crate::session::repository::MemorySnapshotRepository;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::json;

    /// CmsApi double for session tests: a fixed publications response and a
    /// single accepted password.
    struct MockApi {
        publications: Result<Vec<RawPublication>>,
        accepted_password: &'static str,
    }

    impl MockApi {
        fn with_publications(ids: &[i64]) -> Self {
            let publications = ids
                .iter()
                .map(|id| RawPublication {
                    id: *id,
                    name: format!("Publication {id}"),
                    slug: format!("pub-{id}"),
                    description: None,
                    categories: Vec::new(),
                })
                .collect();
            Self {
                publications: Ok(publications),
                accepted_password: "hunter2",
            }
        }

        fn failing() -> Self {
            Self {
                publications: Err(NewsdeskError::network("connection refused")),
                accepted_password: "hunter2",
            }
        }
    }

    #[async_trait]
    impl CmsApi for MockApi {
        async fn initiate_login(&self, _email: &str, password: &str) -> Result<InitiateLogin> {
            Ok(InitiateLogin {
                success: password == self.accepted_password,
                user_id: Some(7),
                message: None,
            })
        }

        async fn verify_token(&self, _email: &str, _code: &str) -> Result<VerifyToken> {
            unimplemented!("not used by session tests")
        }

        async fn resend_token(&self, _email: &str) -> Result<bool> {
            unimplemented!("not used by session tests")
        }

        async fn publications_by_author(&self, _username: &str) -> Result<Vec<RawPublication>> {
            self.publications.clone()
        }

        async fn articles_by_author(
            &self,
            _username: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<ArticlesPayload> {
            unimplemented!("not used by session tests")
        }

        async fn save_article(&self, _submission: ArticleSubmission) -> Result<Value> {
            unimplemented!("not used by session tests")
        }
    }

    fn raw_user() -> Value {
        json!({
            "id": 7,
            "username": "jdoe",
            "email": "jdoe@example.com",
            "display_name": "Jane Doe",
        })
    }

    fn store_with(api: MockApi) -> (SessionStore, Arc<MemorySnapshotRepository>) {
        let snapshots = Arc::new(MemorySnapshotRepository::new());
        let store = SessionStore::new(Arc::new(api), snapshots.clone());
        (store, snapshots)
    }

    #[test]
    fn test_is_authenticated_requires_user_and_token() {
        let mut session = Session::new();
        assert!(!session.is_authenticated());

        session.token = Some("session-x".to_string());
        assert!(!session.is_authenticated());

        session.user = Some(UserProfile::from_raw(&raw_user()).unwrap());
        assert!(session.is_authenticated());

        session.token = None;
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_complete_login_commits_session_and_snapshot() {
        let (store, snapshots) = store_with(MockApi::with_publications(&[3, 9]));

        let profile = store.complete_login(&raw_user()).await.unwrap();
        assert_eq!(profile.permissions.allowed_publication_ids, vec![3, 9]);
        assert!(store.is_authenticated());
        assert!(!store.is_locked());
        assert_eq!(store.allowed_publication_ids(), vec![3, 9]);

        let snapshot = snapshots.load().await.unwrap().unwrap();
        assert_eq!(snapshot.user.username, "jdoe");
        assert_eq!(snapshot.user.permissions.allowed_publication_ids, vec![3, 9]);
    }

    #[tokio::test]
    async fn test_complete_login_failure_leaves_no_partial_session() {
        let (store, snapshots) = store_with(MockApi::failing());

        let result = store.complete_login(&raw_user()).await;
        assert!(result.is_err());
        assert!(!store.is_authenticated());
        assert!(store.user().is_none());
        assert!(store.token().is_none());
        assert!(snapshots.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_round_trips_without_network() {
        let (store, snapshots) = store_with(MockApi::with_publications(&[4]));
        store.complete_login(&raw_user()).await.unwrap();

        // Second store sharing the snapshot repo; its API fails, proving the
        // restore path does not fetch.
        let restored = SessionStore::new(Arc::new(MockApi::failing()), snapshots);
        restored.restore().await;

        assert!(restored.is_authenticated());
        let user = restored.user().unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.username, "jdoe");
        assert_eq!(restored.allowed_publication_ids(), vec![4]);
    }

    #[tokio::test]
    async fn test_restore_self_heals_corrupt_snapshot() {
        struct CorruptRepo {
            cleared: Mutex<bool>,
        }

        #[async_trait]
        impl SnapshotRepository for CorruptRepo {
            async fn load(&self) -> Result<Option<SessionSnapshot>> {
                Err(NewsdeskError::persisted_state("not valid JSON"))
            }
            async fn save(&self, _snapshot: &SessionSnapshot) -> Result<()> {
                Ok(())
            }
            async fn clear(&self) -> Result<()> {
                *self.cleared.lock().unwrap() = true;
                Ok(())
            }
        }

        let repo = Arc::new(CorruptRepo {
            cleared: Mutex::new(false),
        });
        let store = SessionStore::new(Arc::new(MockApi::failing()), repo.clone());
        store.restore().await;

        assert!(!store.is_authenticated());
        assert!(*repo.cleared.lock().unwrap());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let (store, snapshots) = store_with(MockApi::with_publications(&[1]));
        store.complete_login(&raw_user()).await.unwrap();

        store.logout().await.unwrap();
        store.logout().await.unwrap();

        assert!(!store.is_authenticated());
        assert!(store.allowed_publication_ids().is_empty());
        assert!(snapshots.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_check_inactivity_locks_only_when_stale_and_authenticated() {
        let (store, _) = store_with(MockApi::with_publications(&[1]));

        // Not authenticated: stale activity must not lock.
        store.set_last_activity(Utc::now() - Duration::minutes(10));
        store.check_inactivity();
        assert!(!store.is_locked());

        store.complete_login(&raw_user()).await.unwrap();

        // Fresh activity: no lock.
        store.check_inactivity();
        assert!(!store.is_locked());

        // Exactly at the threshold: no lock (strictly greater-than).
        let now = Utc::now();
        store.set_last_activity(now - Duration::minutes(INACTIVITY_LOCK_MINUTES));
        store.check_inactivity_at(now);
        assert!(!store.is_locked());

        // Past the threshold: locked.
        store.set_last_activity(now - Duration::minutes(INACTIVITY_LOCK_MINUTES) - Duration::seconds(1));
        store.check_inactivity_at(now);
        assert!(store.is_locked());
    }

    #[tokio::test]
    async fn test_unlock_with_wrong_password_keeps_lock() {
        let (store, _) = store_with(MockApi::with_publications(&[1]));
        store.complete_login(&raw_user()).await.unwrap();
        let now = Utc::now();
        store.set_last_activity(now - Duration::minutes(10));
        store.check_inactivity_at(now);
        assert!(store.is_locked());

        assert!(!store.unlock("wrong").await);
        assert!(store.is_locked());

        assert!(store.unlock("hunter2").await);
        assert!(!store.is_locked());
    }

    #[tokio::test]
    async fn test_unlock_without_session_is_false() {
        let (store, _) = store_with(MockApi::with_publications(&[1]));
        assert!(!store.unlock("hunter2").await);
    }

    #[tokio::test]
    async fn test_initials_empty_when_unauthenticated() {
        let (store, _) = store_with(MockApi::with_publications(&[1]));
        assert_eq!(store.initials(), "");

        store.complete_login(&raw_user()).await.unwrap();
        assert_eq!(store.initials(), "JD");
    }

    #[tokio::test]
    async fn test_fetch_allowed_publications_resets_on_error() {
        let (store, _) = store_with(MockApi::with_publications(&[5]));
        store.fetch_allowed_publications("jdoe").await.unwrap();
        assert_eq!(store.allowed_publication_ids(), vec![5]);

        let failing = SessionStore::new(
            Arc::new(MockApi::failing()),
            Arc::new(MemorySnapshotRepository::new()),
        );
        failing.lock().allowed_publication_ids = vec![5];
        assert!(failing.fetch_allowed_publications("jdoe").await.is_err());
        assert!(failing.allowed_publication_ids().is_empty());
    }
}
