use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sni_client::{
    AuthApi, Badge, LoginPayload, MemoryTokenStore, RawTokens, Session, SniClientError,
    SniClientResult, StoredSession, TokenPair, User,
};

struct FakeApi {
    valid_token: Mutex<String>,
    reissue_succeeds: bool,
    profile_calls: AtomicUsize,
    reissue_calls: AtomicUsize,
}

impl FakeApi {
    fn new(valid_token: &str, reissue_succeeds: bool) -> Arc<Self> {
        Arc::new(Self {
            valid_token: Mutex::new(valid_token.to_string()),
            reissue_succeeds,
            profile_calls: AtomicUsize::new(0),
            reissue_calls: AtomicUsize::new(0),
        })
    }

    fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    fn reissue_calls(&self) -> usize {
        self.reissue_calls.load(Ordering::SeqCst)
    }
}

fn user() -> User {
    serde_json::from_str(r#"{"id":1,"email":"dev@sni.io","nickname":"dev","points":120}"#)
        .expect("user fixture must parse")
}

#[async_trait]
impl AuthApi for FakeApi {
    async fn fetch_profile(&self, access_token: &str) -> SniClientResult<User> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        let valid = self.valid_token.lock().expect("lock").clone();
        if access_token == valid {
            Ok(user())
        } else {
            Err(SniClientError::Unauthorized)
        }
    }

    async fn reissue(&self, refresh_token: &str) -> SniClientResult<TokenPair> {
        self.reissue_calls.fetch_add(1, Ordering::SeqCst);
        if !self.reissue_succeeds || refresh_token != "refresh-1" {
            return Err(SniClientError::Unauthorized);
        }
        *self.valid_token.lock().expect("lock") = "fresh".to_string();
        Ok(TokenPair {
            access_token: "fresh".to_string(),
            refresh_token: "refresh-2".to_string(),
        })
    }

    async fn representative_badge(
        &self,
        _access_token: &str,
        _user_id: i64,
    ) -> SniClientResult<Option<Badge>> {
        Ok(Some(Badge {
            id: 9,
            name: "First Snippet".to_string(),
            description: None,
            image_url: None,
            acquired_at: None,
        }))
    }
}

fn payload(access: Option<&str>, refresh: Option<&str>) -> LoginPayload {
    LoginPayload {
        token: Some(RawTokens {
            access_token: access.map(str::to_string),
            refresh_token: refresh.map(str::to_string),
        }),
        user: None,
    }
}

#[tokio::test]
async fn login_stores_tokens_and_merges_representative_badge() {
    let api = FakeApi::new("good", true);
    let store = Arc::new(MemoryTokenStore::new());
    let session = Session::new(api.clone(), store.clone());

    let user = session
        .login(payload(Some("good"), Some("refresh-1")))
        .await
        .expect("login must succeed");

    assert_eq!(user.nickname, "dev");
    assert_eq!(
        user.representative_badge.as_ref().map(|badge| badge.id),
        Some(9)
    );
    assert_eq!(session.access_token().as_deref(), Some("good"));

    let stored = store.snapshot().expect("session must be stored");
    assert_eq!(stored.access_token, "good");
    assert_eq!(stored.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(stored.user.map(|user| user.id), Some(1));
}

#[tokio::test]
async fn concurrent_fetches_share_one_request() {
    let api = FakeApi::new("good", true);
    let session = Session::new(api.clone(), Arc::new(MemoryTokenStore::new()));

    let (first, second) = tokio::join!(session.fetch_user("good"), session.fetch_user("good"));

    assert_eq!(first.expect("first must succeed").id, 1);
    assert_eq!(second.expect("second must succeed").id, 1);
    assert_eq!(api.profile_calls(), 1);
}

#[tokio::test]
async fn sequential_fetches_issue_separate_requests() {
    let api = FakeApi::new("good", true);
    let session = Session::new(api.clone(), Arc::new(MemoryTokenStore::new()));

    session.fetch_user("good").await.expect("first must succeed");
    session.fetch_user("good").await.expect("second must succeed");

    assert_eq!(api.profile_calls(), 2);
}

#[tokio::test]
async fn expired_token_is_reissued_once_and_retried_once() {
    let api = FakeApi::new("fresh", true);
    let store = Arc::new(MemoryTokenStore::new());
    let session = Session::new(api.clone(), store.clone());

    let user = session
        .login(payload(Some("stale"), Some("refresh-1")))
        .await
        .expect("login must succeed after reissue");

    assert_eq!(user.id, 1);
    assert_eq!(api.reissue_calls(), 1);
    assert_eq!(api.profile_calls(), 2);
    assert_eq!(session.access_token().as_deref(), Some("fresh"));
    assert_eq!(session.refresh_token().as_deref(), Some("refresh-2"));
    let stored = store.snapshot().expect("session must be stored");
    assert_eq!(stored.access_token, "fresh");
}

#[tokio::test]
async fn failed_reissue_logs_out() {
    let api = FakeApi::new("fresh", false);
    let store = Arc::new(MemoryTokenStore::new());
    let session = Session::new(api.clone(), store.clone());

    let err = session
        .login(payload(Some("stale"), Some("refresh-1")))
        .await
        .expect_err("login must fail");

    assert!(err.is_unauthorized());
    assert_eq!(api.reissue_calls(), 1);
    assert_eq!(api.profile_calls(), 1);
    assert!(!session.is_authenticated());
    assert!(session.current_user().is_none());
    assert!(session.refresh_token().is_none());
    assert!(store.snapshot().is_none());
    assert!(session.auth_headers().is_empty());
}

#[tokio::test]
async fn malformed_login_payload_leaves_state_untouched() {
    let api = FakeApi::new("good", true);
    let previous = StoredSession {
        access_token: "old".to_string(),
        refresh_token: Some("old-refresh".to_string()),
        user: None,
    };
    let store = Arc::new(MemoryTokenStore::with_session(previous.clone()));
    let session = Session::new(api.clone(), store.clone());

    let missing_block: LoginPayload =
        serde_json::from_str(r#"{"user":null}"#).expect("payload must parse");
    let err = session.login(missing_block).await.expect_err("must fail");
    assert!(matches!(err, SniClientError::InvalidRequest(_)));

    let err = session
        .login(payload(Some("   "), Some("refresh-1")))
        .await
        .expect_err("must fail");
    assert!(matches!(err, SniClientError::InvalidRequest(_)));

    assert_eq!(store.snapshot(), Some(previous));
    assert!(!session.is_authenticated());
    assert_eq!(api.profile_calls(), 0);
}

#[tokio::test]
async fn stored_session_is_restored_by_a_new_context() {
    let api = FakeApi::new("good", true);
    let store = Arc::new(MemoryTokenStore::new());

    let first = Session::new(api.clone(), store.clone());
    first
        .login(payload(Some("good"), Some("refresh-1")))
        .await
        .expect("login must succeed");

    let reloaded = Session::new(api.clone(), store.clone());
    assert!(!reloaded.is_authenticated());
    let user = reloaded
        .restore()
        .await
        .expect("restore must succeed")
        .expect("a session must be restored");

    assert_eq!(user.id, 1);
    assert!(reloaded.is_authenticated());
    assert_eq!(reloaded.access_token().as_deref(), Some("good"));
}

#[tokio::test]
async fn restore_without_stored_session_is_noop() {
    let api = FakeApi::new("good", true);
    let session = Session::new(api.clone(), Arc::new(MemoryTokenStore::new()));

    let restored = session.restore().await.expect("restore must succeed");
    assert!(restored.is_none());
    assert_eq!(api.profile_calls(), 0);
}

#[tokio::test]
async fn logout_clears_memory_and_store() {
    let api = FakeApi::new("good", true);
    let store = Arc::new(MemoryTokenStore::new());
    let session = Session::new(api, store.clone());
    session
        .login(payload(Some("good"), Some("refresh-1")))
        .await
        .expect("login must succeed");

    session.logout();

    assert!(!session.is_authenticated());
    assert!(session.current_user().is_none());
    assert!(store.snapshot().is_none());
}

fn stored(access: &str) -> StoredSession {
    StoredSession {
        access_token: access.to_string(),
        refresh_token: Some("refresh-1".to_string()),
        user: None,
    }
}

#[tokio::test]
async fn logout_during_profile_load_discards_loaded_user() {
    let api = FakeApi::new("good", true);
    let store = Arc::new(MemoryTokenStore::with_session(stored("good")));
    let session = Session::new(api.clone(), store.clone());

    let restoring = {
        let session = session.clone();
        tokio::spawn(async move { session.restore().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    session.logout();

    let result = restoring.await.expect("restore task must not panic");
    assert!(result.is_err());
    assert!(!session.is_authenticated());
    assert!(session.current_user().is_none());
    assert!(store.snapshot().is_none());
}

#[tokio::test]
async fn login_after_logout_starts_a_fresh_profile_load() {
    let api = FakeApi::new("good", true);
    let store = Arc::new(MemoryTokenStore::with_session(stored("good")));
    let session = Session::new(api.clone(), store.clone());

    let restoring = {
        let session = session.clone();
        tokio::spawn(async move { session.restore().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    session.logout();

    let user = session
        .login(payload(Some("good"), Some("refresh-1")))
        .await
        .expect("login must succeed");
    assert_eq!(user.id, 1);
    assert_eq!(api.profile_calls(), 2);

    let restored = restoring.await.expect("restore task must not panic");
    assert!(restored.is_err());
    assert!(session.is_authenticated());
    assert_eq!(session.current_user().map(|user| user.id), Some(1));
    assert!(store.snapshot().is_some());
}

struct ForbiddenApi {
    reissue_calls: AtomicUsize,
}

#[async_trait]
impl AuthApi for ForbiddenApi {
    async fn fetch_profile(&self, _access_token: &str) -> SniClientResult<User> {
        Err(SniClientError::Forbidden("account is suspended".to_string()))
    }

    async fn reissue(&self, _refresh_token: &str) -> SniClientResult<TokenPair> {
        self.reissue_calls.fetch_add(1, Ordering::SeqCst);
        Err(SniClientError::Unauthorized)
    }

    async fn representative_badge(
        &self,
        _access_token: &str,
        _user_id: i64,
    ) -> SniClientResult<Option<Badge>> {
        Ok(None)
    }
}

#[tokio::test]
async fn forbidden_profile_is_not_reissued() {
    let api = Arc::new(ForbiddenApi {
        reissue_calls: AtomicUsize::new(0),
    });
    let store = Arc::new(MemoryTokenStore::with_session(stored("good")));
    let session = Session::new(api.clone(), store);

    let err = session.restore().await.expect_err("restore must fail");

    assert!(matches!(err, SniClientError::Forbidden(_)));
    assert_eq!(api.reissue_calls.load(Ordering::SeqCst), 0);
}
