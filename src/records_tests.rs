use super::*;
use crate::identity::{Credentials, MemoryIdentityProvider};
use crate::record::RecordTime;
use crate::storage::{MemoryStore, PathQuery, StoreSubscription};
use async_trait::async_trait;
use serde_json::Value;

struct Fixture {
    provider: Arc<MemoryIdentityProvider>,
    store: MemoryStore,
    session: Arc<AuthSession>,
    records: RecordStore,
}

fn fixture() -> Fixture {
    let provider = Arc::new(MemoryIdentityProvider::new());
    provider.register_account("test@test.com", "123456").unwrap();
    let session = Arc::new(AuthSession::new(provider.clone(), Logger::disabled()));
    let store = MemoryStore::new();
    let records = RecordStore::new(Arc::new(store.clone()), session.clone(), "users");
    Fixture { provider, store, session, records }
}

impl Fixture {
    async fn sign_in_named(&self) {
        let id = self.session.sign_in(Some(&Credentials::new("test@test.com", "123456"))).await;
        assert!(id.is_named());
    }

    async fn only_id(&self) -> String {
        let users = self.store.read_once("users").await.unwrap().unwrap();
        let ids: Vec<String> = users.as_object().unwrap().keys().cloned().collect();
        assert_eq!(ids.len(), 1);
        ids[0].clone()
    }

    async fn seeded(&self) -> Record {
        self.sign_in_named().await;
        self.records.create(ann()).await.unwrap();
        let id = self.only_id().await;
        self.records.get_by_id(&id).await.unwrap()
    }
}

fn ann() -> NewRecord { NewRecord::new("Ann", 42.0, "00:05:00") }

/// Keyed store whose writes drop the provider session and then fail,
/// as when a token expires while the request is in flight.
struct RevokingStore {
    inner: MemoryStore,
    provider: Arc<MemoryIdentityProvider>,
}

#[async_trait]
impl KeyedStore for RevokingStore {
    async fn write(&self, path: &str, _value: Value) -> Result<(), StoreError> {
        self.provider.revoke_session();
        Err(StoreError::PermissionDenied(path.to_string()))
    }
    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        self.provider.revoke_session();
        Err(StoreError::PermissionDenied(path.to_string()))
    }
    async fn read_once(&self, path: &str) -> Result<Option<Value>, StoreError> { self.inner.read_once(path).await }
    fn subscribe(&self, query: PathQuery) -> Result<StoreSubscription, StoreError> { self.inner.subscribe(query) }
}

#[tokio::test]
async fn create_without_identity_writes_nothing() {
    let f = fixture();
    assert_eq!(f.records.create(ann()).await, Err(RankingError::NotAuthenticated));
    assert_eq!(f.store.child_count("users"), 0);
}

#[tokio::test]
async fn create_as_anonymous_writes_nothing() {
    let f = fixture();
    f.session.sign_in(None).await;
    assert_eq!(f.records.create(ann()).await, Err(RankingError::NotAuthorized));
    assert_eq!(f.store.child_count("users"), 0);
}

#[tokio::test]
async fn create_stamps_id_and_create_date() {
    let f = fixture();
    f.sign_in_named().await;
    let before = Utc::now().timestamp_millis();
    f.records.create(ann()).await.unwrap();
    let after = Utc::now().timestamp_millis();

    let id = f.only_id().await;
    assert!(is_valid_record_id(&id));
    let r = f.records.get_by_id(&id).await.unwrap();
    assert_eq!(r.id, id);
    assert_eq!(r.name, "Ann");
    assert_eq!(r.score, 42.0);
    assert_eq!(r.time, RecordTime::Label("00:05:00".into()));
    assert!(r.create_date >= before && r.create_date <= after);
}

#[tokio::test]
async fn store_failure_with_live_session_is_store_error() {
    let f = fixture();
    f.sign_in_named().await;
    f.store.set_deny_writes(true);
    let err = f.records.create(ann()).await.unwrap_err();
    assert!(matches!(err, RankingError::Store(StoreError::PermissionDenied(ref p)) if p.starts_with("users/")));
    assert_eq!(f.store.child_count("users"), 0);
}

#[tokio::test]
async fn failure_after_session_drop_is_write_rejected() {
    let f = fixture();
    f.sign_in_named().await;
    let store = RevokingStore { inner: f.store.clone(), provider: f.provider.clone() };
    let records = RecordStore::new(Arc::new(store), f.session.clone(), "users");
    let err = records.create(ann()).await.unwrap_err();
    assert!(matches!(err, RankingError::WriteRejected(ref p) if p.starts_with("users/")));
    assert_eq!(f.store.child_count("users"), 0);
}

#[tokio::test]
async fn non_finite_score_is_refused_locally() {
    let f = fixture();
    f.sign_in_named().await;
    let err = f.records.create(NewRecord::new("NaN", f64::NAN, 10u64)).await.unwrap_err();
    assert!(matches!(err, RankingError::Store(StoreError::Serialization(_))));
    assert_eq!(f.store.child_count("users"), 0);
}

#[tokio::test]
async fn update_replaces_whole_record_and_pins_id() {
    let f = fixture();
    let original = f.seeded().await;
    let mut changed = original.clone();
    changed.name = "Bob".into();
    changed.score = 7.0;
    changed.time = RecordTime::Seconds(61);
    changed.id = "ignored".into();
    f.records.update(&original.id, &changed).await.unwrap();

    let stored = f.records.get_by_id(&original.id).await.unwrap();
    assert_eq!(stored.id, original.id);
    assert_eq!(stored.name, "Bob");
    assert_eq!(stored.score, 7.0);
    assert_eq!(stored.time.display(), "00:01:01");
    assert_eq!(stored.create_date, original.create_date);
}

#[tokio::test]
async fn update_by_anonymous_leaves_record_untouched() {
    let f = fixture();
    let original = f.seeded().await;
    let path = format!("users/{}", original.id);
    let before = f.store.read_once(&path).await.unwrap();

    assert!(f.session.sign_out().await);
    f.session.sign_in(None).await;
    let mut changed = original.clone();
    changed.score = 0.0;
    assert_eq!(f.records.update(&original.id, &changed).await, Err(RankingError::NotAuthorized));
    assert_eq!(f.store.read_once(&path).await.unwrap(), before);
}

#[tokio::test]
async fn auth_is_reported_before_id_format() {
    let f = fixture();
    let r = Record { id: "x".into(), name: "x".into(), score: 1.0, time: RecordTime::Seconds(1), create_date: 0 };
    assert_eq!(f.records.update("bad-id", &r).await, Err(RankingError::NotAuthenticated));
    assert_eq!(f.records.delete("bad-id").await, Err(RankingError::NotAuthenticated));
    f.sign_in_named().await;
    assert_eq!(f.records.update("bad-id", &r).await, Err(RankingError::InvalidIdentifier("bad-id".into())));
    assert_eq!(f.records.delete("bad-id").await, Err(RankingError::InvalidIdentifier("bad-id".into())));
    assert_eq!(f.store.child_count("users"), 0);
}

#[tokio::test]
async fn delete_is_idempotent() {
    let f = fixture();
    f.sign_in_named().await;
    let id = new_record_id();
    assert_eq!(f.records.delete(&id).await, Ok(()));
    assert_eq!(f.records.get_by_id(&id).await, Err(RankingError::NotFound(format!("users/{}", id))));
}

#[tokio::test]
async fn delete_removes_record() {
    let f = fixture();
    let r = f.seeded().await;
    f.records.delete(&r.id).await.unwrap();
    assert!(matches!(f.records.get_by_id(&r.id).await, Err(RankingError::NotFound(_))));
    assert_eq!(f.store.child_count("users"), 0);
}

#[tokio::test]
async fn get_rejects_bad_id_without_signing_in() {
    let f = fixture();
    assert_eq!(f.records.get_by_id("nope").await, Err(RankingError::InvalidIdentifier("nope".into())));
    assert_eq!(f.provider.anonymous_sign_ins(), 0);
}

#[tokio::test]
async fn get_signs_in_anonymously_when_needed() {
    let f = fixture();
    let id = new_record_id();
    assert!(matches!(f.records.get_by_id(&id).await, Err(RankingError::NotFound(_))));
    assert!(matches!(f.records.get_by_id(&id).await, Err(RankingError::NotFound(_))));
    assert_eq!(f.provider.anonymous_sign_ins(), 1);
    assert!(f.session.is_anonymous());
}

#[tokio::test]
async fn strict_get_requires_identity() {
    let provider = Arc::new(MemoryIdentityProvider::new());
    let session = Arc::new(AuthSession::new(provider.clone(), Logger::disabled()));
    let records = RecordStore::new(Arc::new(MemoryStore::new()), session, "users").with_lazy_sign_in(false);
    assert_eq!(records.get_by_id(&new_record_id()).await, Err(RankingError::NotAuthenticated));
    assert_eq!(provider.anonymous_sign_ins(), 0);
}

#[tokio::test]
async fn unreadable_or_malformed_reads_as_not_found() {
    let f = fixture();
    let r = f.seeded().await;
    f.store.set_offline(true);
    assert!(matches!(f.records.get_by_id(&r.id).await, Err(RankingError::NotFound(_))));
    f.store.set_offline(false);

    let other = new_record_id();
    f.store.write(&format!("users/{}", other), serde_json::json!({"name": 3})).await.unwrap();
    assert!(matches!(f.records.get_by_id(&other).await, Err(RankingError::NotFound(_))));
}
