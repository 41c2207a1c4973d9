use super::*;
use crate::identity::{Credentials, MemoryIdentityProvider};
use crate::record::RecordTime;
use crate::storage::MemoryStore;
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;

struct Fixture {
    provider: Arc<MemoryIdentityProvider>,
    store: MemoryStore,
    session: Arc<AuthSession>,
}

fn fixture() -> Fixture {
    let provider = Arc::new(MemoryIdentityProvider::new());
    let session = Arc::new(AuthSession::new(provider.clone(), Logger::disabled()));
    Fixture { provider, store: MemoryStore::new(), session }
}

impl Fixture {
    fn query(&self) -> LiveRankingQuery {
        LiveRankingQuery::new(Arc::new(self.store.clone()), self.session.clone(), "users")
    }

    async fn seed(&self, id: &str, score: i64) {
        let v = json!({"id": id, "name": format!("n-{}", id), "score": score, "time": "00:05:00", "createDate": 1});
        self.store.write(&format!("users/{}", id), v).await.unwrap();
    }
}

fn scores(view: &RankingView) -> Vec<f64> { view.entries.iter().map(|r| r.score).collect() }

#[test]
fn descending_uses_tail_and_ascending_uses_head() {
    let f = fixture();
    let q = f.query();
    assert_eq!(q.query_for(SortSpec::default(), 3), PathQuery::new("users", "score", Limit::Last(3)));
    assert_eq!(
        q.query_for(SortSpec::new(SortField::CreateDate, Direction::Ascending), 5),
        PathQuery::new("users", "createDate", Limit::First(5))
    );
}

#[tokio::test]
async fn fetch_once_sorts_window_descending() {
    let f = fixture();
    f.seed("a", 10).await;
    f.seed("b", 50).await;
    f.seed("c", 30).await;
    let view = f.query().fetch_once(SortSpec::default(), 3).await.unwrap();
    assert_eq!(view.total, 3);
    assert_eq!(scores(&view), vec![50.0, 30.0, 10.0]);
    assert_eq!(f.store.listener_count(), 0);
}

#[tokio::test]
async fn fetch_once_limits_to_top_n() {
    let f = fixture();
    for (i, s) in [5, 80, 15, 60, 40].iter().enumerate() {
        f.seed(&format!("r{}", i), *s).await;
    }
    let top = f.query().fetch_once(SortSpec::default(), 2).await.unwrap();
    assert_eq!(scores(&top), vec![80.0, 60.0]);
    let bottom = f.query().fetch_once(SortSpec::new(SortField::Score, Direction::Ascending), 2).await.unwrap();
    assert_eq!(scores(&bottom), vec![5.0, 15.0]);
    assert_eq!(bottom.total, 2);
}

#[tokio::test]
async fn empty_collection_yields_empty_view() {
    let f = fixture();
    let view = f.query().fetch_once(SortSpec::default(), 10).await.unwrap();
    assert_eq!(view, RankingView { total: 0, entries: vec![] });
}

#[tokio::test]
async fn malformed_children_are_skipped() {
    let f = fixture();
    f.seed("a", 10).await;
    f.store.write("users/junk", json!({"score": 99})).await.unwrap();
    let view = f.query().fetch_once(SortSpec::default(), 10).await.unwrap();
    assert_eq!(view.total, 1);
    assert_eq!(view.entries[0].time, RecordTime::Label("00:05:00".into()));
}

#[tokio::test]
async fn implicit_anonymous_sign_in_happens_once() {
    let f = fixture();
    let q = f.query();
    q.fetch_once(SortSpec::default(), 3).await.unwrap();
    q.fetch_once(SortSpec::default(), 3).await.unwrap();
    assert_eq!(f.provider.anonymous_sign_ins(), 1);
    assert!(f.session.is_authenticated());
}

#[tokio::test]
async fn strict_mode_refuses_without_identity() {
    let f = fixture();
    let q = f.query().with_lazy_sign_in(false);
    assert_eq!(q.fetch_once(SortSpec::default(), 3).await, Err(RankingError::NotAuthenticated));
    assert_eq!(f.provider.anonymous_sign_ins(), 0);
}

#[tokio::test]
async fn named_session_needs_no_implicit_sign_in() {
    let f = fixture();
    f.provider.register_account("test@test.com", "123456").unwrap();
    f.session.sign_in(Some(&Credentials::new("test@test.com", "123456"))).await;
    f.query().fetch_once(SortSpec::default(), 3).await.unwrap();
    assert_eq!(f.provider.anonymous_sign_ins(), 0);
}

#[tokio::test]
async fn offline_store_reports_store_error() {
    let f = fixture();
    f.session.sign_in(None).await;
    f.store.set_offline(true);
    let res = f.query().fetch_once(SortSpec::default(), 3).await;
    assert!(matches!(res, Err(RankingError::Store(StoreError::Unavailable(_)))));
}

#[tokio::test]
async fn subscription_pushes_resorted_views() {
    let f = fixture();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let sub = f.query().subscribe(SortSpec::default(), 2, move |view| { let _ = tx.send(view); }).await.unwrap();

    let first = rx.recv().await.unwrap();
    assert_eq!(first, RankingView::empty());

    f.seed("a", 10).await;
    assert_eq!(scores(&rx.recv().await.unwrap()), vec![10.0]);
    f.seed("b", 50).await;
    assert_eq!(scores(&rx.recv().await.unwrap()), vec![50.0, 10.0]);
    f.seed("c", 30).await;
    let view = rx.recv().await.unwrap();
    assert_eq!(scores(&view), vec![50.0, 30.0]);
    assert_eq!(view.total, 2);

    // score change re-sorts
    f.seed("a", 99).await;
    assert_eq!(scores(&rx.recv().await.unwrap()), vec![99.0, 50.0]);
    sub.unsubscribe();
}

#[tokio::test]
async fn no_updates_after_unsubscribe() {
    let f = fixture();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let sub = f.query().subscribe(SortSpec::default(), 5, move |view| { let _ = tx.send(view); }).await.unwrap();
    let _ = rx.recv().await.unwrap();

    sub.unsubscribe();
    assert!(!sub.is_active());
    assert_eq!(f.store.listener_count(), 0);

    f.seed("late", 1).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    // pump is gone: the sender was dropped with it and nothing else arrives
    assert_eq!(rx.recv().await, None);
}

#[tokio::test]
async fn dropping_handle_unsubscribes() {
    let f = fixture();
    let sub = f.query().subscribe(SortSpec::default(), 5, |_| {}).await.unwrap();
    assert_eq!(f.store.listener_count(), 1);
    drop(sub);
    assert_eq!(f.store.listener_count(), 0);
}

#[tokio::test]
async fn store_cancellation_ends_delivery() {
    let f = fixture();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _sub = f.query().subscribe(SortSpec::default(), 5, move |view| { let _ = tx.send(view); }).await.unwrap();
    let _ = rx.recv().await.unwrap();
    f.store.cancel_listeners(StoreError::PermissionDenied("users".into()));
    assert_eq!(rx.recv().await, None);
}
