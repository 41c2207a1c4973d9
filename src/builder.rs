//! `RankingBuilder`: the one-stop client over a keyed store and an identity provider.

use std::sync::Arc;

use crate::config::RankingConfig;
use crate::error::RankingResult;
use crate::identity::{AuthIdentity, AuthSession, Credentials, IdentityProvider};
use crate::logger::{Area, Logger};
use crate::ranking::{LiveRankingQuery, RankingSubscription, RankingView, SortSpec};
use crate::record::{NewRecord, Record};
use crate::records::RecordStore;
use crate::storage::KeyedStore;

pub struct RankingBuilder {
    config: RankingConfig,
    session: Arc<AuthSession>,
    records: RecordStore,
    ranking: LiveRankingQuery,
}

impl RankingBuilder {
    /// Validate `config`, wire the components together and, if credentials are
    /// configured, sign in with them. A failed sign-in is logged, not returned;
    /// check `session().is_authenticated()` when it matters.
    pub async fn connect(
        config: RankingConfig,
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn KeyedStore>,
    ) -> RankingResult<Self> {
        config.validate()?;
        let logger = Logger::new(config.disable_log);
        let session = Arc::new(AuthSession::new(provider, logger));
        let records = RecordStore::new(store.clone(), session.clone(), config.collection.clone())
            .with_lazy_sign_in(config.lazy_sign_in);
        let ranking = LiveRankingQuery::new(store, session.clone(), config.collection.clone())
            .with_lazy_sign_in(config.lazy_sign_in);
        if let Some(creds) = config.credentials.as_ref() {
            session.sign_in(Some(creds)).await;
        }
        logger.debug(Area::Store, &format!("connected to collection '{}'.", config.collection));
        Ok(Self { config, session, records, ranking })
    }

    pub fn config(&self) -> &RankingConfig { &self.config }

    pub fn session(&self) -> &Arc<AuthSession> { &self.session }

    pub fn records(&self) -> &RecordStore { &self.records }

    pub fn ranking(&self) -> &LiveRankingQuery { &self.ranking }

    pub async fn sign_in(&self, credentials: Option<&Credentials>) -> AuthIdentity {
        self.session.sign_in(credentials).await
    }

    pub async fn sign_out(&self) -> bool { self.session.sign_out().await }

    pub async fn create_user(&self, fields: NewRecord) -> RankingResult<()> {
        self.records.create(fields).await
    }

    pub async fn update_user(&self, id: &str, record: &Record) -> RankingResult<()> {
        self.records.update(id, record).await
    }

    pub async fn delete_user(&self, id: &str) -> RankingResult<()> {
        self.records.delete(id).await
    }

    pub async fn get_user(&self, id: &str) -> RankingResult<Record> {
        self.records.get_by_id(id).await
    }

    /// Live top-N by score, highest first, with `default_top_n` entries.
    pub async fn list_data<F>(&self, on_update: F) -> RankingResult<RankingSubscription>
    where
        F: FnMut(RankingView) + Send + 'static,
    {
        self.ranking.subscribe(SortSpec::default(), self.config.default_top_n, on_update).await
    }

    pub async fn subscribe<F>(&self, spec: SortSpec, top_n: usize, on_update: F) -> RankingResult<RankingSubscription>
    where
        F: FnMut(RankingView) + Send + 'static,
    {
        self.ranking.subscribe(spec, top_n, on_update).await
    }

    pub async fn fetch_top(&self, spec: SortSpec, top_n: usize) -> RankingResult<RankingView> {
        self.ranking.fetch_once(spec, top_n).await
    }
}
