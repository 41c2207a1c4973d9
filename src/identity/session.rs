use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{RankingError, RankingResult};
use crate::logger::{messages, Area, Logger};

use super::authorizer::{check_operation_allowed, Operation};
use super::principal::{AuthIdentity, Credentials};
use super::provider::{IdentityProvider, Persistence};

/// Current sign-in state of the client against its identity provider.
///
/// The state object is owned by whoever constructs it (no process-wide singleton);
/// pass an `Arc<AuthSession>` to the record store and ranking query that share it.
/// Sign-in and sign-out never return errors: failures are logged and reflected in
/// the resulting `AuthIdentity`.
pub struct AuthSession {
    provider: Arc<dyn IdentityProvider>,
    state: RwLock<AuthIdentity>,
    logger: Logger,
}

impl AuthSession {
    pub fn new(provider: Arc<dyn IdentityProvider>, logger: Logger) -> Self {
        Self { provider, state: RwLock::new(AuthIdentity::Unauthenticated), logger }
    }

    /// Sign in with credentials, or anonymously when `credentials` is `None`.
    ///
    /// A confirmed named session is kept as is. An anonymous session is kept when no
    /// credentials are given and upgraded otherwise. Persistence is switched to
    /// session scope before the attempt. Any failure leaves the session
    /// `Unauthenticated`.
    pub async fn sign_in(&self, credentials: Option<&Credentials>) -> AuthIdentity {
        let current = self.identity();
        match (&current, credentials) {
            (AuthIdentity::NamedSession { .. }, _) => {
                self.logger.debug(Area::Auth, messages::USER_IS_AUTH);
                return current;
            }
            (AuthIdentity::AnonymousSession { .. }, None) => {
                self.logger.debug(Area::Auth, messages::USER_IS_ANONYMOUS);
                return current;
            }
            _ => {}
        }

        if let Err(e) = self.provider.set_persistence(Persistence::Session).await {
            *self.state.write() = AuthIdentity::Unauthenticated;
            self.logger.warn(Area::Auth, messages::USER_IS_NOT_AUTH, &e);
            return AuthIdentity::Unauthenticated;
        }

        let attempt = match credentials {
            Some(c) => self.provider.sign_in_with_password(&c.email_address, &c.password).await,
            None => self.provider.sign_in_anonymously().await,
        };
        match attempt {
            Ok(pid) => {
                let next = AuthIdentity::from(pid);
                *self.state.write() = next.clone();
                let msg = if next.is_named() { messages::USER_IS_AUTH } else { messages::USER_IS_ANONYMOUS };
                self.logger.info(Area::Auth, msg);
                next
            }
            Err(e) => {
                *self.state.write() = AuthIdentity::Unauthenticated;
                self.logger.warn(Area::Auth, messages::USER_IS_NOT_AUTH, &e);
                AuthIdentity::Unauthenticated
            }
        }
    }

    /// Sign out. On provider failure the previous identity stays in place and false is returned.
    pub async fn sign_out(&self) -> bool {
        match self.provider.sign_out().await {
            Ok(()) => {
                *self.state.write() = AuthIdentity::Unauthenticated;
                self.logger.info(Area::Auth, messages::USER_SIGNED_OUT);
                true
            }
            Err(e) => {
                self.logger.warn(Area::Auth, messages::USER_IS_NOT_AUTH_FAIL, &e);
                false
            }
        }
    }

    /// Sign in anonymously if no identity is present. Returns whether one is present afterwards.
    pub async fn ensure_identity(&self) -> bool {
        if self.is_authenticated() {
            return true;
        }
        self.sign_in(None).await;
        self.is_authenticated()
    }

    /// Gate for reads: some identity must be present. With `lazy_sign_in` a caller
    /// without one is signed in anonymously first (one attempt).
    pub async fn require_reader(&self, lazy_sign_in: bool) -> RankingResult<()> {
        if self.is_authenticated() || (lazy_sign_in && self.ensure_identity().await) {
            return check_operation_allowed(&self.identity(), Operation::Read);
        }
        self.logger.info(Area::Auth, messages::PLEASE_AUTH_USER);
        Err(RankingError::NotAuthenticated)
    }

    /// Gate for writes: only a confirmed named session passes.
    pub fn require_writer(&self, op: Operation) -> RankingResult<()> {
        check_operation_allowed(&self.identity(), op).map_err(|e| {
            let msg = match e {
                RankingError::NotAuthorized => messages::USER_DOES_NOT_HAVE_PERMISSION,
                _ => messages::PLEASE_AUTH_USER,
            };
            self.logger.info(Area::Auth, msg);
            e
        })
    }

    /// Current identity. A session the provider no longer holds reads as `Unauthenticated`.
    pub fn identity(&self) -> AuthIdentity {
        let local = self.state.read().clone();
        let Some(uid) = local.uid().map(str::to_string) else { return AuthIdentity::Unauthenticated; };
        match self.provider.current_identity() {
            Some(p) if p.uid == uid => local,
            _ => AuthIdentity::Unauthenticated,
        }
    }

    /// Some identity (named or anonymous) is present.
    pub fn is_authenticated(&self) -> bool {
        !matches!(self.identity(), AuthIdentity::Unauthenticated)
    }

    /// False only for a confirmed named session; no identity counts as anonymous.
    pub fn is_anonymous(&self) -> bool {
        !self.identity().is_named()
    }

    pub fn is_authorized_writer(&self) -> bool {
        self.identity().is_named()
    }

    pub fn logger(&self) -> Logger { self.logger }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
