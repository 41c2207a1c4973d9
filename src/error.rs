//! Unified error model for the ranking client.
//! Every public operation classifies its failures into `RankingError` so callers
//! never see a raw transport error from the identity provider or the keyed store.

use thiserror::Error;

use crate::storage::StoreError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RankingError {
    /// No identity is present where one is required.
    #[error("please, authenticate user.")]
    NotAuthenticated,
    /// An identity is present but may not write (anonymous session).
    #[error("user does not have permission to update data.")]
    NotAuthorized,
    #[error("please, insert a correct userId: '{0}'")]
    InvalidIdentifier(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// The remote write failed and the session no longer authorizes writes.
    #[error("write rejected for '{0}': session is no longer authorized")]
    WriteRejected(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("configuration error: {0}")]
    Config(String),
}

impl RankingError {
    pub fn code_str(&self) -> &'static str {
        match self {
            RankingError::NotAuthenticated => "not_authenticated",
            RankingError::NotAuthorized => "not_authorized",
            RankingError::InvalidIdentifier(_) => "invalid_identifier",
            RankingError::NotFound(_) => "not_found",
            RankingError::WriteRejected(_) => "write_rejected",
            RankingError::Store(_) => "store_error",
            RankingError::Config(_) => "config_error",
        }
    }

    /// True for the failures produced by the auth gate (before or after the remote call).
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            RankingError::NotAuthenticated | RankingError::NotAuthorized | RankingError::WriteRejected(_)
        )
    }
}

pub type RankingResult<T> = Result<T, RankingError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
