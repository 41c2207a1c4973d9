use async_trait::async_trait;
use thiserror::Error;

use super::principal::ProviderIdentity;

/// How long a provider keeps a signed-in identity around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// Survives restarts of the host process.
    Local,
    /// Lives only as long as the current process/browsing session.
    Session,
    /// Never persisted; cleared on reload.
    None,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("invalid_credentials")]
    InvalidCredentials,
    #[error("operation not allowed: {0}")]
    OperationNotAllowed(String),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
    #[error("identity provider error: {0}")]
    Internal(String),
}

/// Remote identity provider the session signs in against.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn set_persistence(&self, persistence: Persistence) -> Result<(), ProviderError>;
    async fn sign_in_with_password(&self, email_address: &str, password: &str) -> Result<ProviderIdentity, ProviderError>;
    async fn sign_in_anonymously(&self) -> Result<ProviderIdentity, ProviderError>;
    async fn sign_out(&self) -> Result<(), ProviderError>;
    /// Identity the provider currently holds, if any.
    fn current_identity(&self) -> Option<ProviderIdentity>;
}
