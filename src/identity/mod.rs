//! Identity and session management for the ranking client.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod provider;
mod session;
mod authorizer;
mod memory;

pub use principal::{AuthIdentity, Credentials, ProviderIdentity};
pub use provider::{IdentityProvider, Persistence, ProviderError};
pub use session::AuthSession;
pub use authorizer::{check_operation_allowed, roles_for_identity, Operation, Role};
pub use memory::MemoryIdentityProvider;
