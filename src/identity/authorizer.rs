use crate::error::RankingError;

use super::principal::AuthIdentity;

/// Operations the client gates on the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Reader,
    Writer,
}

/// Named sessions read and write; anonymous sessions only read; no identity gets nothing.
pub fn roles_for_identity(identity: &AuthIdentity) -> Vec<Role> {
    match identity {
        AuthIdentity::Unauthenticated => Vec::new(),
        AuthIdentity::AnonymousSession { .. } => vec![Role::Reader],
        AuthIdentity::NamedSession { .. } => vec![Role::Reader, Role::Writer],
    }
}

fn required_role_for(op: Operation) -> Role {
    match op {
        Operation::Read => Role::Reader,
        Operation::Create | Operation::Update | Operation::Delete => Role::Writer,
    }
}

/// Check whether `identity` may perform `op`.
/// No identity yields `NotAuthenticated`; an identity lacking the role yields `NotAuthorized`.
pub fn check_operation_allowed(identity: &AuthIdentity, op: Operation) -> Result<(), RankingError> {
    let roles = roles_for_identity(identity);
    if roles.is_empty() {
        return Err(RankingError::NotAuthenticated);
    }
    if roles.contains(&required_role_for(op)) { Ok(()) } else { Err(RankingError::NotAuthorized) }
}
