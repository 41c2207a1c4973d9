use serde::{Deserialize, Serialize};

/// Email/password pair for a credentialed sign-in.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    #[serde(rename = "emailAddress", alias = "email_address")]
    pub email_address: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email_address: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email_address: email_address.into(), password: password.into() }
    }
}

// Keep the password out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("email_address", &self.email_address).field("password", &"***").finish()
    }
}

/// Identity as reported by the identity provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub uid: String,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

/// Session state tracked by `AuthSession`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthIdentity {
    #[default]
    Unauthenticated,
    AnonymousSession { uid: String },
    NamedSession { uid: String, email_address: String },
}

impl AuthIdentity {
    pub fn uid(&self) -> Option<&str> {
        match self {
            AuthIdentity::Unauthenticated => None,
            AuthIdentity::AnonymousSession { uid } | AuthIdentity::NamedSession { uid, .. } => Some(uid.as_str()),
        }
    }

    pub fn is_named(&self) -> bool { matches!(self, AuthIdentity::NamedSession { .. }) }
}

impl From<ProviderIdentity> for AuthIdentity {
    fn from(p: ProviderIdentity) -> Self {
        match p.email_address {
            Some(email_address) if !p.is_anonymous => AuthIdentity::NamedSession { uid: p.uid, email_address },
            _ => AuthIdentity::AnonymousSession { uid: p.uid },
        }
    }
}
