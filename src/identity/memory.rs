use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{anyhow, Result};
use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use async_trait::async_trait;
use base64::Engine;
use parking_lot::RwLock;
use password_hash::{PasswordHash, SaltString};

use crate::tprintln;

use super::principal::ProviderIdentity;
use super::provider::{IdentityProvider, Persistence, ProviderError};

fn gen_uid() -> String {
    // 128-bit random id base64url without padding
    let mut buf = [0u8; 16];
    let _ = getrandom::getrandom(&mut buf);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf)
}

// Light Argon2id parameters: this provider only lives in-process.
fn hasher() -> Result<Argon2<'static>> {
    let params = Params::new(8 * 1024, 1, 1, None).map_err(|e| anyhow!(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let phc = hasher()?.hash_password(password.as_bytes(), &salt).map_err(|e| anyhow!(e.to_string()))?.to_string();
    Ok(phc)
}

fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
    } else { false }
}

struct Account {
    uid: String,
    password_hash: String,
}

/// In-process identity provider with email/password accounts and anonymous sign-in.
///
/// Holds at most one signed-in identity, like a browser auth client. Failure
/// injection hooks let tests drive the error paths of `AuthSession`.
pub struct MemoryIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
    current: RwLock<Option<ProviderIdentity>>,
    persistence: RwLock<Persistence>,
    allow_anonymous: AtomicBool,
    offline: AtomicBool,
    fail_sign_out: AtomicBool,
    anonymous_sign_ins: AtomicUsize,
    password_sign_ins: AtomicUsize,
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self { Self::new() }
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
            persistence: RwLock::new(Persistence::Local),
            allow_anonymous: AtomicBool::new(true),
            offline: AtomicBool::new(false),
            fail_sign_out: AtomicBool::new(false),
            anonymous_sign_ins: AtomicUsize::new(0),
            password_sign_ins: AtomicUsize::new(0),
        }
    }

    /// Register an email/password account; returns its uid. Emails are matched case-insensitively.
    pub fn register_account(&self, email_address: &str, password: &str) -> Result<String> {
        let key = email_address.trim().to_lowercase();
        if key.is_empty() { return Err(anyhow!("email address must not be empty")); }
        let mut accounts = self.accounts.write();
        if accounts.contains_key(&key) { return Err(anyhow!("account already exists: {}", key)); }
        let uid = gen_uid();
        accounts.insert(key, Account { uid: uid.clone(), password_hash: hash_password(password)? });
        tprintln!("identity.register email={} uid={}", email_address, uid);
        Ok(uid)
    }

    pub fn set_allow_anonymous(&self, allow: bool) { self.allow_anonymous.store(allow, Ordering::SeqCst); }

    pub fn set_offline(&self, offline: bool) { self.offline.store(offline, Ordering::SeqCst); }

    pub fn set_fail_sign_out(&self, fail: bool) { self.fail_sign_out.store(fail, Ordering::SeqCst); }

    /// Drop the current identity on the provider side (token expiry, revocation).
    pub fn revoke_session(&self) { *self.current.write() = None; }

    pub fn persistence(&self) -> Persistence { *self.persistence.read() }

    pub fn anonymous_sign_ins(&self) -> usize { self.anonymous_sign_ins.load(Ordering::SeqCst) }

    pub fn password_sign_ins(&self) -> usize { self.password_sign_ins.load(Ordering::SeqCst) }

    fn check_online(&self) -> Result<(), ProviderError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("network request failed".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn set_persistence(&self, persistence: Persistence) -> Result<(), ProviderError> {
        *self.persistence.write() = persistence;
        Ok(())
    }

    async fn sign_in_with_password(&self, email_address: &str, password: &str) -> Result<ProviderIdentity, ProviderError> {
        self.check_online()?;
        self.password_sign_ins.fetch_add(1, Ordering::SeqCst);
        let key = email_address.trim().to_lowercase();
        let uid = {
            let accounts = self.accounts.read();
            let Some(acct) = accounts.get(&key) else { return Err(ProviderError::InvalidCredentials); };
            if !verify_password(&acct.password_hash, password) {
                return Err(ProviderError::InvalidCredentials);
            }
            acct.uid.clone()
        };
        let identity = ProviderIdentity { uid, email_address: Some(key), is_anonymous: false };
        *self.current.write() = Some(identity.clone());
        tprintln!("identity.sign_in email={} uid={}", email_address, identity.uid);
        Ok(identity)
    }

    async fn sign_in_anonymously(&self) -> Result<ProviderIdentity, ProviderError> {
        self.check_online()?;
        if !self.allow_anonymous.load(Ordering::SeqCst) {
            return Err(ProviderError::OperationNotAllowed("anonymous sign-in is disabled".into()));
        }
        self.anonymous_sign_ins.fetch_add(1, Ordering::SeqCst);
        let identity = ProviderIdentity { uid: gen_uid(), email_address: None, is_anonymous: true };
        *self.current.write() = Some(identity.clone());
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.check_online()?;
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(ProviderError::Internal("sign-out failed".into()));
        }
        *self.current.write() = None;
        Ok(())
    }

    fn current_identity(&self) -> Option<ProviderIdentity> { self.current.read().clone() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_roundtrip() {
        let phc = hash_password("123456").unwrap();
        assert!(phc.starts_with("$argon2id$"));
        assert!(verify_password(&phc, "123456"));
        assert!(!verify_password(&phc, "654321"));
        assert!(!verify_password("not-a-phc", "123456"));
    }

    #[test]
    fn duplicate_accounts_rejected() {
        let p = MemoryIdentityProvider::new();
        p.register_account("test@test.com", "123456").unwrap();
        assert!(p.register_account("TEST@test.com", "other").is_err());
        assert!(p.register_account("  ", "x").is_err());
    }

    #[tokio::test]
    async fn sign_in_paths() {
        let p = MemoryIdentityProvider::new();
        let uid = p.register_account("test@test.com", "123456").unwrap();
        assert_eq!(p.sign_in_with_password("test@test.com", "bad").await, Err(ProviderError::InvalidCredentials));
        assert_eq!(p.sign_in_with_password("nobody@test.com", "123456").await, Err(ProviderError::InvalidCredentials));
        let id = p.sign_in_with_password("Test@Test.com", "123456").await.unwrap();
        assert_eq!(id.uid, uid);
        assert_eq!(p.current_identity(), Some(id));

        let anon = p.sign_in_anonymously().await.unwrap();
        assert!(anon.is_anonymous);
        assert_eq!(p.anonymous_sign_ins(), 1);

        p.sign_out().await.unwrap();
        assert_eq!(p.current_identity(), None);
    }
}
