//! Sessions and access credentials
//!
//! The HTTP variant holds one `Bank` per opaque session id. Requests for
//! the same session are serialized by the per-session mutex: two
//! simultaneous withdrawals against one account cannot both pass the
//! balance check. Sessions expire after an idle TTL and are pruned on
//! access.
//!
//! Access credentials are separate from the banking domain: a salted
//! SHA-256 password hash per national id, and server-held opaque bearer
//! tokens with their own TTL.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::WithdrawalPolicy;
use crate::error::AppError;
use crate::service::Bank;

/// A session's banking service behind its serializing lock.
pub type SharedBank = Arc<Mutex<Bank>>;

struct SessionEntry {
    bank: SharedBank,
    last_seen: DateTime<Utc>,
}

pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
    ttl: Duration,
    policy: WithdrawalPolicy,
}

impl SessionStore {
    pub fn new(ttl_minutes: i64, policy: WithdrawalPolicy) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: Duration::minutes(ttl_minutes),
            policy,
        }
    }

    /// Mint a fresh session bound to a new banking service.
    pub fn create(&self) -> Result<Uuid, AppError> {
        let mut sessions = self.lock()?;
        prune(&mut sessions, self.ttl);

        let id = Uuid::new_v4();
        sessions.insert(id, self.new_entry());
        Ok(id)
    }

    /// Resolve a session by id, refreshing its idle timer. A missing or
    /// unknown id lazily creates a session (keeping the caller's id when
    /// one was supplied, so clients may mint their own).
    pub fn resolve(&self, id: Option<Uuid>) -> Result<(Uuid, SharedBank), AppError> {
        let mut sessions = self.lock()?;
        prune(&mut sessions, self.ttl);

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_seen = Utc::now();
                return Ok((id, entry.bank.clone()));
            }
        }

        let id = id.unwrap_or_else(Uuid::new_v4);
        let entry = self.new_entry();
        let bank = entry.bank.clone();
        sessions.insert(id, entry);
        Ok((id, bank))
    }

    pub fn session_count(&self) -> Result<usize, AppError> {
        Ok(self.lock()?.len())
    }

    fn new_entry(&self) -> SessionEntry {
        SessionEntry {
            bank: Arc::new(Mutex::new(Bank::with_policy(self.policy))),
            last_seen: Utc::now(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, SessionEntry>>, AppError> {
        self.sessions
            .lock()
            .map_err(|_| AppError::Internal("session store lock poisoned".to_string()))
    }
}

fn prune(sessions: &mut HashMap<Uuid, SessionEntry>, ttl: Duration) {
    let now = Utc::now();
    sessions.retain(|_, entry| now - entry.last_seen <= ttl);
}

struct StoredCredential {
    salt: [u8; 16],
    hash: String,
}

struct TokenEntry {
    national_id: String,
    expires_at: DateTime<Utc>,
}

pub struct CredentialStore {
    credentials: Mutex<HashMap<String, StoredCredential>>,
    tokens: Mutex<HashMap<String, TokenEntry>>,
    token_ttl: Duration,
}

impl CredentialStore {
    pub fn new(token_ttl_minutes: i64) -> Self {
        Self {
            credentials: Mutex::new(HashMap::new()),
            tokens: Mutex::new(HashMap::new()),
            token_ttl: Duration::minutes(token_ttl_minutes),
        }
    }

    /// Register access credentials for a national id.
    pub fn register(&self, national_id: &str, password: &str) -> Result<(), AppError> {
        if national_id.is_empty() || password.is_empty() {
            return Err(AppError::InvalidRequest(
                "national id and password are required".to_string(),
            ));
        }

        let mut credentials = self.lock_credentials()?;
        if credentials.contains_key(national_id) {
            return Err(AppError::DuplicateCredentials(national_id.to_string()));
        }

        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let hash = hash_password(&salt, password);
        credentials.insert(national_id.to_string(), StoredCredential { salt, hash });
        Ok(())
    }

    /// Verify a password and issue an opaque bearer token.
    pub fn issue_token(&self, national_id: &str, password: &str) -> Result<String, AppError> {
        let credentials = self.lock_credentials()?;
        let stored = credentials
            .get(national_id)
            .ok_or(AppError::InvalidCredentials)?;
        if hash_password(&stored.salt, password) != stored.hash {
            return Err(AppError::InvalidCredentials);
        }
        drop(credentials);

        let mut raw = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut raw);
        let token = hex::encode(raw);

        let mut tokens = self.lock_tokens()?;
        tokens.insert(
            token.clone(),
            TokenEntry {
                national_id: national_id.to_string(),
                expires_at: Utc::now() + self.token_ttl,
            },
        );
        Ok(token)
    }

    /// Resolve a bearer token to its national id, dropping expired tokens.
    pub fn verify_token(&self, token: &str) -> Result<String, AppError> {
        let mut tokens = self.lock_tokens()?;
        let now = Utc::now();
        tokens.retain(|_, entry| entry.expires_at > now);

        tokens
            .get(token)
            .map(|entry| entry.national_id.clone())
            .ok_or(AppError::InvalidToken)
    }

    fn lock_credentials(&self) -> Result<MutexGuard<'_, HashMap<String, StoredCredential>>, AppError> {
        self.credentials
            .lock()
            .map_err(|_| AppError::Internal("credential store lock poisoned".to_string()))
    }

    fn lock_tokens(&self) -> Result<MutexGuard<'_, HashMap<String, TokenEntry>>, AppError> {
        self.tokens
            .lock()
            .map_err(|_| AppError::Internal("token store lock poisoned".to_string()))
    }
}

fn hash_password(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_keeps_supplied_id() {
        let store = SessionStore::new(60, WithdrawalPolicy::default());
        let id = Uuid::new_v4();

        let (resolved, _) = store.resolve(Some(id)).unwrap();
        assert_eq!(resolved, id);
        assert_eq!(store.session_count().unwrap(), 1);

        // Same id resolves to the same bank.
        let (again, bank) = store.resolve(Some(id)).unwrap();
        assert_eq!(again, id);
        bank.lock().unwrap().logout();
        assert_eq!(store.session_count().unwrap(), 1);
    }

    #[test]
    fn resolve_without_id_creates_session() {
        let store = SessionStore::new(60, WithdrawalPolicy::default());
        let (first, _) = store.resolve(None).unwrap();
        let (second, _) = store.resolve(None).unwrap();
        assert_ne!(first, second);
        assert_eq!(store.session_count().unwrap(), 2);
    }

    #[test]
    fn expired_sessions_are_pruned() {
        let store = SessionStore::new(0, WithdrawalPolicy::default());
        let id = store.create().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));

        // TTL of zero minutes: the next access drops it and mints a new id.
        let (resolved, _) = store.resolve(None).unwrap();
        assert_ne!(resolved, id);
        assert_eq!(store.session_count().unwrap(), 1);
    }

    #[test]
    fn credentials_roundtrip() {
        let store = CredentialStore::new(60);
        store.register("111", "hunter2").unwrap();

        assert!(matches!(
            store.register("111", "other"),
            Err(AppError::DuplicateCredentials(_))
        ));
        assert!(matches!(
            store.issue_token("111", "wrong"),
            Err(AppError::InvalidCredentials)
        ));

        let token = store.issue_token("111", "hunter2").unwrap();
        assert_eq!(store.verify_token(&token).unwrap(), "111");
        assert!(matches!(
            store.verify_token("bogus"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn empty_credentials_are_rejected() {
        let store = CredentialStore::new(60);
        assert!(matches!(
            store.register("", "pw"),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            store.register("111", ""),
            Err(AppError::InvalidRequest(_))
        ));
    }
}
