//! Server-side session establishment and checks.
//!
//! A session token is 32 random bytes, URL-safe base64. The raw value exists
//! only in the cookie; the store holds its SHA-256 hash with an absolute
//! expiry, so a leaked store never yields usable tokens.

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::store::{AdminStore, InsertOutcome, SessionRecord};

/// Generate a fresh raw session token.
pub fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a session token so raw values never touch the store.
#[must_use]
pub fn hash_session_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// The single predicate deciding whether a request counts as "admin".
pub struct SessionGate {
    store: Arc<dyn AdminStore>,
    ttl_seconds: i64,
}

impl SessionGate {
    #[must_use]
    pub fn new(store: Arc<dyn AdminStore>, ttl_seconds: i64) -> Self {
        Self { store, ttl_seconds }
    }

    /// Establish a session for an account and return the raw token.
    pub async fn establish(&self, account_id: Uuid) -> Result<String> {
        let expires_at = Utc::now() + Duration::seconds(self.ttl_seconds);

        // Token-hash collisions are astronomically unlikely; the retry loop
        // exists so a collision degrades to another draw, not a failure.
        for _ in 0..3 {
            let token = generate_session_token()?;
            let token_hash = hash_session_token(&token);
            match self
                .store
                .insert_session(token_hash, account_id, expires_at)
                .await?
            {
                InsertOutcome::Created => return Ok(token),
                InsertOutcome::Conflict => {}
            }
        }

        Err(anyhow!("failed to generate unique session token"))
    }

    /// Resolve a raw token to its session, if present and unexpired.
    pub async fn is_active(&self, token: &str) -> Result<Option<SessionRecord>> {
        self.store.get_session(&hash_session_token(token)).await
    }

    /// Destroy a session; idempotent.
    pub async fn destroy(&self, token: &str) -> Result<()> {
        self.store.delete_session(&hash_session_token(token)).await
    }

    /// Revoke every session belonging to an account.
    pub async fn destroy_all_for(&self, account_id: Uuid) -> Result<()> {
        self.store.delete_sessions_for_account(account_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AdminAccount, MemoryStore};

    async fn store_with_account() -> Result<(Arc<MemoryStore>, AdminAccount)> {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let account = AdminAccount {
            id: Uuid::new_v4(),
            identifier: "admin@x.com".to_string(),
            credential_digest: "$argon2id$stub".to_string(),
            created_at: now,
            updated_at: now,
        };
        store.insert_account(account.clone()).await?;
        Ok((store, account))
    }

    #[test]
    fn token_is_32_random_bytes() -> Result<()> {
        let token = generate_session_token()?;
        let decoded = URL_SAFE_NO_PAD.decode(token.as_bytes())?;
        assert_eq!(decoded.len(), 32);
        assert_ne!(token, generate_session_token()?);
        Ok(())
    }

    #[test]
    fn token_hash_is_stable_and_distinct() {
        let first = hash_session_token("token");
        let second = hash_session_token("token");
        let different = hash_session_token("other");
        assert_eq!(first, second);
        assert_ne!(first, different);
    }

    #[tokio::test]
    async fn establish_then_check_then_destroy() -> Result<()> {
        let (store, account) = store_with_account().await?;
        let gate = SessionGate::new(store, 3600);

        let token = gate.establish(account.id).await?;
        let session = gate.is_active(&token).await?;
        assert_eq!(
            session.map(|session| session.identifier),
            Some("admin@x.com".to_string())
        );

        gate.destroy(&token).await?;
        assert!(gate.is_active(&token).await?.is_none());

        // Destroy is idempotent.
        gate.destroy(&token).await?;
        Ok(())
    }

    #[tokio::test]
    async fn zero_ttl_sessions_are_never_active() -> Result<()> {
        let (store, account) = store_with_account().await?;
        let gate = SessionGate::new(store, 0);

        let token = gate.establish(account.id).await?;
        assert!(gate.is_active(&token).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_token_is_inactive() -> Result<()> {
        let (store, _account) = store_with_account().await?;
        let gate = SessionGate::new(store, 3600);
        assert!(gate.is_active("made-up-token").await?.is_none());
        Ok(())
    }
}
