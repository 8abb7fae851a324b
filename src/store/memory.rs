//! In-process store used by unit tests and local experiments.
//!
//! A single mutex guards both maps, which gives the same atomicity as the
//! database's unique indexes: a create-if-absent check and the insert happen
//! under one lock acquisition.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{AdminAccount, AdminStore, InsertOutcome, SessionRecord, UpdateOutcome};

struct SessionRow {
    account_id: Uuid,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<Uuid, AdminAccount>,
    sessions: HashMap<Vec<u8>, SessionRow>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn identifier_taken(inner: &Inner, identifier: &str, exclude: Option<Uuid>) -> bool {
    inner.accounts.values().any(|account| {
        Some(account.id) != exclude && account.identifier.eq_ignore_ascii_case(identifier)
    })
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn get_account(&self, identifier: &str) -> Result<Option<AdminAccount>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .accounts
            .values()
            .find(|account| account.identifier.eq_ignore_ascii_case(identifier))
            .cloned())
    }

    async fn get_account_by_id(&self, id: Uuid) -> Result<Option<AdminAccount>> {
        let inner = self.inner.lock().await;
        Ok(inner.accounts.get(&id).cloned())
    }

    async fn insert_account(&self, account: AdminAccount) -> Result<InsertOutcome> {
        let mut inner = self.inner.lock().await;
        if identifier_taken(&inner, &account.identifier, None) {
            return Ok(InsertOutcome::Conflict);
        }
        inner.accounts.insert(account.id, account);
        Ok(InsertOutcome::Created)
    }

    async fn update_account(&self, account: AdminAccount) -> Result<UpdateOutcome> {
        let mut inner = self.inner.lock().await;
        if !inner.accounts.contains_key(&account.id) {
            return Ok(UpdateOutcome::Missing);
        }
        if identifier_taken(&inner, &account.identifier, Some(account.id)) {
            return Ok(UpdateOutcome::IdentifierConflict);
        }
        inner.accounts.insert(account.id, account);
        Ok(UpdateOutcome::Updated)
    }

    async fn delete_account(&self, id: Uuid) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.accounts.remove(&id);
        inner.sessions.retain(|_, row| row.account_id != id);
        Ok(())
    }

    async fn list_identifiers(&self) -> Result<Vec<String>> {
        let inner = self.inner.lock().await;
        let mut identifiers: Vec<String> = inner
            .accounts
            .values()
            .map(|account| account.identifier.clone())
            .collect();
        identifiers.sort();
        Ok(identifiers)
    }

    async fn insert_session(
        &self,
        token_hash: Vec<u8>,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<InsertOutcome> {
        let mut inner = self.inner.lock().await;
        if inner.sessions.contains_key(&token_hash) {
            return Ok(InsertOutcome::Conflict);
        }
        inner.sessions.insert(
            token_hash,
            SessionRow {
                account_id,
                expires_at,
            },
        );
        Ok(InsertOutcome::Created)
    }

    async fn get_session(&self, token_hash: &[u8]) -> Result<Option<SessionRecord>> {
        let inner = self.inner.lock().await;
        let Some(row) = inner.sessions.get(token_hash) else {
            return Ok(None);
        };
        if row.expires_at <= Utc::now() {
            return Ok(None);
        }
        let Some(account) = inner.accounts.get(&row.account_id) else {
            return Ok(None);
        };
        Ok(Some(SessionRecord {
            account_id: row.account_id,
            identifier: account.identifier.clone(),
            expires_at: row.expires_at,
        }))
    }

    async fn delete_session(&self, token_hash: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.sessions.remove(token_hash);
        Ok(())
    }

    async fn delete_sessions_for_account(&self, account_id: Uuid) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.sessions.retain(|_, row| row.account_id != account_id);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
