//! Credential store abstraction.
//!
//! The service core talks to the store only through [`AdminStore`], so the
//! account and session logic stays testable without a running database.
//! [`postgres::PgStore`] is the production implementation;
//! [`memory::MemoryStore`] backs unit tests and local experiments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A stored admin account.
///
/// `id` is the immutable storage key; `identifier` is the normalized email
/// address, unique across accounts but freely renameable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminAccount {
    pub id: Uuid,
    pub identifier: String,
    pub credential_digest: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal data resolved from a valid session token hash.
#[derive(Clone, Debug)]
pub struct SessionRecord {
    pub account_id: Uuid,
    pub identifier: String,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of an atomic create-if-absent insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    Conflict,
}

/// Outcome of an account update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    /// The new identifier collides with another account.
    IdentifierConflict,
    /// No account exists for the given id.
    Missing,
}

/// Document-store operations the auth subsystem relies on.
///
/// Implementations must make `insert_account` and `insert_session` atomic:
/// two concurrent inserts for the same identifier (or token hash) must
/// resolve to exactly one `Created` and one `Conflict`, never two writes.
#[async_trait]
pub trait AdminStore: Send + Sync {
    /// Fetch an account by normalized identifier (case-insensitive match).
    async fn get_account(&self, identifier: &str) -> anyhow::Result<Option<AdminAccount>>;

    async fn get_account_by_id(&self, id: Uuid) -> anyhow::Result<Option<AdminAccount>>;

    /// Create-if-absent keyed on the identifier's unique index.
    async fn insert_account(&self, account: AdminAccount) -> anyhow::Result<InsertOutcome>;

    /// Update all mutable fields of the account row addressed by `account.id`.
    async fn update_account(&self, account: AdminAccount) -> anyhow::Result<UpdateOutcome>;

    async fn delete_account(&self, id: Uuid) -> anyhow::Result<()>;

    /// All stored identifiers, for operational tooling.
    async fn list_identifiers(&self) -> anyhow::Result<Vec<String>>;

    /// Store a session token hash with an absolute expiry.
    async fn insert_session(
        &self,
        token_hash: Vec<u8>,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<InsertOutcome>;

    /// Resolve an unexpired session token hash, or `None`.
    async fn get_session(&self, token_hash: &[u8]) -> anyhow::Result<Option<SessionRecord>>;

    /// Idempotent session delete.
    async fn delete_session(&self, token_hash: &[u8]) -> anyhow::Result<()>;

    /// Revoke every session belonging to an account.
    async fn delete_sessions_for_account(&self, account_id: Uuid) -> anyhow::Result<()>;

    /// Connectivity check for the health endpoint.
    async fn ping(&self) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::{InsertOutcome, UpdateOutcome};

    #[test]
    fn insert_outcome_debug_names() {
        assert_eq!(format!("{:?}", InsertOutcome::Created), "Created");
        assert_eq!(format!("{:?}", InsertOutcome::Conflict), "Conflict");
    }

    #[test]
    fn update_outcome_debug_names() {
        assert_eq!(format!("{:?}", UpdateOutcome::Updated), "Updated");
        assert_eq!(
            format!("{:?}", UpdateOutcome::IdentifierConflict),
            "IdentifierConflict"
        );
        assert_eq!(format!("{:?}", UpdateOutcome::Missing), "Missing");
    }
}
