//! Postgres-backed credential store.
//!
//! Schema lives in `db/sql/custodia.sql`. Uniqueness races on identifiers
//! and token hashes resolve through the database's unique indexes; SQLSTATE
//! 23505 is mapped to a conflict outcome instead of an error so callers can
//! treat "lost the race" as a normal result.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Connection, PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::{AdminAccount, AdminStore, InsertOutcome, SessionRecord, UpdateOutcome};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn query_span(operation: &str, statement: &str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn account_from_row(row: &sqlx::postgres::PgRow) -> AdminAccount {
    AdminAccount {
        id: row.get("id"),
        identifier: row.get("identifier"),
        credential_digest: row.get("credential_digest"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl AdminStore for PgStore {
    async fn get_account(&self, identifier: &str) -> Result<Option<AdminAccount>> {
        // Both sides are folded so lookups stay case-insensitive even when
        // the caller skipped normalization.
        let query = r"
            SELECT id, identifier, credential_digest, created_at, updated_at
            FROM admin_accounts
            WHERE LOWER(identifier) = LOWER($1)
            LIMIT 1
        ";
        let row = sqlx::query(query)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to lookup account by identifier")?;
        Ok(row.as_ref().map(account_from_row))
    }

    async fn get_account_by_id(&self, id: Uuid) -> Result<Option<AdminAccount>> {
        let query = r"
            SELECT id, identifier, credential_digest, created_at, updated_at
            FROM admin_accounts
            WHERE id = $1
            LIMIT 1
        ";
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to lookup account by id")?;
        Ok(row.as_ref().map(account_from_row))
    }

    async fn insert_account(&self, account: AdminAccount) -> Result<InsertOutcome> {
        let query = r"
            INSERT INTO admin_accounts
                (id, identifier, credential_digest, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
        ";
        let result = sqlx::query(query)
            .bind(account.id)
            .bind(&account.identifier)
            .bind(&account.credential_digest)
            .bind(account.created_at)
            .bind(account.updated_at)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Created),
            Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Conflict),
            Err(err) => Err(err).context("failed to insert account"),
        }
    }

    async fn update_account(&self, account: AdminAccount) -> Result<UpdateOutcome> {
        // A rename is just a field update here; the id never changes.
        let query = r"
            UPDATE admin_accounts
            SET identifier = $2,
                credential_digest = $3,
                updated_at = $4
            WHERE id = $1
        ";
        let result = sqlx::query(query)
            .bind(account.id)
            .bind(&account.identifier)
            .bind(&account.credential_digest)
            .bind(account.updated_at)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Ok(UpdateOutcome::Missing),
            Ok(_) => Ok(UpdateOutcome::Updated),
            Err(err) if is_unique_violation(&err) => Ok(UpdateOutcome::IdentifierConflict),
            Err(err) => Err(err).context("failed to update account"),
        }
    }

    async fn delete_account(&self, id: Uuid) -> Result<()> {
        // Sessions for the account go with it via ON DELETE CASCADE.
        let query = "DELETE FROM admin_accounts WHERE id = $1";
        sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(query_span("DELETE", query))
            .await
            .context("failed to delete account")?;
        Ok(())
    }

    async fn list_identifiers(&self) -> Result<Vec<String>> {
        let query = "SELECT identifier FROM admin_accounts ORDER BY identifier";
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to list identifiers")?;
        Ok(rows.iter().map(|row| row.get("identifier")).collect())
    }

    async fn insert_session(
        &self,
        token_hash: Vec<u8>,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<InsertOutcome> {
        let query = r"
            INSERT INTO admin_sessions (session_hash, account_id, expires_at)
            VALUES ($1, $2, $3)
        ";
        let result = sqlx::query(query)
            .bind(token_hash)
            .bind(account_id)
            .bind(expires_at)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Created),
            Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Conflict),
            Err(err) => Err(err).context("failed to insert session"),
        }
    }

    async fn get_session(&self, token_hash: &[u8]) -> Result<Option<SessionRecord>> {
        // Expiry is enforced in the query, never in the caller.
        let query = r"
            SELECT admin_sessions.account_id,
                   admin_accounts.identifier,
                   admin_sessions.expires_at
            FROM admin_sessions
            JOIN admin_accounts ON admin_accounts.id = admin_sessions.account_id
            WHERE admin_sessions.session_hash = $1
              AND admin_sessions.expires_at > NOW()
            LIMIT 1
        ";
        let row = sqlx::query(query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to lookup session")?;

        Ok(row.map(|row| SessionRecord {
            account_id: row.get("account_id"),
            identifier: row.get("identifier"),
            expires_at: row.get("expires_at"),
        }))
    }

    async fn delete_session(&self, token_hash: &[u8]) -> Result<()> {
        // Logout is idempotent; it's fine if no rows are deleted.
        let query = "DELETE FROM admin_sessions WHERE session_hash = $1";
        sqlx::query(query)
            .bind(token_hash)
            .execute(&self.pool)
            .instrument(query_span("DELETE", query))
            .await
            .context("failed to delete session")?;
        Ok(())
    }

    async fn delete_sessions_for_account(&self, account_id: Uuid) -> Result<()> {
        let query = "DELETE FROM admin_sessions WHERE account_id = $1";
        sqlx::query(query)
            .bind(account_id)
            .execute(&self.pool)
            .instrument(query_span("DELETE", query))
            .await
            .context("failed to delete account sessions")?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let span = tracing::info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("failed to acquire database connection")?;
        conn.ping()
            .instrument(span)
            .await
            .context("failed to ping database")?;
        Ok(())
    }
}
