//! Account verification, creation, and credential changes.
//!
//! This is the single authority for reading and mutating admin credentials.
//! Domain results are outcome enums; `anyhow::Error` is reserved for
//! infrastructure failures (store unreachable, corrupt digests). Callers map
//! outcomes to responses and must keep `InvalidCredentials` generic: the
//! unknown-account and wrong-password cases are deliberately merged.

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use super::identifier::normalize_identifier;
use super::password::{dummy_verify, hash_password, verify_password};
use crate::store::{AdminAccount, AdminStore, InsertOutcome, UpdateOutcome};

/// Outcome when creating a new admin account.
#[derive(Debug)]
pub enum CreateOutcome {
    Created(AdminAccount),
    /// An account already exists at this identifier (case-insensitive).
    Conflict,
}

/// Outcome of a credential-change request.
#[derive(Debug)]
pub enum ChangeOutcome {
    Updated(AdminAccount),
    /// Wrong current secret or no such account; never split apart.
    InvalidCredentials,
    /// The rename target is taken.
    IdentifierInUse,
    /// Neither a new identifier nor a new secret was supplied.
    NothingToUpdate,
}

pub struct AccountService {
    store: Arc<dyn AdminStore>,
}

impl AccountService {
    #[must_use]
    pub fn new(store: Arc<dyn AdminStore>) -> Self {
        Self { store }
    }

    /// Resolve (identifier, secret) to the account they belong to.
    ///
    /// Every rejection collapses to `Ok(None)`: unknown identifier, missing
    /// digest, and wrong secret are indistinguishable to the caller.
    pub async fn authenticate(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<Option<AdminAccount>> {
        let identifier = normalize_identifier(identifier);
        let Some(account) = self.store.get_account(&identifier).await? else {
            dummy_verify(secret);
            return Ok(None);
        };

        match verify_password(secret, &account.credential_digest) {
            Ok(true) => Ok(Some(account)),
            Ok(false) => Ok(None),
            Err(err) => {
                // A digest this scheme cannot parse fails closed.
                warn!("Unreadable credential digest for an admin account: {err}");
                Ok(None)
            }
        }
    }

    /// Check credentials without exposing the account.
    pub async fn verify(&self, identifier: &str, secret: &str) -> Result<bool> {
        Ok(self.authenticate(identifier, secret).await?.is_some())
    }

    /// Create an account; fails with `Conflict` if the identifier is taken.
    ///
    /// The existence check and the write are one atomic store insert, so two
    /// concurrent creates for the same identifier admit exactly one.
    pub async fn create(&self, identifier: &str, secret: &str) -> Result<CreateOutcome> {
        let now = Utc::now();
        let account = AdminAccount {
            id: Uuid::new_v4(),
            identifier: normalize_identifier(identifier),
            credential_digest: hash_password(secret)?,
            created_at: now,
            updated_at: now,
        };

        match self.store.insert_account(account.clone()).await? {
            InsertOutcome::Created => Ok(CreateOutcome::Created(account)),
            InsertOutcome::Conflict => Ok(CreateOutcome::Conflict),
        }
    }

    /// Change the identifier and/or secret of an account.
    ///
    /// The current secret is always re-verified; an established session is
    /// never sufficient for this operation. Nothing is written unless that
    /// re-verification passes. A secret change revokes every session for the
    /// account.
    pub async fn change_credentials(
        &self,
        current_identifier: &str,
        current_secret: &str,
        new_identifier: Option<&str>,
        new_secret: Option<&str>,
    ) -> Result<ChangeOutcome> {
        let Some(mut account) = self.authenticate(current_identifier, current_secret).await? else {
            return Ok(ChangeOutcome::InvalidCredentials);
        };

        // A "rename" to the same normalized identifier is not a change.
        let new_identifier = new_identifier
            .map(normalize_identifier)
            .filter(|candidate| *candidate != account.identifier);
        let new_secret = new_secret.filter(|secret| !secret.is_empty());

        if new_identifier.is_none() && new_secret.is_none() {
            return Ok(ChangeOutcome::NothingToUpdate);
        }

        if let Some(identifier) = new_identifier {
            account.identifier = identifier;
        }
        let secret_changed = new_secret.is_some();
        if let Some(secret) = new_secret {
            account.credential_digest = hash_password(secret)?;
        }
        account.updated_at = Utc::now();

        // Uniqueness is enforced by the store's index at write time, so a
        // concurrent rename to the same target cannot slip through.
        match self.store.update_account(account.clone()).await? {
            UpdateOutcome::Updated => {
                if secret_changed {
                    self.store.delete_sessions_for_account(account.id).await?;
                }
                Ok(ChangeOutcome::Updated(account))
            }
            UpdateOutcome::IdentifierConflict => Ok(ChangeOutcome::IdentifierInUse),
            // The account vanished between verify and write; fail closed.
            UpdateOutcome::Missing => Ok(ChangeOutcome::InvalidCredentials),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> (AccountService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (AccountService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn create_then_verify() -> Result<()> {
        let (service, _store) = service();
        let outcome = service.create("admin@x.com", "pw1").await?;
        assert!(matches!(outcome, CreateOutcome::Created(_)));

        assert!(service.verify("admin@x.com", "pw1").await?);
        assert!(!service.verify("admin@x.com", "wrong").await?);
        assert!(!service.verify("nobody@x.com", "pw1").await?);
        Ok(())
    }

    #[tokio::test]
    async fn verify_is_case_insensitive_on_identifier() -> Result<()> {
        let (service, _store) = service();
        service.create("Admin@X.com", "pw1").await?;
        assert!(service.verify("admin@x.com", "pw1").await?);
        assert!(service.verify(" ADMIN@x.COM ", "pw1").await?);
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_case_insensitive_collision() -> Result<()> {
        let (service, _store) = service();
        service.create("a@x.com", "pw1").await?;
        let outcome = service.create("A@x.com", "pw2").await?;
        assert!(matches!(outcome, CreateOutcome::Conflict));
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_creates_admit_exactly_one() -> Result<()> {
        let (service, store) = service();
        let (first, second) = tokio::join!(
            service.create("a@x.com", "pw1"),
            service.create("a@x.com", "pw2")
        );
        let created = [first?, second?]
            .iter()
            .filter(|outcome| matches!(outcome, CreateOutcome::Created(_)))
            .count();
        assert_eq!(created, 1);
        assert_eq!(store.list_identifiers().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn rename_moves_the_identifier() -> Result<()> {
        let (service, store) = service();
        service.create("a@x.com", "pw1").await?;

        let outcome = service
            .change_credentials("a@x.com", "pw1", Some("b@x.com"), None)
            .await?;
        assert!(matches!(outcome, ChangeOutcome::Updated(_)));

        // Old identifier gone, new one works with the unchanged password.
        assert!(!service.verify("a@x.com", "pw1").await?);
        assert!(service.verify("b@x.com", "pw1").await?);
        assert_eq!(store.list_identifiers().await?, vec!["b@x.com"]);
        Ok(())
    }

    #[tokio::test]
    async fn rename_preserves_the_stable_id() -> Result<()> {
        let (service, store) = service();
        let CreateOutcome::Created(before) = service.create("a@x.com", "pw1").await? else {
            panic!("expected account creation");
        };

        service
            .change_credentials("a@x.com", "pw1", Some("b@x.com"), None)
            .await?;

        let after = store.get_account("b@x.com").await?;
        assert_eq!(after.map(|account| account.id), Some(before.id));
        Ok(())
    }

    #[tokio::test]
    async fn wrong_current_secret_never_mutates() -> Result<()> {
        let (service, store) = service();
        service.create("a@x.com", "pw1").await?;

        let outcome = service
            .change_credentials("a@x.com", "wrong", Some("b@x.com"), Some("pw2"))
            .await?;
        assert!(matches!(outcome, ChangeOutcome::InvalidCredentials));

        assert_eq!(store.list_identifiers().await?, vec!["a@x.com"]);
        assert!(service.verify("a@x.com", "pw1").await?);
        Ok(())
    }

    #[tokio::test]
    async fn rename_to_taken_identifier_is_rejected() -> Result<()> {
        let (service, _store) = service();
        service.create("a@x.com", "pw1").await?;
        service.create("b@x.com", "pw2").await?;

        let outcome = service
            .change_credentials("a@x.com", "pw1", Some("B@x.com"), None)
            .await?;
        assert!(matches!(outcome, ChangeOutcome::IdentifierInUse));

        // Both accounts keep working.
        assert!(service.verify("a@x.com", "pw1").await?);
        assert!(service.verify("b@x.com", "pw2").await?);
        Ok(())
    }

    #[tokio::test]
    async fn empty_change_is_nothing_to_update() -> Result<()> {
        let (service, _store) = service();
        service.create("a@x.com", "pw1").await?;

        let outcome = service
            .change_credentials("a@x.com", "pw1", None, None)
            .await?;
        assert!(matches!(outcome, ChangeOutcome::NothingToUpdate));

        // Renaming to the same identifier is equally a no-op.
        let outcome = service
            .change_credentials("a@x.com", "pw1", Some(" A@x.com "), None)
            .await?;
        assert!(matches!(outcome, ChangeOutcome::NothingToUpdate));
        Ok(())
    }

    #[tokio::test]
    async fn password_change_rotates_the_digest() -> Result<()> {
        let (service, _store) = service();
        service.create("a@x.com", "pw1").await?;

        let outcome = service
            .change_credentials("a@x.com", "pw1", None, Some("pw2"))
            .await?;
        assert!(matches!(outcome, ChangeOutcome::Updated(_)));

        assert!(!service.verify("a@x.com", "pw1").await?);
        assert!(service.verify("a@x.com", "pw2").await?);
        Ok(())
    }

    #[tokio::test]
    async fn password_change_revokes_sessions() -> Result<()> {
        use crate::auth::session::SessionGate;

        let (service, store) = service();
        let CreateOutcome::Created(account) = service.create("a@x.com", "pw1").await? else {
            panic!("expected account creation");
        };

        let gate = SessionGate::new(store.clone(), 3600);
        let token = gate.establish(account.id).await?;
        assert!(gate.is_active(&token).await?.is_some());

        service
            .change_credentials("a@x.com", "pw1", None, Some("pw2"))
            .await?;
        assert!(gate.is_active(&token).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn rename_and_password_change_together() -> Result<()> {
        let (service, _store) = service();
        service.create("a@x.com", "pw1").await?;

        let outcome = service
            .change_credentials("a@x.com", "pw1", Some("b@x.com"), Some("pw2"))
            .await?;
        assert!(matches!(outcome, ChangeOutcome::Updated(_)));

        assert!(!service.verify("a@x.com", "pw1").await?);
        assert!(!service.verify("b@x.com", "pw1").await?);
        assert!(service.verify("b@x.com", "pw2").await?);
        Ok(())
    }
}
