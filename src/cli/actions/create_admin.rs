//! Bootstrap an admin account from the command line.
//!
//! This replaces any in-app initialization path; accounts are only ever
//! created here or through an authenticated operator, never from hard-coded
//! defaults.

use anyhow::{bail, Context, Result};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::auth::identifier::{normalize_identifier, valid_identifier};
use crate::auth::{AccountService, CreateOutcome};
use crate::cli::actions::Action;
use crate::store::PgStore;

/// Handle the create-admin action
pub async fn handle(action: Action) -> Result<()> {
    if let Action::CreateAdmin {
        dsn,
        identifier,
        password,
    } = action
    {
        let identifier = normalize_identifier(&identifier);
        if !valid_identifier(&identifier) {
            bail!("Invalid identifier: expected an email address");
        }
        if password.expose_secret().is_empty() {
            bail!("Password must not be empty");
        }

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&dsn)
            .await
            .context("Failed to connect to database")?;

        let service = AccountService::new(Arc::new(PgStore::new(pool)));
        match service.create(&identifier, password.expose_secret()).await? {
            CreateOutcome::Created(account) => {
                info!("Admin account created: {}", account.identifier);
                println!("Admin account created: {}", account.identifier);
            }
            CreateOutcome::Conflict => {
                bail!("An account already exists for {identifier}");
            }
        }
    }

    Ok(())
}
