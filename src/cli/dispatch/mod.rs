use crate::cli::actions::Action;
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some(("server", matches)) => Ok(Action::Server {
            port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
            dsn: matches
                .get_one::<String>("dsn")
                .cloned()
                .context("missing required argument: --dsn")?,
            base_url: matches
                .get_one::<String>("base-url")
                .cloned()
                .context("missing required argument: --base-url")?,
            session_ttl: matches
                .get_one::<i64>("session-ttl")
                .copied()
                .unwrap_or(86_400),
        }),
        Some(("create-admin", matches)) => Ok(Action::CreateAdmin {
            dsn: matches
                .get_one::<String>("dsn")
                .cloned()
                .context("missing required argument: --dsn")?,
            identifier: matches
                .get_one::<String>("identifier")
                .cloned()
                .context("missing required argument: --identifier")?,
            password: matches
                .get_one::<String>("password")
                .cloned()
                .map(SecretString::from)
                .context("missing required argument: --password")?,
        }),
        _ => Err(anyhow!("no subcommand provided")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn dispatch_server() -> Result<()> {
        let matches = commands::new().try_get_matches_from(vec![
            "custodia",
            "server",
            "--dsn",
            "postgres://localhost/custodia",
            "--base-url",
            "https://admin.example.com",
        ])?;
        let action = handler(&matches)?;
        match action {
            Action::Server {
                port,
                dsn,
                base_url,
                session_ttl,
            } => {
                assert_eq!(port, 8080);
                assert_eq!(dsn, "postgres://localhost/custodia");
                assert_eq!(base_url, "https://admin.example.com");
                assert_eq!(session_ttl, 86_400);
            }
            Action::CreateAdmin { .. } => panic!("expected server action"),
        }
        Ok(())
    }

    #[test]
    fn dispatch_create_admin() -> Result<()> {
        let matches = commands::new().try_get_matches_from(vec![
            "custodia",
            "create-admin",
            "--dsn",
            "postgres://localhost/custodia",
            "--identifier",
            "admin@example.com",
            "--password",
            "a strong passphrase",
        ])?;
        let action = handler(&matches)?;
        match action {
            Action::CreateAdmin {
                identifier,
                password,
                ..
            } => {
                assert_eq!(identifier, "admin@example.com");
                assert_eq!(password.expose_secret(), "a strong passphrase");
            }
            Action::Server { .. } => panic!("expected create-admin action"),
        }
        Ok(())
    }
}
