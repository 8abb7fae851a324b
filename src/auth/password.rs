//! Argon2id password hashing.
//!
//! The stored digest is a PHC string (`$argon2id$v=19$...`) which embeds the
//! salt, the cost parameters, and the scheme version. Parameter upgrades
//! change only what new hashes look like; old PHC strings keep verifying.

use anyhow::{anyhow, Result};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use std::sync::OnceLock;

/// Hash a password with Argon2id and a fresh random salt.
pub fn hash_password(secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?;
    Ok(digest.to_string())
}

/// Verify a password against a stored PHC string.
///
/// A malformed stored digest is an error, not a mismatch: it means the store
/// holds data this scheme version cannot interpret.
pub fn verify_password(secret: &str, digest: &str) -> Result<bool> {
    let parsed = PasswordHash::new(digest)
        .map_err(|err| anyhow!("invalid stored password digest: {err}"))?;
    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok())
}

/// Burn the same hashing work for identifiers that have no account, so the
/// unknown-account and wrong-password paths are indistinguishable by timing.
pub fn dummy_verify(secret: &str) {
    static DUMMY_DIGEST: OnceLock<Option<String>> = OnceLock::new();
    let digest = DUMMY_DIGEST.get_or_init(|| hash_password("custodia-dummy-credential").ok());
    if let Some(digest) = digest {
        let _ = verify_password(secret, digest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_never_equals_secret() -> Result<()> {
        let digest = hash_password("pw1")?;
        assert_ne!(digest, "pw1");
        assert!(digest.starts_with("$argon2id$"));
        Ok(())
    }

    #[test]
    fn same_secret_hashes_to_distinct_digests() -> Result<()> {
        // Random salts mean no two digests collide, but both verify.
        let first = hash_password("pw1")?;
        let second = hash_password("pw1")?;
        assert_ne!(first, second);
        assert!(verify_password("pw1", &first)?);
        assert!(verify_password("pw1", &second)?);
        Ok(())
    }

    #[test]
    fn wrong_secret_fails_verification() -> Result<()> {
        let digest = hash_password("pw1")?;
        assert!(!verify_password("wrong", &digest)?);
        Ok(())
    }

    #[test]
    fn malformed_digest_is_an_error() {
        assert!(verify_password("pw1", "not-a-phc-string").is_err());
    }

    #[test]
    fn dummy_verify_does_not_panic() {
        dummy_verify("anything");
    }
}
