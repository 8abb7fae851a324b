//! # Custodia (Admin Authentication Authority)
//!
//! `custodia` is the authentication and credential-management service for the
//! admin panel. It owns password hashing, admin account lookup and mutation,
//! and server-side session state; everything else (content CRUD, the public
//! site) consumes the session cookie it issues.
//!
//! ## Accounts
//!
//! Admin accounts carry a stable internal id; the email identifier is a
//! uniquely-indexed attribute, not the storage key. Renaming an account is a
//! single-row field update. Identifier comparison is case-insensitive
//! everywhere: identifiers are normalized (trimmed, lowercased) at the
//! service boundary.
//!
//! ## Passwords
//!
//! Passwords are hashed with Argon2id and a per-hash random salt; the stored
//! PHC string embeds salt, parameters, and scheme version so parameters can
//! be upgraded later without a mass reset.
//!
//! ## Sessions
//!
//! A login issues a random token delivered in an `HttpOnly` cookie; the
//! database stores only the token's hash together with an absolute expiry.
//! The cookie is the sole trusted proof of authentication. Any client-side
//! "logged in" flag is a UI hint with no authority, and every mutating
//! endpoint re-checks the cookie server-side.
//!
//! Login rejections never reveal whether the identifier exists: unknown
//! account and wrong password collapse into one generic response.

pub mod api;
pub mod auth;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
