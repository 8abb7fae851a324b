//! Auth configuration and shared handler state.

use std::sync::Arc;

use crate::auth::{AccountService, SessionGate};
use crate::store::AdminStore;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    public_base_url: String,
    session_ttl_seconds: i64,
}

impl AuthConfig {
    /// `public_base_url` is the origin the admin UI is served from; it drives
    /// CORS and whether the session cookie is marked `Secure`.
    #[must_use]
    pub fn new(public_base_url: String) -> Self {
        Self {
            public_base_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    /// Only mark cookies secure when the admin UI is served over HTTPS.
    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.public_base_url.starts_with("https://")
    }
}

/// Everything the auth handlers need, behind one `Extension`.
pub struct AuthState {
    config: AuthConfig,
    service: AccountService,
    gate: SessionGate,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, store: Arc<dyn AdminStore>) -> Self {
        let gate = SessionGate::new(store.clone(), config.session_ttl_seconds());
        let service = AccountService::new(store);
        Self {
            config,
            service,
            gate,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn service(&self) -> &AccountService {
        &self.service
    }

    #[must_use]
    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn config_defaults_and_overrides() {
        let config = AuthConfig::new("https://admin.example.com".to_string());
        assert_eq!(
            config.session_ttl_seconds(),
            super::DEFAULT_SESSION_TTL_SECONDS
        );
        assert!(config.session_cookie_secure());

        let config = config.with_session_ttl_seconds(60);
        assert_eq!(config.session_ttl_seconds(), 60);
    }

    #[test]
    fn plain_http_base_url_disables_secure_cookie() {
        let config = AuthConfig::new("http://localhost:3000".to_string());
        assert!(!config.session_cookie_secure());
    }

    #[test]
    fn state_constructs_from_store() {
        let config = AuthConfig::new("http://localhost:3000".to_string());
        let state = AuthState::new(config, Arc::new(MemoryStore::new()));
        assert_eq!(state.config().session_ttl_seconds(), 24 * 60 * 60);
    }
}
