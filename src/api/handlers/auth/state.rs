//! Shared auth state and configuration.

use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::api::delivery::Gateway;
use crate::api::handlers::stepup::code::CODE_TTL_SECONDS;
use crate::api::handlers::stepup::download::DEFAULT_TOKEN_TTL_SECONDS;
use crate::api::handlers::stepup::lockout::{
    DEFAULT_MAX_FAILURES, DEFAULT_WINDOW_SECONDS, LockoutTracker,
};

use super::rate_limit::RateLimiter;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 12 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    session_ttl_seconds: i64,
    otc_ttl_seconds: i64,
    download_token_ttl_seconds: i64,
    lockout_max_failures: u32,
    lockout_window_seconds: u64,
    storage_dir: PathBuf,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String, storage_dir: PathBuf) -> Self {
        Self {
            frontend_base_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            otc_ttl_seconds: CODE_TTL_SECONDS,
            download_token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            lockout_max_failures: DEFAULT_MAX_FAILURES,
            lockout_window_seconds: DEFAULT_WINDOW_SECONDS,
            storage_dir,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_otc_ttl_seconds(mut self, seconds: i64) -> Self {
        self.otc_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_download_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.download_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_lockout_max_failures(mut self, max_failures: u32) -> Self {
        self.lockout_max_failures = max_failures;
        self
    }

    #[must_use]
    pub fn with_lockout_window_seconds(mut self, seconds: u64) -> Self {
        self.lockout_window_seconds = seconds;
        self
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    pub(crate) fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    pub(crate) fn otc_ttl_seconds(&self) -> i64 {
        self.otc_ttl_seconds
    }

    pub(crate) fn download_token_ttl_seconds(&self) -> i64 {
        self.download_token_ttl_seconds
    }

    pub(crate) fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub(crate) fn session_cookie_secure(&self) -> bool {
        self.frontend_base_url.starts_with("https://")
    }
}

/// Per-process auth state shared across handlers via an `Extension`.
pub struct AuthState {
    config: AuthConfig,
    rate_limiter: Arc<dyn RateLimiter>,
    lockout: LockoutTracker,
    gateway: Gateway,
    download_token_key: SecretString,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        rate_limiter: Arc<dyn RateLimiter>,
        gateway: Gateway,
        download_token_key: SecretString,
    ) -> Self {
        let lockout = LockoutTracker::new(
            config.lockout_max_failures,
            Duration::from_secs(config.lockout_window_seconds),
        );
        Self {
            config,
            rate_limiter,
            lockout,
            gateway,
            download_token_key,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(crate) fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }

    pub(crate) fn lockout(&self) -> &LockoutTracker {
        &self.lockout
    }

    pub(crate) fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub(crate) fn download_token_key(&self) -> &[u8] {
        self.download_token_key.expose_secret().as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = AuthConfig::new(
            "https://vault.example".to_string(),
            PathBuf::from("/tmp/custodia"),
        );
        assert_eq!(config.session_ttl_seconds(), DEFAULT_SESSION_TTL_SECONDS);
        assert_eq!(config.otc_ttl_seconds(), 300);
        assert_eq!(config.download_token_ttl_seconds(), 600);
        assert!(config.session_cookie_secure());
    }

    #[test]
    fn plain_http_frontend_means_insecure_cookie() {
        let config = AuthConfig::new(
            "http://localhost:3000".to_string(),
            PathBuf::from("/tmp/custodia"),
        );
        assert!(!config.session_cookie_secure());
    }

    #[test]
    fn builders_override_defaults() {
        let config = AuthConfig::new(
            "https://vault.example".to_string(),
            PathBuf::from("/tmp/custodia"),
        )
        .with_session_ttl_seconds(60)
        .with_otc_ttl_seconds(30)
        .with_download_token_ttl_seconds(90)
        .with_lockout_max_failures(2)
        .with_lockout_window_seconds(10);
        assert_eq!(config.session_ttl_seconds(), 60);
        assert_eq!(config.otc_ttl_seconds(), 30);
        assert_eq!(config.download_token_ttl_seconds(), 90);
    }
}
