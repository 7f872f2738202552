//! Account, session, and credential handling.

pub mod login;
pub mod principal;
pub mod rate_limit;
pub mod register;
pub mod session;
pub mod settings;
pub mod state;
pub(crate) mod storage;
pub mod types;
pub(crate) mod utils;

pub use rate_limit::SlidingWindowRateLimiter;
pub use state::{AuthConfig, AuthState};

#[cfg(test)]
pub(crate) mod test_support {
    use axum::extract::Extension;
    use secrecy::SecretString;
    use sqlx::PgPool;
    use sqlx::postgres::PgPoolOptions;
    use std::path::PathBuf;
    use std::sync::Arc;

    use crate::api::delivery::{EmailBackend, Gateway, SmsBackend};

    use super::rate_limit::{NoopRateLimiter, RateLimiter};
    use super::state::{AuthConfig, AuthState};

    /// Pool that never connects; handler tests only exercise paths that
    /// return before touching the database.
    pub(crate) fn lazy_pool() -> Extension<PgPool> {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://postgres@localhost/custodia")
            .expect("lazy pool options are valid");
        Extension(pool)
    }

    pub(crate) fn auth_state() -> Extension<Arc<AuthState>> {
        let config = AuthConfig::new(
            "https://vault.example".to_string(),
            PathBuf::from("/tmp/custodia-test"),
        );
        let limiter: Arc<dyn RateLimiter> = Arc::new(NoopRateLimiter);
        let gateway = Gateway::new(EmailBackend::Log, SmsBackend::Log);
        Extension(Arc::new(AuthState::new(
            config,
            limiter,
            gateway,
            SecretString::from("test-download-token-key"),
        )))
    }
}
