//! Email channel backend for one-time-code delivery.

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::info;

/// Email delivery backend, selected by configuration.
///
/// `Unconfigured` is a deterministic failure rather than a panic so the
/// service keeps running in single-channel or zero-channel mode.
pub enum EmailBackend {
    /// Local dev backend that logs the message instead of sending it.
    Log,
    /// Transactional email provider reached over an HTTP JSON API.
    Http {
        client: Client,
        url: String,
        api_key: SecretString,
        from: String,
    },
    /// Missing provider credentials; every send fails deterministically.
    Unconfigured,
}

impl EmailBackend {
    /// Build a backend from optional provider settings.
    ///
    /// `log_stub` forces the local dev backend. Missing or partial provider
    /// credentials yield `Unconfigured`, the accepted degraded posture.
    #[must_use]
    pub fn from_options(
        log_stub: bool,
        url: Option<String>,
        api_key: Option<String>,
        from: Option<String>,
    ) -> Self {
        if log_stub {
            return Self::Log;
        }
        match (url, api_key, from) {
            (Some(url), Some(api_key), Some(from)) => Self::Http {
                client: Client::new(),
                url,
                api_key: SecretString::from(api_key),
                from,
            },
            _ => Self::Unconfigured,
        }
    }

    /// Short backend name for startup logging.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Log => "log-stub",
            Self::Http { .. } => "http",
            Self::Unconfigured => "unconfigured",
        }
    }

    /// Deliver a one-time code to `address`.
    ///
    /// # Errors
    /// Returns an error when the channel is unconfigured or the provider
    /// rejects the message. Never panics past this boundary.
    pub async fn send(&self, address: &str, code: &str, validity_minutes: i64) -> Result<()> {
        match self {
            Self::Log => {
                info!(to_email = %address, code, "email channel send stub");
                Ok(())
            }
            Self::Http {
                client,
                url,
                api_key,
                from,
            } => {
                let body = json!({
                    "from": from,
                    "to": address,
                    "subject": "Your Custodia download code",
                    "text": format!(
                        "Your one-time code is {code}. It is valid for {validity_minutes} minutes."
                    ),
                });
                let response = client
                    .post(url)
                    .bearer_auth(api_key.expose_secret())
                    .json(&body)
                    .send()
                    .await
                    .context("email provider request failed")?;
                if response.status().is_success() {
                    Ok(())
                } else {
                    Err(anyhow!("email provider returned {}", response.status()))
                }
            }
            Self::Unconfigured => Err(anyhow!("email channel is not configured")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_backend_always_succeeds() {
        let backend = EmailBackend::Log;
        assert!(backend.send("a@x.com", "123456", 5).await.is_ok());
    }

    #[tokio::test]
    async fn unconfigured_backend_always_fails() {
        let backend = EmailBackend::Unconfigured;
        let err = backend.send("a@x.com", "123456", 5).await;
        assert!(err.is_err());
    }

    #[test]
    fn partial_options_are_unconfigured() {
        let backend =
            EmailBackend::from_options(false, Some("https://mail.test".to_string()), None, None);
        assert!(matches!(backend, EmailBackend::Unconfigured));
    }

    #[test]
    fn missing_options_are_unconfigured() {
        let backend = EmailBackend::from_options(false, None, None, None);
        assert!(matches!(backend, EmailBackend::Unconfigured));
    }

    #[test]
    fn log_stub_overrides_provider_options() {
        let backend = EmailBackend::from_options(true, None, None, None);
        assert!(matches!(backend, EmailBackend::Log));
    }
}
