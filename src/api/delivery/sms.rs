//! SMS channel backend for one-time-code delivery.

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::info;

/// Normalize a phone number to international form: a leading `+` followed by
/// digits only. Separators and parentheses are dropped.
#[must_use]
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    format!("+{digits}")
}

/// SMS delivery backend, selected by configuration.
///
/// Mirrors [`super::email::EmailBackend`]: `Unconfigured` fails
/// deterministically instead of panicking.
pub enum SmsBackend {
    /// Local dev backend that logs the message instead of sending it.
    Log,
    /// SMS provider reached over an HTTP JSON API.
    Http {
        client: Client,
        url: String,
        api_key: SecretString,
        from: String,
    },
    /// Missing provider credentials; every send fails deterministically.
    Unconfigured,
}

impl SmsBackend {
    /// Build a backend from optional provider settings.
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

    /// Deliver a one-time code to `phone`.
    ///
    /// The number is normalized before handoff to the provider.
    ///
    /// # Errors
    /// Returns an error when the channel is unconfigured or the provider
    /// rejects the message.
    pub async fn send(&self, phone: &str, code: &str, validity_minutes: i64) -> Result<()> {
        let to = normalize_phone(phone);
        match self {
            Self::Log => {
                info!(to_phone = %to, code, "sms channel send stub");
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
                    "to": to,
                    "body": format!(
                        "Custodia code: {code} (valid {validity_minutes} minutes)"
                    ),
                });
                let response = client
                    .post(url)
                    .bearer_auth(api_key.expose_secret())
                    .json(&body)
                    .send()
                    .await
                    .context("sms provider request failed")?;
                if response.status().is_success() {
                    Ok(())
                } else {
                    Err(anyhow!("sms provider returned {}", response.status()))
                }
            }
            Self::Unconfigured => Err(anyhow!("sms channel is not configured")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_phone_strips_separators() {
        assert_eq!(normalize_phone("+1 (555) 123-0000"), "+15551230000");
        assert_eq!(normalize_phone("555.123.0000"), "+5551230000");
    }

    #[test]
    fn normalize_phone_keeps_already_normalized() {
        assert_eq!(normalize_phone("+15551230000"), "+15551230000");
    }

    #[tokio::test]
    async fn unconfigured_backend_always_fails() {
        let backend = SmsBackend::Unconfigured;
        assert!(backend.send("+15551230000", "123456", 5).await.is_err());
    }

    #[tokio::test]
    async fn log_backend_always_succeeds() {
        let backend = SmsBackend::Log;
        assert!(backend.send("+15551230000", "123456", 5).await.is_ok());
    }
}
